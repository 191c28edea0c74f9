//! Sorting decorator over a data source.
//!
//! [`SortingModel`] presents the rows of another [`DataSource`] in sorted
//! order without touching the source. It listens to the source's change
//! signal, keeps its [`SortIndex`] current and re-announces every change in
//! view coordinates, so decorators can be stacked.

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Weak};

use gridstate_core::ConnectionId;
use gridstate_core::logging::targets;
use parking_lot::{Mutex, RwLock};

use super::compare::{CompareFn, SortOrder};
use super::sort_index::SortIndex;
use super::source::{ChangeKind, DataSource, SourceSignals, TableChange, column_names};
use super::value::{CellValue, ValueKind};
use crate::error::Result;
use crate::state::SortState;

struct SortingState {
    index: SortIndex,
    /// Column names as of the last structural change; the key for carrying
    /// the sort across the next one.
    names: Vec<Option<String>>,
}

/// A [`DataSource`] that shows another source's rows sorted by one column.
///
/// Created with [`SortingModel::new`], which returns an `Arc` because the
/// model registers itself with the source's change signal.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use gridstate::model::{CellValue, DataSource, SortOrder, SortingModel, TableModel};
///
/// let table = Arc::new(TableModel::new(["Number"]).with_rows(vec![
///     vec![CellValue::from(3)],
///     vec![CellValue::from(1)],
///     vec![CellValue::from(2)],
/// ]));
/// let sorted = SortingModel::new(table);
///
/// sorted.sort_by(Some(0), SortOrder::Ascending);
/// assert_eq!(sorted.value(0, 0).as_int(), Some(1));
/// assert_eq!(sorted.map_to_source(0), Some(1));
/// ```
pub struct SortingModel {
    this: Weak<SortingModel>,
    source: RwLock<Arc<dyn DataSource>>,
    state: RwLock<SortingState>,
    connection: Mutex<Option<ConnectionId>>,
    preserve_on_structure_change: AtomicBool,
    signals: SourceSignals,
}

impl SortingModel {
    /// Wraps `source`, initially unsorted.
    pub fn new(source: Arc<dyn DataSource>) -> Arc<Self> {
        let model = Arc::new_cyclic(|this| Self {
            this: this.clone(),
            state: RwLock::new(SortingState {
                index: SortIndex::for_source(&*source),
                names: column_names(&*source),
            }),
            source: RwLock::new(source),
            connection: Mutex::new(None),
            preserve_on_structure_change: AtomicBool::new(true),
            signals: SourceSignals::new(),
        });
        model.attach();
        model
    }

    /// The undecorated source.
    pub fn source(&self) -> Arc<dyn DataSource> {
        self.source.read().clone()
    }

    /// Replaces the source.
    ///
    /// With `keep_sort`, the sort settings is carried over when the new
    /// source has the same column names. Returns `true` if the sort was
    /// carried over (always for the current source, which is left alone).
    pub fn set_source(&self, source: Arc<dyn DataSource>, keep_sort: bool) -> bool {
        if std::ptr::addr_eq(Arc::as_ptr(&self.source()), Arc::as_ptr(&source)) {
            return true;
        }

        let saved = keep_sort.then(|| self.snapshot_sort_state());
        self.detach();
        *self.source.write() = source.clone();

        let restored = {
            let mut state = self.state.write();
            state.index.reset(&*source);
            state.names = column_names(&*source);
            saved.is_some_and(|saved| matches!(state.index.restore(&*source, &saved), Ok(true)))
        };
        self.attach();

        tracing::debug!(target: targets::SORT, restored, "sorting model source replaced");
        self.signals.changed.emit(TableChange::structure_changed());
        restored
    }

    /// Whether a structural change of the source keeps the sort when the
    /// column names stay the same. On by default.
    pub fn set_preserve_on_structure_change(&self, preserve: bool) {
        self.preserve_on_structure_change
            .store(preserve, AtomicOrdering::SeqCst);
    }

    /// See [`set_preserve_on_structure_change`](Self::set_preserve_on_structure_change).
    pub fn preserves_on_structure_change(&self) -> bool {
        self.preserve_on_structure_change.load(AtomicOrdering::SeqCst)
    }

    /// Sorts by `column` in `order`; `None` restores source order.
    pub fn sort_by(&self, column: Option<usize>, order: SortOrder) -> bool {
        let source = self.source();
        let changed = self.state.write().index.sort_by(&*source, column, order);
        if changed {
            self.signals.changed.emit(TableChange::data_changed());
        }
        changed
    }

    /// Header-click semantics, see [`SortIndex::toggle`].
    pub fn toggle_sort(&self, column: usize) -> bool {
        let source = self.source();
        let changed = self.state.write().index.toggle(&*source, column);
        if changed {
            self.signals.changed.emit(TableChange::data_changed());
        }
        changed
    }

    /// Returns to source order.
    pub fn clear_sort(&self) -> bool {
        self.sort_by(None, SortOrder::Ascending)
    }

    /// The active sort column.
    pub fn sort_column(&self) -> Option<usize> {
        self.state.read().index.sort_column()
    }

    /// The remembered direction of `column`.
    pub fn order(&self, column: usize) -> SortOrder {
        self.state.read().index.order(column)
    }

    /// Maps a view row to a source row.
    pub fn map_to_source(&self, view_row: usize) -> Option<usize> {
        self.state.read().index.map_to_source(view_row)
    }

    /// Maps a source row to a view row.
    pub fn map_from_source(&self, source_row: usize) -> Option<usize> {
        self.state.read().index.map_from_source(source_row)
    }

    /// Captures the sort settings.
    pub fn snapshot_sort_state(&self) -> SortState {
        let source = self.source();
        self.state.read().index.snapshot(&*source)
    }

    /// Checks `state` against the current source without applying it.
    pub fn is_compatible(&self, state: &SortState) -> Result<bool> {
        SortIndex::is_compatible(&*self.source(), state)
    }

    /// Re-applies a captured sort settings.
    pub fn restore_sort_state(&self, state: &SortState) -> Result<bool> {
        let source = self.source();
        let restored = self.state.write().index.restore(&*source, state)?;
        if restored {
            self.signals.changed.emit(TableChange::data_changed());
        }
        Ok(restored)
    }

    fn attach(&self) {
        let this = self.this.clone();
        let id = self.source().signals().changed.connect(move |change| {
            if let Some(model) = this.upgrade() {
                model.on_source_changed(change);
            }
        });
        *self.connection.lock() = Some(id);
    }

    fn detach(&self) {
        if let Some(id) = self.connection.lock().take() {
            self.source.read().signals().changed.disconnect(id);
        }
    }

    fn on_source_changed(&self, change: &TableChange) {
        let source = self.source();
        let forward = {
            let mut state = self.state.write();
            if change.kind == ChangeKind::Structure {
                let saved = self.preserves_on_structure_change().then(|| SortState {
                    sort_column: state.index.sort_column(),
                    column_names: state.names.clone(),
                    directions: state.index.directions().to_vec(),
                });
                state.index.reset(&*source);
                state.names = column_names(&*source);
                if let Some(saved) = saved {
                    let kept = matches!(state.index.restore(&*source, &saved), Ok(true));
                    tracing::debug!(target: targets::SORT, kept, "source structure changed");
                }
                TableChange::structure_changed()
            } else if state.index.handle_change(&*source, change) {
                TableChange::data_changed()
            } else {
                self.map_update(&state.index, change)
            }
        };
        self.signals.changed.emit(forward);
    }

    /// An update that did not move rows, translated to view rows.
    fn map_update(&self, index: &SortIndex, change: &TableChange) -> TableChange {
        if change.first_row != change.last_row {
            return TableChange::data_changed();
        }
        match index.map_from_source(change.first_row) {
            Some(view_row) => TableChange {
                first_row: view_row,
                last_row: view_row,
                ..*change
            },
            None => TableChange::data_changed(),
        }
    }
}

impl Drop for SortingModel {
    fn drop(&mut self) {
        self.detach();
    }
}

impl DataSource for SortingModel {
    fn row_count(&self) -> usize {
        self.state.read().index.len()
    }

    fn column_count(&self) -> usize {
        self.source().column_count()
    }

    fn value(&self, row: usize, column: usize) -> CellValue {
        match self.map_to_source(row) {
            Some(source_row) => self.source().value(source_row, column),
            None => CellValue::Empty,
        }
    }

    fn set_value(&self, row: usize, column: usize, value: CellValue) -> bool {
        match self.map_to_source(row) {
            Some(source_row) => self.source().set_value(source_row, column, value),
            None => false,
        }
    }

    fn is_editable(&self, row: usize, column: usize) -> bool {
        self.map_to_source(row)
            .is_some_and(|source_row| self.source().is_editable(source_row, column))
    }

    fn column_name(&self, column: usize) -> Option<String> {
        self.source().column_name(column)
    }

    fn column_kind(&self, column: usize) -> ValueKind {
        self.source().column_kind(column)
    }

    fn comparator(&self, column: usize) -> Option<CompareFn> {
        self.source().comparator(column)
    }

    fn signals(&self) -> &SourceSignals {
        &self.signals
    }
}

static_assertions::assert_impl_all!(SortingModel: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableModel;
    use crate::model::table_model::ColumnDef;

    fn table(values: &[i64]) -> Arc<TableModel> {
        Arc::new(
            TableModel::new(["Number", "Text"])
                .with_editable(1)
                .with_rows(
                    values
                        .iter()
                        .map(|&n| vec![CellValue::from(n), CellValue::from(format!("n{n}"))])
                        .collect(),
                ),
        )
    }

    fn column(model: &dyn DataSource, col: usize) -> Vec<i64> {
        (0..model.row_count())
            .filter_map(|row| model.value(row, col).as_int())
            .collect()
    }

    fn record(model: &SortingModel) -> Arc<Mutex<Vec<TableChange>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        model.signals().changed.connect(move |change| {
            events_clone.lock().push(*change);
        });
        events
    }

    #[test]
    fn test_sorted_view() {
        let source = table(&[3, 1, 2]);
        let sorted = SortingModel::new(source.clone());
        let events = record(&sorted);

        assert!(sorted.sort_by(Some(0), SortOrder::Descending));
        assert_eq!(column(&*sorted, 0), vec![3, 2, 1]);
        assert_eq!(column(&*source, 0), vec![3, 1, 2]);
        assert_eq!(*events.lock(), vec![TableChange::data_changed()]);

        assert!(sorted.clear_sort());
        assert_eq!(column(&*sorted, 0), vec![3, 1, 2]);
    }

    #[test]
    fn test_follows_source_inserts() {
        let source = table(&[3, 1]);
        let sorted = SortingModel::new(source.clone());
        sorted.sort_by(Some(0), SortOrder::Ascending);
        let events = record(&sorted);

        source.push_row(vec![CellValue::from(2), CellValue::Empty]);
        assert_eq!(column(&*sorted, 0), vec![1, 2, 3]);
        assert_eq!(events.lock().len(), 1);
    }

    #[test]
    fn test_edits_map_through_permutation() {
        let source = table(&[3, 1, 2]);
        let sorted = SortingModel::new(source.clone());
        sorted.sort_by(Some(0), SortOrder::Ascending);
        let events = record(&sorted);

        assert!(sorted.is_editable(0, 1));
        assert!(!sorted.is_editable(0, 0));
        assert!(sorted.set_value(0, 1, CellValue::from("first")));
        assert_eq!(source.value(1, 1).to_string(), "first");

        // Not on the sort column: forwarded as an update of view row 0.
        assert_eq!(*events.lock(), vec![TableChange::cells_updated(0, 0, 1)]);
    }

    #[test]
    fn test_structure_change_keeps_sort_when_names_match() {
        let source = table(&[3, 1, 2]);
        let sorted = SortingModel::new(source.clone());
        sorted.sort_by(Some(0), SortOrder::Descending);

        source.set_columns(
            vec![ColumnDef::named("Number"), ColumnDef::named("Text")],
            vec![vec![CellValue::from(5)], vec![CellValue::from(9)]],
        );
        assert_eq!(sorted.sort_column(), Some(0));
        assert_eq!(column(&*sorted, 0), vec![9, 5]);

        source.set_columns(vec![ColumnDef::named("Other")], vec![vec![CellValue::from(1)]]);
        assert_eq!(sorted.sort_column(), None);
    }

    #[test]
    fn test_structure_change_without_preservation() {
        let source = table(&[3, 1, 2]);
        let sorted = SortingModel::new(source.clone());
        sorted.set_preserve_on_structure_change(false);
        sorted.sort_by(Some(0), SortOrder::Descending);

        source.set_columns(
            vec![ColumnDef::named("Number"), ColumnDef::named("Text")],
            vec![vec![CellValue::from(5)], vec![CellValue::from(9)]],
        );
        assert_eq!(sorted.sort_column(), None);
    }

    #[test]
    fn test_set_source_keeps_sort() {
        let sorted = SortingModel::new(table(&[3, 1, 2]));
        sorted.sort_by(Some(0), SortOrder::Ascending);
        let events = record(&sorted);

        let replacement = table(&[8, 7, 9]);
        assert!(sorted.set_source(replacement.clone(), true));
        assert_eq!(column(&*sorted, 0), vec![7, 8, 9]);
        assert!(events.lock()[0].is_structural());

        let other: Arc<dyn DataSource> = Arc::new(TableModel::new(["Else"]));
        assert!(!sorted.set_source(other, true));
        assert_eq!(sorted.sort_column(), None);

        // The old source no longer drives the model.
        replacement.push_row(vec![CellValue::from(1), CellValue::Empty]);
        assert_eq!(sorted.row_count(), 0);
    }

    #[test]
    fn test_stacked_models() {
        let source = table(&[2, 3, 1]);
        let inner = SortingModel::new(source.clone());
        inner.sort_by(Some(0), SortOrder::Descending);
        let outer = SortingModel::new(inner.clone());
        assert_eq!(column(&*outer, 0), vec![3, 2, 1]);

        outer.sort_by(Some(0), SortOrder::Ascending);
        assert_eq!(column(&*outer, 0), vec![1, 2, 3]);

        source.push_row(vec![CellValue::from(0), CellValue::Empty]);
        assert_eq!(column(&*inner, 0), vec![3, 2, 1, 0]);
        assert_eq!(column(&*outer, 0), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_drop_disconnects() {
        let source = table(&[1]);
        let sorted = SortingModel::new(source.clone());
        assert_eq!(source.signals().changed.connection_count(), 1);
        drop(sorted);
        assert_eq!(source.signals().changed.connection_count(), 0);
    }

    #[test]
    fn test_restore_sort_state() {
        let source = table(&[3, 1, 2]);
        let sorted = SortingModel::new(source.clone());
        sorted.sort_by(Some(0), SortOrder::Descending);
        let state = sorted.snapshot_sort_state();

        sorted.clear_sort();
        assert!(sorted.is_compatible(&state).unwrap());
        assert!(sorted.restore_sort_state(&state).unwrap());
        assert_eq!(column(&*sorted, 0), vec![3, 2, 1]);
    }
}
