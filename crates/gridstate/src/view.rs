//! The view coordinator.
//!
//! [`ViewCoordinator`] binds a [`SortingModel`] and a [`ColumnVisibility`]
//! to one data source and is the single entry point a table widget talks
//! to. It turns UI gestures into sort and visibility commands, keeps column
//! and sort state across source replacement, and captures or re-applies the
//! whole view state as a [`ViewState`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gridstate::model::{CellValue, TableModel};
//! use gridstate::view::ViewCoordinator;
//!
//! let table = Arc::new(TableModel::new(["Color", "Number"]).with_rows(vec![
//!     vec!["red".into(), CellValue::from(200)],
//!     vec!["blue".into(), CellValue::from(100)],
//! ]));
//! let view = ViewCoordinator::new(table);
//!
//! // A click on the second header sorts by it
//! view.header_clicked(1);
//! assert_eq!(view.value_at(0, 0).to_string(), "blue");
//!
//! let saved = view.get_state();
//! view.header_clicked(1);
//! assert!(view.set_state(&saved)?);
//! assert_eq!(view.value_at(0, 0).to_string(), "blue");
//! # Ok::<(), gridstate::GridError>(())
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Weak};

use gridstate_core::logging::targets;
use gridstate_core::{ConnectionId, Signal};
use parking_lot::{Mutex, RwLock};

use crate::columns::{Column, ColumnDefaults, ColumnId, ColumnVisibility};
use crate::config::ViewConfig;
use crate::error::Result;
use crate::layout::{ColumnLayout, TextWidthLayout};
use crate::model::{CellValue, DataSource, SortOrder, SortingModel, TableChange};
use crate::state::{ColumnState, ViewState};

/// What part of the display needs repainting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayChange {
    /// Row order or cell values changed.
    Rows,
    /// Columns were added, removed, moved, shown or hidden.
    Columns,
    /// Column widths changed.
    Layout,
    /// Everything changed.
    Structure,
}

/// Signals emitted by a [`ViewCoordinator`].
#[derive(Default)]
pub struct ViewSignals {
    /// Emitted after any change that affects what is displayed.
    pub display_changed: Signal<DisplayChange>,
    /// Emitted when state preservation is switched on or off.
    pub state_preserving_changed: Signal<bool>,
}

/// One line of a column chooser menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMenuEntry {
    /// Column to pass to [`ViewCoordinator::toggle_visibility`].
    pub id: ColumnId,
    /// Header text.
    pub header: String,
    /// Whether the column is currently shown.
    pub visible: bool,
}

/// Coordinates sorting, column visibility and view state for one source.
pub struct ViewCoordinator {
    this: Weak<ViewCoordinator>,
    sorting: Arc<SortingModel>,
    columns: ColumnVisibility,
    layout: RwLock<Arc<dyn ColumnLayout>>,
    column_defaults: ColumnDefaults,
    state_preserving: AtomicBool,
    /// Nesting depth of internal column rebuilds; column signals are not
    /// forwarded while it is non-zero.
    batch_depth: AtomicUsize,
    /// Set while `set_source` swaps the source.
    replacing: AtomicBool,
    sorting_connection: Mutex<Option<ConnectionId>>,
    signals: ViewSignals,
}

impl ViewCoordinator {
    /// Creates a coordinator with the default configuration and a
    /// [`TextWidthLayout`].
    pub fn new(source: Arc<dyn DataSource>) -> Arc<Self> {
        Self::with_config(source, ViewConfig::default())
    }

    /// Creates a coordinator with `config` and a [`TextWidthLayout`].
    pub fn with_config(source: Arc<dyn DataSource>, config: ViewConfig) -> Arc<Self> {
        Self::with_layout(source, config, Arc::new(TextWidthLayout::default()))
    }

    /// Creates a coordinator with `config` and a custom layout.
    pub fn with_layout(source: Arc<dyn DataSource>, config: ViewConfig, layout: Arc<dyn ColumnLayout>) -> Arc<Self> {
        let sorting = SortingModel::new(source);
        sorting.set_preserve_on_structure_change(config.state_preserving);

        let view = Arc::new_cyclic(|this| Self {
            this: this.clone(),
            sorting,
            columns: ColumnVisibility::new(),
            layout: RwLock::new(layout),
            column_defaults: config.column_defaults,
            state_preserving: AtomicBool::new(config.state_preserving),
            batch_depth: AtomicUsize::new(0),
            replacing: AtomicBool::new(false),
            sorting_connection: Mutex::new(None),
            signals: ViewSignals::default(),
        });

        view.rebuild_columns(None);
        view.run_layout();
        view.connect_signals();
        tracing::debug!(target: targets::VIEW, columns = view.columns.len(), "view coordinator created");
        view
    }

    /// The coordinator's signals.
    pub fn signals(&self) -> &ViewSignals {
        &self.signals
    }

    /// The sorted view of the source.
    pub fn sorting_model(&self) -> &Arc<SortingModel> {
        &self.sorting
    }

    /// The column set.
    pub fn columns(&self) -> &ColumnVisibility {
        &self.columns
    }

    /// The source without sorting applied.
    pub fn unsorted_source(&self) -> Arc<dyn DataSource> {
        self.sorting.source()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Whether column and sort state survive source replacement and
    /// structure changes.
    pub fn is_state_preserving(&self) -> bool {
        self.state_preserving.load(AtomicOrdering::SeqCst)
    }

    /// Switches state preservation on or off.
    pub fn set_state_preserving(&self, preserving: bool) {
        let old = self.state_preserving.swap(preserving, AtomicOrdering::SeqCst);
        self.sorting.set_preserve_on_structure_change(preserving);
        if old != preserving {
            self.signals.state_preserving_changed.emit(preserving);
        }
    }

    /// Replaces the layout used by [`balance_columns`](Self::balance_columns).
    pub fn set_layout(&self, layout: Arc<dyn ColumnLayout>) {
        *self.layout.write() = layout;
    }

    // =========================================================================
    // Data Access
    // =========================================================================

    /// Number of rows shown.
    pub fn row_count(&self) -> usize {
        self.sorting.row_count()
    }

    /// Number of columns shown.
    pub fn column_count(&self) -> usize {
        self.columns.visible_count()
    }

    /// The value displayed at `view_row`, `view_column`.
    pub fn value_at(&self, view_row: usize, view_column: usize) -> CellValue {
        match self.columns.model_index_at(view_column) {
            Some(column) => self.sorting.value(view_row, column),
            None => CellValue::Empty,
        }
    }

    // =========================================================================
    // Source Replacement
    // =========================================================================

    /// Replaces the data source.
    ///
    /// With state preservation on, column and sort state are carried over
    /// when the new source has the same columns. If that is not possible,
    /// or preservation is off, column widths are recomputed by the layout.
    /// Returns `true` if the whole state was carried over.
    pub fn set_source(&self, source: Arc<dyn DataSource>) -> bool {
        let preserve = self.is_state_preserving();
        let saved_columns = preserve.then(|| self.columns.snapshot());

        self.replacing.store(true, AtomicOrdering::SeqCst);
        let sort_kept = self.sorting.set_source(source, preserve);
        self.replacing.store(false, AtomicOrdering::SeqCst);

        let columns_kept = self.rebuild_columns(saved_columns);
        let kept = preserve && sort_kept && columns_kept;
        if !kept {
            if preserve {
                tracing::warn!(
                    target: targets::STATE,
                    sort_kept,
                    columns_kept,
                    "view state does not fit the new source; recomputing layout"
                );
            }
            self.run_layout();
        }

        tracing::debug!(target: targets::VIEW, kept, "source replaced");
        self.signals.display_changed.emit(DisplayChange::Structure);
        kept
    }

    // =========================================================================
    // View State
    // =========================================================================

    /// Captures the column and sort state.
    pub fn get_state(&self) -> ViewState {
        ViewState {
            columns: self.columns.snapshot(),
            sort: self.sorting.snapshot_sort_state(),
        }
    }

    /// Re-applies a captured state.
    ///
    /// Both parts are checked before either is applied: on `Ok(false)`
    /// nothing changed. A malformed state is an error.
    pub fn set_state(&self, state: &ViewState) -> Result<bool> {
        let columns_ok = self.columns.is_compatible(&state.columns)?;
        let sort_ok = self.sorting.is_compatible(&state.sort)?;
        if !(columns_ok && sort_ok) {
            tracing::debug!(target: targets::STATE, columns_ok, sort_ok, "view state not applicable");
            return Ok(false);
        }

        self.columns.restore(&state.columns)?;
        self.sorting.restore_sort_state(&state.sort)?;
        tracing::debug!(target: targets::STATE, "view state restored");
        Ok(true)
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Sorts by source column `column`, or restores source order for `None`.
    pub fn sort_by(&self, column: Option<usize>, order: SortOrder) -> bool {
        self.sorting.sort_by(column, order)
    }

    /// Activates source column `column`, or flips its direction if it is
    /// already the sort column.
    pub fn toggle_sort(&self, column: usize) -> bool {
        self.sorting.toggle_sort(column)
    }

    /// Header click on the visible column at `view_column`.
    pub fn header_clicked(&self, view_column: usize) -> bool {
        match self.columns.model_index_at(view_column) {
            Some(column) => self.toggle_sort(column),
            None => {
                tracing::trace!(target: targets::VIEW, view_column, "ignoring click outside the columns");
                false
            }
        }
    }

    /// The active sort column and its direction.
    pub fn sort_indicator(&self) -> Option<(usize, SortOrder)> {
        let column = self.sorting.sort_column()?;
        Some((column, self.sorting.order(column)))
    }

    /// Shows a hidden column or hides a visible one.
    pub fn toggle_visibility(&self, id: &ColumnId) -> bool {
        self.columns.toggle(id)
    }

    /// Hides a column; see [`ColumnVisibility::hide`].
    pub fn hide_column(&self, id: &ColumnId) -> bool {
        self.columns.hide(id)
    }

    /// Shows a hidden column; see [`ColumnVisibility::show`].
    pub fn show_column(&self, id: &ColumnId) -> bool {
        self.columns.show(id)
    }

    /// Shows every hidden column.
    pub fn show_all_columns(&self) -> usize {
        self.columns.show_all()
    }

    /// Moves a visible column, e.g. after a header drag.
    pub fn move_column(&self, from: usize, to: usize) -> bool {
        self.columns.move_column(from, to)
    }

    /// Every known column in source order, with its visibility; the content
    /// of a column chooser menu.
    pub fn menu_entries(&self) -> Vec<ColumnMenuEntry> {
        let mut columns = self.columns.all_columns();
        columns.sort_by_key(|(column, _)| column.model_index());
        columns
            .into_iter()
            .map(|(column, visible)| ColumnMenuEntry {
                id: column.id().clone(),
                header: column.header().to_string(),
                visible,
            })
            .collect()
    }

    /// Recomputes preferred widths with the current layout.
    pub fn balance_columns(&self) {
        self.run_layout();
        self.signals.display_changed.emit(DisplayChange::Layout);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn run_layout(&self) {
        let layout = self.layout.read().clone();
        let source = self.unsorted_source();
        self.batch(|| layout.balance(&*source, &self.columns));
    }

    fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        self.batch_depth.fetch_add(1, AtomicOrdering::SeqCst);
        let result = f();
        self.batch_depth.fetch_sub(1, AtomicOrdering::SeqCst);
        result
    }

    fn in_batch(&self) -> bool {
        self.batch_depth.load(AtomicOrdering::SeqCst) > 0
    }

    /// Recreates the columns from the source, then re-applies `saved` if
    /// given. Returns `true` if `saved` was applied.
    fn rebuild_columns(&self, saved: Option<Vec<ColumnState>>) -> bool {
        let source = self.unsorted_source();
        self.batch(|| {
            self.columns.clear();
            for model_index in 0..source.column_count() {
                let name = source.column_name(model_index);
                let mut id = ColumnId::for_model_column(name.as_deref(), model_index);
                let mut attempt = 0;
                while self.columns.contains(&id) {
                    id = ColumnId::disambiguated(name.as_deref(), model_index, attempt);
                    attempt += 1;
                }
                let header = name.unwrap_or_default();
                let column = Column::new(id, model_index, header, self.column_defaults);
                if let Err(err) = self.columns.add_column(column) {
                    tracing::warn!(target: targets::COLUMNS, %err, model_index, "skipping column");
                }
            }

            saved.is_some_and(|saved| matches!(self.columns.restore(&saved), Ok(true)))
        })
    }

    fn connect_signals(&self) {
        let this = self.this.clone();
        let id = self.sorting.signals().changed.connect(move |change| {
            if let Some(view) = this.upgrade() {
                view.on_rows_changed(change);
            }
        });
        *self.sorting_connection.lock() = Some(id);

        let signals = self.columns.signals();
        let forward = |change: DisplayChange| {
            let this = self.this.clone();
            move || {
                if let Some(view) = this.upgrade() {
                    if !view.in_batch() {
                        view.signals.display_changed.emit(change);
                    }
                }
            }
        };
        let columns_changed = forward(DisplayChange::Columns);
        signals.column_added.connect({
            let f = columns_changed.clone();
            move |_| f()
        });
        signals.column_removed.connect({
            let f = columns_changed.clone();
            move |_| f()
        });
        signals.column_moved.connect({
            let f = columns_changed.clone();
            move |_| f()
        });
        signals.visibility_changed.connect({
            let f = columns_changed.clone();
            move |_| f()
        });
        signals.layout_restored.connect(move |_| columns_changed());
        let layout_changed = forward(DisplayChange::Layout);
        signals.width_changed.connect(move |_| layout_changed());
    }

    fn on_rows_changed(&self, change: &TableChange) {
        if !change.is_structural() {
            self.signals.display_changed.emit(DisplayChange::Rows);
            return;
        }
        if self.replacing.load(AtomicOrdering::SeqCst) {
            return;
        }

        let preserve = self.is_state_preserving();
        let saved = preserve.then(|| self.columns.snapshot());
        let kept = self.rebuild_columns(saved);
        if !kept {
            if preserve {
                tracing::warn!(target: targets::STATE, "column state does not fit the new structure; recomputing layout");
            }
            self.run_layout();
        }
        tracing::debug!(target: targets::VIEW, kept, "source structure changed");
        self.signals.display_changed.emit(DisplayChange::Structure);
    }
}

impl Drop for ViewCoordinator {
    fn drop(&mut self) {
        if let Some(id) = self.sorting_connection.lock().take() {
            self.sorting.signals().changed.disconnect(id);
        }
    }
}

static_assertions::assert_impl_all!(ViewCoordinator: Send, Sync);
