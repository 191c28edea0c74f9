//! Visible and hidden columns of a table view.
//!
//! [`ColumnVisibility`] keeps the ordered list of visible columns and a list
//! of hidden ones. A hidden column remembers the visible position it had, so
//! showing it again puts it back where it was.
//!
//! # Signals
//!
//! Every mutation finishes (and releases the internal lock) before its
//! signals are emitted, so slots may query the column set freely.
//!
//! - `column_added(visible index)`
//! - `column_removed(id)`
//! - `column_moved((from, to))`
//! - `visibility_changed((id, visible))`
//! - `width_changed(id)`
//! - `layout_restored(())` after a successful [`restore`](ColumnVisibility::restore)

use std::collections::HashSet;

use gridstate_core::Signal;
use gridstate_core::logging::targets;
use parking_lot::RwLock;

use super::column::{Column, ColumnId};
use crate::error::{GridError, Result};
use crate::state::ColumnState;

#[derive(Debug, Clone)]
struct HiddenColumn {
    column: Column,
    /// Visible position at the time the column was hidden.
    last_index: usize,
}

#[derive(Debug, Default)]
struct ColumnSet {
    visible: Vec<Column>,
    /// In hide order.
    hidden: Vec<HiddenColumn>,
}

impl ColumnSet {
    fn visible_position(&self, id: &ColumnId) -> Option<usize> {
        self.visible.iter().position(|c| c.id() == id)
    }

    fn hidden_position(&self, id: &ColumnId) -> Option<usize> {
        self.hidden.iter().position(|h| h.column.id() == id)
    }

    fn contains(&self, id: &ColumnId) -> bool {
        self.visible_position(id).is_some() || self.hidden_position(id).is_some()
    }

    fn column_mut(&mut self, id: &ColumnId) -> Option<&mut Column> {
        if let Some(pos) = self.visible_position(id) {
            return self.visible.get_mut(pos);
        }
        let pos = self.hidden_position(id)?;
        self.hidden.get_mut(pos).map(|h| &mut h.column)
    }

    fn len(&self) -> usize {
        self.visible.len() + self.hidden.len()
    }

    /// Moves hidden column `pos` back into the visible list.
    fn show_at(&mut self, pos: usize) -> ColumnEvent {
        let HiddenColumn { column, last_index } = self.hidden.remove(pos);
        let index = last_index.min(self.visible.len());
        let id = column.id().clone();
        self.visible.insert(index, column);
        tracing::debug!(target: targets::COLUMNS, %id, index, "column shown");
        ColumnEvent::Visibility(id, true)
    }

    fn debug_check(&self) {
        debug_assert!(
            {
                let mut seen = HashSet::new();
                self.visible
                    .iter()
                    .chain(self.hidden.iter().map(|h| &h.column))
                    .all(|c| seen.insert(c.id().clone()))
            },
            "column ids must be unique across the visible and hidden sets"
        );
    }
}

enum ColumnEvent {
    Added(usize),
    Removed(ColumnId),
    Moved(usize, usize),
    Visibility(ColumnId, bool),
    Width(ColumnId),
    Restored,
}

/// Signals emitted by [`ColumnVisibility`].
#[derive(Default)]
pub struct ColumnSignals {
    /// A column was added at the given visible index.
    pub column_added: Signal<usize>,
    /// A column was removed permanently.
    pub column_removed: Signal<ColumnId>,
    /// A visible column moved from one index to another.
    pub column_moved: Signal<(usize, usize)>,
    /// A column was shown (`true`) or hidden (`false`).
    pub visibility_changed: Signal<(ColumnId, bool)>,
    /// A column's width bounds or preferred width changed.
    pub width_changed: Signal<ColumnId>,
    /// The whole layout was replaced from a snapshot.
    pub layout_restored: Signal<()>,
}

/// The column set of a table view, with hide/show and snapshot support.
///
/// # Invariants
///
/// - Every known column is either visible or hidden, never both.
/// - Column ids are unique.
/// - [`hide`](Self::hide) never leaves the view without a visible column.
///
/// # Example
///
/// ```
/// use gridstate::columns::{Column, ColumnDefaults, ColumnId, ColumnVisibility};
///
/// let columns = ColumnVisibility::new();
/// for (i, name) in ["Color", "Number", "Date"].into_iter().enumerate() {
///     columns.add_column(Column::new(ColumnId::from(name), i, name, ColumnDefaults::default()))?;
/// }
///
/// columns.hide(&ColumnId::from("Number"));
/// assert_eq!(columns.visible_ids(), vec![ColumnId::from("Color"), ColumnId::from("Date")]);
///
/// columns.show_all();
/// assert_eq!(columns.visible_ids().len(), 3);
/// # Ok::<(), gridstate::GridError>(())
/// ```
#[derive(Default)]
pub struct ColumnVisibility {
    inner: RwLock<ColumnSet>,
    signals: ColumnSignals,
}

impl ColumnVisibility {
    /// Creates an empty column set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The column set's signals.
    pub fn signals(&self) -> &ColumnSignals {
        &self.signals
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of visible columns.
    pub fn visible_count(&self) -> usize {
        self.inner.read().visible.len()
    }

    /// Number of hidden columns.
    pub fn hidden_count(&self) -> usize {
        self.inner.read().hidden.len()
    }

    /// Number of known columns, visible or hidden.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` if no column is known.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `id` is known, visible or hidden.
    pub fn contains(&self, id: &ColumnId) -> bool {
        self.inner.read().contains(id)
    }

    /// Returns `true` if `id` is a hidden column.
    pub fn is_hidden(&self, id: &ColumnId) -> bool {
        self.inner.read().hidden_position(id).is_some()
    }

    /// Visible position of `id`.
    pub fn index_of(&self, id: &ColumnId) -> Option<usize> {
        self.inner.read().visible_position(id)
    }

    /// Ids of the visible columns, in display order.
    pub fn visible_ids(&self) -> Vec<ColumnId> {
        self.inner.read().visible.iter().map(|c| c.id().clone()).collect()
    }

    /// Ids of the hidden columns, in hide order.
    pub fn hidden_ids(&self) -> Vec<ColumnId> {
        self.inner
            .read()
            .hidden
            .iter()
            .map(|h| h.column.id().clone())
            .collect()
    }

    /// Copies of the visible columns, in display order.
    pub fn visible_columns(&self) -> Vec<Column> {
        self.inner.read().visible.clone()
    }

    /// Every known column with its visibility flag: visible ones in display
    /// order, then hidden ones in hide order.
    pub fn all_columns(&self) -> Vec<(Column, bool)> {
        let inner = self.inner.read();
        inner
            .visible
            .iter()
            .map(|c| (c.clone(), true))
            .chain(inner.hidden.iter().map(|h| (h.column.clone(), false)))
            .collect()
    }

    /// A copy of the column `id`, visible or hidden.
    pub fn column(&self, id: &ColumnId) -> Option<Column> {
        let inner = self.inner.read();
        inner
            .visible
            .iter()
            .chain(inner.hidden.iter().map(|h| &h.column))
            .find(|c| c.id() == id)
            .cloned()
    }

    /// The source column shown at visible position `view_column`.
    pub fn model_index_at(&self, view_column: usize) -> Option<usize> {
        self.inner.read().visible.get(view_column).map(Column::model_index)
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Appends a visible column.
    pub fn add_column(&self, column: Column) -> Result<()> {
        let event = {
            let mut inner = self.inner.write();
            if inner.contains(column.id()) {
                return Err(GridError::DuplicateColumn(column.id().clone()));
            }
            inner.visible.push(column);
            ColumnEvent::Added(inner.visible.len() - 1)
        };
        self.dispatch(vec![event]);
        Ok(())
    }

    /// Removes a column permanently, returning it.
    ///
    /// A hidden column is purged directly. When the last visible column is
    /// removed, hidden columns are purged as well.
    pub fn remove_column(&self, id: &ColumnId) -> Option<Column> {
        let (removed, events) = {
            let mut inner = self.inner.write();
            if let Some(pos) = inner.hidden_position(id) {
                let hidden = inner.hidden.remove(pos);
                (hidden.column, vec![ColumnEvent::Removed(id.clone())])
            } else {
                let pos = inner.visible_position(id)?;
                let column = inner.visible.remove(pos);
                let mut events = vec![ColumnEvent::Removed(id.clone())];
                if inner.visible.is_empty() {
                    events.extend(
                        inner
                            .hidden
                            .drain(..)
                            .map(|h| ColumnEvent::Removed(h.column.id().clone())),
                    );
                }
                (column, events)
            }
        };
        tracing::debug!(target: targets::COLUMNS, %id, "column removed");
        self.dispatch(events);
        Some(removed)
    }

    /// Removes every column.
    pub fn clear(&self) {
        let events: Vec<_> = {
            let mut inner = self.inner.write();
            let visible = std::mem::take(&mut inner.visible);
            let hidden = std::mem::take(&mut inner.hidden);
            visible
                .into_iter()
                .chain(hidden.into_iter().map(|h| h.column))
                .map(|c| ColumnEvent::Removed(c.id().clone()))
                .collect()
        };
        self.dispatch(events);
    }

    // =========================================================================
    // Visibility and Order
    // =========================================================================

    /// Hides a visible column. Refused when it is the last visible column.
    pub fn hide(&self, id: &ColumnId) -> bool {
        let event = {
            let mut inner = self.inner.write();
            let Some(pos) = inner.visible_position(id) else {
                tracing::trace!(target: targets::COLUMNS, %id, "hide: not a visible column");
                return false;
            };
            if inner.visible.len() <= 1 {
                tracing::debug!(target: targets::COLUMNS, %id, "refusing to hide the last visible column");
                return false;
            }
            let column = inner.visible.remove(pos);
            inner.hidden.push(HiddenColumn {
                column,
                last_index: pos,
            });
            ColumnEvent::Visibility(id.clone(), false)
        };
        tracing::debug!(target: targets::COLUMNS, %id, "column hidden");
        self.dispatch(vec![event]);
        true
    }

    /// Shows a hidden column at its remembered position, or at the end if
    /// that position is past the visible columns.
    pub fn show(&self, id: &ColumnId) -> bool {
        let event = {
            let mut inner = self.inner.write();
            let Some(pos) = inner.hidden_position(id) else {
                tracing::trace!(target: targets::COLUMNS, %id, "show: not a hidden column");
                return false;
            };
            inner.show_at(pos)
        };
        self.dispatch(vec![event]);
        true
    }

    /// Hides a visible column or shows a hidden one.
    pub fn toggle(&self, id: &ColumnId) -> bool {
        if self.is_hidden(id) {
            self.show(id)
        } else {
            self.hide(id)
        }
    }

    /// Shows every hidden column, most recently hidden first, so each lands
    /// back at its remembered position. Returns the number shown.
    pub fn show_all(&self) -> usize {
        let events: Vec<_> = {
            let mut inner = self.inner.write();
            let mut events = Vec::with_capacity(inner.hidden.len());
            while !inner.hidden.is_empty() {
                let last = inner.hidden.len() - 1;
                events.push(inner.show_at(last));
            }
            events
        };
        let shown = events.len();
        self.dispatch(events);
        shown
    }

    /// Moves the visible column at `from` to `to`.
    pub fn move_column(&self, from: usize, to: usize) -> bool {
        {
            let mut inner = self.inner.write();
            let count = inner.visible.len();
            if from >= count || to >= count {
                tracing::trace!(target: targets::COLUMNS, from, to, count, "ignoring out-of-range column move");
                return false;
            }
            if from == to {
                return false;
            }
            let column = inner.visible.remove(from);
            inner.visible.insert(to, column);
        }
        tracing::debug!(target: targets::COLUMNS, from, to, "column moved");
        self.dispatch(vec![ColumnEvent::Moved(from, to)]);
        true
    }

    // =========================================================================
    // Widths
    // =========================================================================

    /// Sets the preferred width of `id`, clamped into its bounds.
    pub fn set_preferred_width(&self, id: &ColumnId, width: u32) -> bool {
        self.update_widths(id, |column| column.set_pref_width(width))
    }

    /// Sets all width values of `id`; see [`Column::set_width_bounds`].
    pub fn set_width_bounds(&self, id: &ColumnId, min_width: u32, max_width: u32, pref_width: u32) -> bool {
        self.update_widths(id, |column| column.set_width_bounds(min_width, max_width, pref_width))
    }

    fn update_widths(&self, id: &ColumnId, update: impl FnOnce(&mut Column)) -> bool {
        let changed = {
            let mut inner = self.inner.write();
            let Some(column) = inner.column_mut(id) else {
                return false;
            };
            let before = (column.min_width(), column.max_width(), column.pref_width());
            update(column);
            before != (column.min_width(), column.max_width(), column.pref_width())
        };
        if changed {
            self.dispatch(vec![ColumnEvent::Width(id.clone())]);
        }
        changed
    }

    // =========================================================================
    // Snapshot / Restore
    // =========================================================================

    /// Captures the state of every known column: visible columns in display
    /// order, then hidden columns in hide order.
    pub fn snapshot(&self) -> Vec<ColumnState> {
        let inner = self.inner.read();
        let visible = inner
            .visible
            .iter()
            .enumerate()
            .map(|(index, column)| column_state(column, index, false));
        let hidden = inner
            .hidden
            .iter()
            .map(|h| column_state(&h.column, h.last_index, true));
        visible.chain(hidden).collect()
    }

    /// Checks whether `states` describe exactly the known columns.
    ///
    /// Duplicate ids in `states` are an error.
    pub fn is_compatible(&self, states: &[ColumnState]) -> Result<bool> {
        let ids = unique_ids(states)?;
        let inner = self.inner.read();
        Ok(ids.len() == inner.len() && ids.iter().all(|id| inner.contains(id)))
    }

    /// Re-applies a snapshot.
    ///
    /// Returns `Ok(false)` without touching anything if the snapshot was
    /// taken from a different set of columns. Otherwise every column gets
    /// its widths, visibility and position back: visible columns are
    /// ordered by their snapshotted index and hidden columns keep the
    /// snapshotted hide order and remembered positions.
    pub fn restore(&self, states: &[ColumnState]) -> Result<bool> {
        let ids = unique_ids(states)?;
        {
            let mut inner = self.inner.write();
            if ids.len() != inner.len() || !ids.iter().all(|id| inner.contains(id)) {
                tracing::debug!(target: targets::STATE, "column state does not match known columns");
                return Ok(false);
            }

            let mut pool: Vec<Column> = std::mem::take(&mut inner.visible)
                .into_iter()
                .chain(std::mem::take(&mut inner.hidden).into_iter().map(|h| h.column))
                .collect();
            let mut take = |id: &ColumnId| -> Option<Column> {
                let pos = pool.iter().position(|c| c.id() == id)?;
                Some(pool.swap_remove(pos))
            };

            let mut visible: Vec<(usize, Column)> = Vec::new();
            let mut hidden: Vec<HiddenColumn> = Vec::new();
            for state in states {
                let Some(mut column) = take(&state.col_id) else {
                    continue;
                };
                column.set_width_bounds(state.min_width, state.max_width, state.pref_width);
                if state.hidden {
                    hidden.push(HiddenColumn {
                        column,
                        last_index: state.index,
                    });
                } else {
                    visible.push((state.index, column));
                }
            }
            // A stable sort keeps snapshot order among equal indices.
            visible.sort_by_key(|(index, _)| *index);
            inner.visible = visible.into_iter().map(|(_, column)| column).collect();
            inner.hidden = hidden;

            if inner.visible.is_empty() && !inner.hidden.is_empty() {
                inner.show_at(0);
            }
            inner.debug_check();
        }

        tracing::debug!(target: targets::STATE, columns = states.len(), "restored column state");
        self.dispatch(vec![ColumnEvent::Restored]);
        Ok(true)
    }

    fn dispatch(&self, events: Vec<ColumnEvent>) {
        for event in events {
            match event {
                ColumnEvent::Added(index) => {
                    self.signals.column_added.emit(index);
                }
                ColumnEvent::Removed(id) => {
                    self.signals.column_removed.emit(id);
                }
                ColumnEvent::Moved(from, to) => {
                    self.signals.column_moved.emit((from, to));
                }
                ColumnEvent::Visibility(id, visible) => {
                    self.signals.visibility_changed.emit((id, visible));
                }
                ColumnEvent::Width(id) => {
                    self.signals.width_changed.emit(id);
                }
                ColumnEvent::Restored => {
                    self.signals.layout_restored.emit(());
                }
            }
        }
    }
}

fn column_state(column: &Column, index: usize, hidden: bool) -> ColumnState {
    ColumnState {
        col_id: column.id().clone(),
        min_width: column.min_width(),
        max_width: column.max_width(),
        pref_width: column.pref_width(),
        index,
        hidden,
    }
}

fn unique_ids(states: &[ColumnState]) -> Result<HashSet<&ColumnId>> {
    let mut ids = HashSet::with_capacity(states.len());
    for state in states {
        if !ids.insert(&state.col_id) {
            return Err(GridError::malformed(format!(
                "column id '{}' appears twice",
                state.col_id
            )));
        }
    }
    Ok(ids)
}

static_assertions::assert_impl_all!(ColumnVisibility: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnDefaults;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn ids(names: &[&str]) -> Vec<ColumnId> {
        names.iter().map(|&n| ColumnId::from(n)).collect()
    }

    fn columns(names: &[&str]) -> ColumnVisibility {
        let set = ColumnVisibility::new();
        for (i, &name) in names.iter().enumerate() {
            set.add_column(Column::new(ColumnId::from(name), i, name, ColumnDefaults::default()))
                .unwrap();
        }
        set
    }

    #[test]
    fn test_hide_and_show_restore_position() {
        let set = columns(&["A", "B", "C", "D"]);
        assert!(set.hide(&"B".into()));
        assert_eq!(set.visible_ids(), ids(&["A", "C", "D"]));
        assert!(set.is_hidden(&"B".into()));

        assert!(set.show(&"B".into()));
        assert_eq!(set.visible_ids(), ids(&["A", "B", "C", "D"]));
        assert!(!set.show(&"B".into()));
    }

    #[test]
    fn test_show_appends_when_position_is_gone() {
        let set = columns(&["A", "B", "C"]);
        set.hide(&"C".into());
        set.remove_column(&"B".into());
        assert!(set.show(&"C".into()));
        assert_eq!(set.visible_ids(), ids(&["A", "C"]));
    }

    #[test]
    fn test_last_visible_column_stays() {
        let set = columns(&["A", "B"]);
        assert!(set.hide(&"A".into()));
        assert!(!set.hide(&"B".into()));
        assert_eq!(set.visible_ids(), ids(&["B"]));
        assert!(!set.hide(&"Z".into()));
    }

    #[test]
    fn test_show_all_reverse_order() {
        let set = columns(&["A", "B", "C", "D"]);
        set.hide(&"B".into());
        set.hide(&"C".into());
        assert_eq!(set.visible_ids(), ids(&["A", "D"]));
        assert_eq!(set.show_all(), 2);
        assert_eq!(set.visible_ids(), ids(&["A", "B", "C", "D"]));
    }

    #[test]
    fn test_duplicate_add() {
        let set = columns(&["A"]);
        let err = set
            .add_column(Column::new("A".into(), 3, "A", ColumnDefaults::default()))
            .unwrap_err();
        assert!(matches!(err, GridError::DuplicateColumn(id) if id.as_str() == "A"));

        set.hide(&"A".into());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_hidden_and_last_visible() {
        let set = columns(&["A", "B", "C"]);
        set.hide(&"B".into());
        assert!(set.remove_column(&"B".into()).is_some());
        assert_eq!(set.hidden_count(), 0);

        set.hide(&"C".into());
        assert!(set.remove_column(&"A".into()).is_some());
        // No visible column left: hidden bookkeeping goes too.
        assert!(set.is_empty());
        assert!(set.remove_column(&"C".into()).is_none());
    }

    #[test]
    fn test_move_column() {
        let set = columns(&["A", "B", "C"]);
        assert!(set.move_column(0, 2));
        assert_eq!(set.visible_ids(), ids(&["B", "C", "A"]));
        assert!(!set.move_column(0, 3));
        assert!(!set.move_column(1, 1));
        assert_eq!(set.model_index_at(2), Some(0));
    }

    #[test]
    fn test_snapshot_layout() {
        let set = columns(&["A", "B", "C"]);
        set.set_preferred_width(&"C".into(), 120);
        set.hide(&"A".into());
        let states = set.snapshot();

        let layout: Vec<_> = states
            .iter()
            .map(|s| (s.col_id.as_str(), s.index, s.hidden))
            .collect();
        assert_eq!(layout, vec![("B", 0, false), ("C", 1, false), ("A", 0, true)]);
        assert_eq!(states[1].pref_width, 120);
    }

    #[test]
    fn test_restore_identity() {
        let set = columns(&["A", "B", "C", "D"]);
        set.hide(&"C".into());
        set.move_column(0, 2);
        set.set_width_bounds(&"B".into(), 20, 300, 90);
        let before = set.snapshot();

        assert!(set.restore(&before).unwrap());
        assert_eq!(set.snapshot(), before);
    }

    #[test]
    fn test_restore_reapplies_layout() {
        let set = columns(&["A", "B", "C"]);
        set.hide(&"B".into());
        set.set_preferred_width(&"A".into(), 200);
        let saved = set.snapshot();

        set.show_all();
        set.move_column(0, 2);
        set.set_preferred_width(&"A".into(), 50);

        assert!(set.restore(&saved).unwrap());
        assert_eq!(set.visible_ids(), ids(&["A", "C"]));
        assert_eq!(set.hidden_ids(), ids(&["B"]));
        assert_eq!(set.column(&"A".into()).map(|c| c.pref_width()), Some(200));

        set.show(&"B".into());
        assert_eq!(set.visible_ids(), ids(&["A", "B", "C"]));
    }

    #[test]
    fn test_restore_mismatch_is_untouched() {
        let set = columns(&["A", "B"]);
        let other = columns(&["A", "X"]);
        set.hide(&"B".into());
        let before = set.snapshot();

        assert!(!set.restore(&other.snapshot()).unwrap());
        assert_eq!(set.snapshot(), before);
        assert!(!set.is_compatible(&columns(&["A"]).snapshot()).unwrap());
    }

    #[test]
    fn test_restore_duplicate_ids_is_error() {
        let set = columns(&["A", "B"]);
        let mut states = set.snapshot();
        states[1].col_id = "A".into();
        assert!(matches!(set.restore(&states), Err(GridError::MalformedState(_))));
    }

    #[test]
    fn test_restore_keeps_one_visible() {
        let set = columns(&["A", "B"]);
        let mut states = set.snapshot();
        for state in &mut states {
            state.hidden = true;
        }
        assert!(set.restore(&states).unwrap());
        assert_eq!(set.visible_count(), 1);
    }

    #[test]
    fn test_signals_after_unlock() {
        let set = Arc::new(columns(&["A", "B"]));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let set_clone = set.clone();
        let seen_clone = seen.clone();
        set.signals().visibility_changed.connect(move |(id, visible)| {
            // Reading back inside the slot must not deadlock.
            seen_clone
                .lock()
                .push((id.clone(), *visible, set_clone.visible_count()));
        });

        set.hide(&"A".into());
        set.show_all();
        assert_eq!(
            *seen.lock(),
            vec![(ColumnId::from("A"), false, 1), (ColumnId::from("A"), true, 2)]
        );
    }

    #[test]
    fn test_width_signal_only_on_change() {
        let set = columns(&["A"]);
        let count = Arc::new(Mutex::new(0));
        let count_clone = count.clone();
        set.signals().width_changed.connect(move |_| *count_clone.lock() += 1);

        assert!(set.set_preferred_width(&"A".into(), 100));
        assert!(!set.set_preferred_width(&"A".into(), 100));
        assert!(!set.set_preferred_width(&"Z".into(), 100));
        assert_eq!(*count.lock(), 1);
    }
}
