//! Row permutation for single-column sorting.
//!
//! [`SortIndex`] owns the mapping from view rows to source rows together with
//! the sort settings: the active sort column and a remembered direction
//! for every column. It holds no reference to the source; every operation
//! that needs data takes the source as an argument. [`SortingModel`] wraps
//! it into a decorating [`DataSource`].
//!
//! [`SortingModel`]: super::SortingModel

use std::panic::{self, AssertUnwindSafe};

use gridstate_core::PerfSpan;
use gridstate_core::logging::targets;

use super::compare::{CompareFn, SortOrder, natural_comparator, ordered_cmp};
use super::source::{ChangeKind, DataSource, TableChange, column_names};
use super::value::CellValue;
use crate::error::{GridError, Result};
use crate::state::SortState;

/// The row permutation and sort settings of a sorted view.
///
/// # Invariants
///
/// - The permutation is a bijection on `0..len()`.
/// - After any operation that took a source, `len()` equals the source's
///   row count and there is one direction per source column.
#[derive(Debug, Clone, Default)]
pub struct SortIndex {
    /// View row -> source row.
    view_to_source: Vec<usize>,
    /// Source row -> view row.
    source_to_view: Vec<usize>,
    /// The active sort column.
    sort_column: Option<usize>,
    /// Remembered direction per column.
    directions: Vec<SortOrder>,
}

impl SortIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unsorted index covering `source`.
    pub fn for_source(source: &dyn DataSource) -> Self {
        let mut index = Self::new();
        index.reset(source);
        index
    }

    /// Forgets the sort settings and returns to the identity
    /// permutation. All directions become ascending.
    pub fn reset(&mut self, source: &dyn DataSource) {
        self.sort_column = None;
        self.directions = vec![SortOrder::Ascending; source.column_count()];
        self.rebuild_identity(source.row_count());
    }

    /// Number of rows covered by the permutation.
    pub fn len(&self) -> usize {
        self.view_to_source.len()
    }

    /// Returns `true` if the permutation is empty.
    pub fn is_empty(&self) -> bool {
        self.view_to_source.is_empty()
    }

    /// The active sort column, if any.
    pub fn sort_column(&self) -> Option<usize> {
        self.sort_column
    }

    /// The remembered direction of `column`.
    pub fn order(&self, column: usize) -> SortOrder {
        self.directions.get(column).copied().unwrap_or_default()
    }

    /// The remembered direction of every column.
    pub fn directions(&self) -> &[SortOrder] {
        &self.directions
    }

    /// Maps a view row to its source row.
    pub fn map_to_source(&self, view_row: usize) -> Option<usize> {
        self.view_to_source.get(view_row).copied()
    }

    /// Maps a source row to the view row that displays it.
    pub fn map_from_source(&self, source_row: usize) -> Option<usize> {
        self.source_to_view.get(source_row).copied()
    }

    /// Sorts by `column` in `order`, or returns to source order for `None`.
    ///
    /// Returns `false` without touching anything if the requested sort is
    /// already active or `column` is out of range.
    pub fn sort_by(&mut self, source: &dyn DataSource, column: Option<usize>, order: SortOrder) -> bool {
        self.sync_directions(source.column_count());

        if let Some(column) = column {
            if column >= self.directions.len() {
                tracing::trace!(target: targets::SORT, column, "ignoring sort on out-of-range column");
                return false;
            }
        }

        let row_count = source.row_count();
        let already_active = self.sort_column == column
            && column.is_none_or(|c| self.directions[c] == order)
            && self.len() == row_count;
        if already_active {
            return false;
        }

        self.sort_column = column;
        if let Some(column) = column {
            self.directions[column] = order;
        }
        self.resort(source);
        true
    }

    /// Header-click semantics: flips the direction of the active sort
    /// column, or activates `column` with its remembered direction.
    pub fn toggle(&mut self, source: &dyn DataSource, column: usize) -> bool {
        self.sync_directions(source.column_count());
        if column >= self.directions.len() {
            tracing::trace!(target: targets::SORT, column, "ignoring toggle on out-of-range column");
            return false;
        }

        let order = if self.sort_column == Some(column) {
            self.directions[column].reversed()
        } else {
            self.directions[column]
        };
        self.sort_by(source, Some(column), order)
    }

    /// Rebuilds the permutation from scratch and re-applies the active sort.
    pub fn resort(&mut self, source: &dyn DataSource) {
        let row_count = source.row_count();
        let mut rows: Vec<usize> = (0..row_count).collect();

        if let Some(column) = self.sort_column {
            let _span = PerfSpan::new("sort_index.resort");
            let order = self.order(column);
            let compare = resolve_comparator(source, column);
            let keys: Vec<CellValue> = (0..row_count).map(|row| source.value(row, column)).collect();

            // `sort_by` may panic on a comparator that is not a total order,
            // which mixed-kind columns can produce. The slice still holds
            // every row afterwards.
            let sorted = panic::catch_unwind(AssertUnwindSafe(|| {
                rows.sort_by(|&a, &b| ordered_cmp(&*compare, order, &keys[a], &keys[b]));
            }));
            if sorted.is_err() {
                tracing::warn!(
                    target: targets::SORT,
                    column,
                    "comparator is not a total order; rows left partially sorted"
                );
            }
            tracing::debug!(target: targets::SORT, column, ?order, rows = row_count, "sorted rows");
        }

        self.install(rows);
    }

    /// Updates the permutation after the source announced `change`.
    ///
    /// Returns `true` if the permutation or the sort settings changed.
    pub fn handle_change(&mut self, source: &dyn DataSource, change: &TableChange) -> bool {
        if change.kind == ChangeKind::Structure {
            self.reset(source);
            return true;
        }

        self.sync_directions(source.column_count());
        if let Some(column) = self.sort_column {
            if column >= self.directions.len() {
                self.sort_column = None;
            }
        }

        let stale = self.len() != source.row_count();
        let needs_resort = match change.kind {
            ChangeKind::Update => {
                stale || self.sort_column.is_some_and(|column| change.touches_column(column))
            }
            _ => true,
        };

        if needs_resort {
            self.resort(source);
        }
        needs_resort
    }

    /// Captures the sort settings along with the current column names.
    pub fn snapshot(&self, source: &dyn DataSource) -> SortState {
        let column_count = source.column_count();
        let mut directions = self.directions.clone();
        directions.resize(column_count, SortOrder::Ascending);
        SortState {
            sort_column: self.sort_column.filter(|&c| c < column_count),
            column_names: column_names(source),
            directions,
        }
    }

    /// Checks whether `state` can be applied to `source`.
    ///
    /// Returns `Ok(false)` when the column names differ, position for
    /// position. A state whose shape is inconsistent is an error.
    pub fn is_compatible(source: &dyn DataSource, state: &SortState) -> Result<bool> {
        validate(state)?;
        Ok(state.column_names == column_names(source))
    }

    /// Re-applies a captured sort settings.
    ///
    /// Returns `Ok(false)` and leaves the index untouched if `state` was
    /// captured from a differently shaped source.
    pub fn restore(&mut self, source: &dyn DataSource, state: &SortState) -> Result<bool> {
        if !Self::is_compatible(source, state)? {
            tracing::debug!(target: targets::STATE, "sort state does not match source columns");
            return Ok(false);
        }

        self.directions = state.directions.clone();
        self.sort_column = state.sort_column;
        self.resort(source);
        tracing::debug!(target: targets::STATE, sort_column = ?self.sort_column, "restored sort state");
        Ok(true)
    }

    fn sync_directions(&mut self, column_count: usize) {
        if self.directions.len() != column_count {
            self.directions.resize(column_count, SortOrder::Ascending);
        }
    }

    fn rebuild_identity(&mut self, row_count: usize) {
        self.install((0..row_count).collect());
    }

    fn install(&mut self, view_to_source: Vec<usize>) {
        let mut source_to_view = vec![0; view_to_source.len()];
        for (view_row, &source_row) in view_to_source.iter().enumerate() {
            source_to_view[source_row] = view_row;
        }
        self.view_to_source = view_to_source;
        self.source_to_view = source_to_view;
        debug_assert!(self.is_bijection(), "row permutation lost its bijection");
    }

    fn is_bijection(&self) -> bool {
        self.view_to_source
            .iter()
            .enumerate()
            .all(|(view_row, &source_row)| self.source_to_view.get(source_row) == Some(&view_row))
    }
}

/// The comparator for `column`: the source's own, else the natural one.
pub fn resolve_comparator(source: &dyn DataSource, column: usize) -> CompareFn {
    source.comparator(column).unwrap_or_else(natural_comparator)
}

fn validate(state: &SortState) -> Result<()> {
    if state.directions.len() != state.column_names.len() {
        return Err(GridError::malformed(format!(
            "{} sort directions for {} columns",
            state.directions.len(),
            state.column_names.len()
        )));
    }
    if let Some(column) = state.sort_column {
        if column >= state.column_names.len() {
            return Err(GridError::malformed(format!(
                "sort column {column} outside {} columns",
                state.column_names.len()
            )));
        }
    }
    Ok(())
}
