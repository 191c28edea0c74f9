//! The data source interface.
//!
//! A [`DataSource`] is a rectangular grid of [`CellValue`]s with named,
//! typed columns. Sources announce every mutation through the `changed`
//! signal in their [`SourceSignals`], carrying a [`TableChange`] that
//! describes the affected rows and columns.

use gridstate_core::Signal;

use super::compare::CompareFn;
use super::value::{CellValue, ValueKind};

/// What kind of mutation a [`TableChange`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Rows `first_row..=last_row` were inserted.
    Insert,
    /// Rows `first_row..=last_row` were removed.
    Delete,
    /// Cells in rows `first_row..=last_row` changed value.
    Update,
    /// The column layout changed; everything must be re-read.
    Structure,
}

/// The columns a [`TableChange`] touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangedColumns {
    /// Every column.
    All,
    /// A single column.
    Single(usize),
}

/// A change notification emitted by a [`DataSource`].
///
/// For an update that covers the whole table, `last_row` is `usize::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableChange {
    /// The kind of change.
    pub kind: ChangeKind,
    /// First affected row.
    pub first_row: usize,
    /// Last affected row, inclusive.
    pub last_row: usize,
    /// Affected columns.
    pub columns: ChangedColumns,
}

impl TableChange {
    /// Rows `first..=last` were inserted.
    pub fn rows_inserted(first: usize, last: usize) -> Self {
        Self {
            kind: ChangeKind::Insert,
            first_row: first,
            last_row: last,
            columns: ChangedColumns::All,
        }
    }

    /// Rows `first..=last` were removed.
    pub fn rows_deleted(first: usize, last: usize) -> Self {
        Self {
            kind: ChangeKind::Delete,
            first_row: first,
            last_row: last,
            columns: ChangedColumns::All,
        }
    }

    /// One column of rows `first..=last` changed.
    pub fn cells_updated(first: usize, last: usize, column: usize) -> Self {
        Self {
            kind: ChangeKind::Update,
            first_row: first,
            last_row: last,
            columns: ChangedColumns::Single(column),
        }
    }

    /// Every column of rows `first..=last` changed.
    pub fn rows_updated(first: usize, last: usize) -> Self {
        Self {
            kind: ChangeKind::Update,
            first_row: first,
            last_row: last,
            columns: ChangedColumns::All,
        }
    }

    /// Any cell may have changed, but the columns are the same.
    pub fn data_changed() -> Self {
        Self::rows_updated(0, usize::MAX)
    }

    /// The column layout changed.
    pub fn structure_changed() -> Self {
        Self {
            kind: ChangeKind::Structure,
            first_row: 0,
            last_row: usize::MAX,
            columns: ChangedColumns::All,
        }
    }

    /// Returns `true` if the change may affect values in `column`.
    pub fn touches_column(&self, column: usize) -> bool {
        match self.columns {
            ChangedColumns::All => true,
            ChangedColumns::Single(c) => c == column,
        }
    }

    /// Returns `true` for [`ChangeKind::Structure`].
    pub fn is_structural(&self) -> bool {
        self.kind == ChangeKind::Structure
    }
}

/// Signals emitted by a data source.
#[derive(Default)]
pub struct SourceSignals {
    /// Emitted after the source's contents or layout changed.
    pub changed: Signal<TableChange>,
}

impl SourceSignals {
    /// Creates a new set of source signals.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A tabular data source.
///
/// Implementations must be thread-safe; they usually keep their data behind
/// a lock and emit [`SourceSignals::changed`] after releasing it.
///
/// # Required Methods
///
/// - [`row_count`](Self::row_count) and [`column_count`](Self::column_count)
/// - [`value`](Self::value): out-of-range cells read as [`CellValue::Empty`]
/// - [`signals`](Self::signals)
///
/// Everything else has a read-only default.
pub trait DataSource: Send + Sync {
    /// Number of rows.
    fn row_count(&self) -> usize;

    /// Number of columns.
    fn column_count(&self) -> usize;

    /// The value at `row`, `column`.
    fn value(&self, row: usize, column: usize) -> CellValue;

    /// Stores `value` at `row`, `column`. Returns `true` if the cell changed.
    fn set_value(&self, _row: usize, _column: usize, _value: CellValue) -> bool {
        false
    }

    /// Returns `true` if the cell accepts [`set_value`](Self::set_value).
    fn is_editable(&self, _row: usize, _column: usize) -> bool {
        false
    }

    /// The column's name. Defaults to spreadsheet lettering: `A`, `B`, ...
    /// `Z`, `AA`, ...
    fn column_name(&self, column: usize) -> Option<String> {
        Some(spreadsheet_name(column))
    }

    /// The kind of value the column holds.
    fn column_kind(&self, _column: usize) -> ValueKind {
        ValueKind::Any
    }

    /// A comparator for the column, if it needs something other than
    /// [`natural_cmp`](super::natural_cmp).
    fn comparator(&self, _column: usize) -> Option<CompareFn> {
        None
    }

    /// The source's change signals.
    fn signals(&self) -> &SourceSignals;
}

/// Spreadsheet-style column lettering.
fn spreadsheet_name(mut column: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (column % 26) as u8);
        if column < 26 {
            break;
        }
        column = column / 26 - 1;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

/// The names of every column of `source`, in order.
pub fn column_names(source: &dyn DataSource) -> Vec<Option<String>> {
    (0..source.column_count())
        .map(|column| source.column_name(column))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Grid;

    impl DataSource for Grid {
        fn row_count(&self) -> usize {
            2
        }

        fn column_count(&self) -> usize {
            3
        }

        fn value(&self, row: usize, column: usize) -> CellValue {
            CellValue::from((row * 10 + column) as i64)
        }

        fn signals(&self) -> &SourceSignals {
            static SIGNALS: std::sync::OnceLock<SourceSignals> = std::sync::OnceLock::new();
            SIGNALS.get_or_init(SourceSignals::new)
        }
    }

    #[test]
    fn test_spreadsheet_names() {
        assert_eq!(spreadsheet_name(0), "A");
        assert_eq!(spreadsheet_name(25), "Z");
        assert_eq!(spreadsheet_name(26), "AA");
        assert_eq!(spreadsheet_name(27), "AB");
        assert_eq!(spreadsheet_name(701), "ZZ");
        assert_eq!(spreadsheet_name(702), "AAA");
    }

    #[test]
    fn test_defaults() {
        let grid = Grid;
        assert_eq!(
            column_names(&grid),
            vec![Some("A".to_string()), Some("B".to_string()), Some("C".to_string())]
        );
        assert!(!grid.is_editable(0, 0));
        assert!(!grid.set_value(0, 0, CellValue::Empty));
        assert_eq!(grid.column_kind(1), ValueKind::Any);
        assert!(grid.comparator(0).is_none());
    }

    #[test]
    fn test_change_helpers() {
        let update = TableChange::cells_updated(1, 2, 3);
        assert!(update.touches_column(3));
        assert!(!update.touches_column(0));
        assert!(!update.is_structural());

        assert!(TableChange::data_changed().touches_column(99));
        assert!(TableChange::structure_changed().is_structural());
        assert_eq!(TableChange::rows_inserted(4, 5).kind, ChangeKind::Insert);
    }
}
