//! In-memory table model.
//!
//! `TableModel` holds rows of [`CellValue`]s under a set of column
//! definitions. It is the simplest useful [`DataSource`] and the one the
//! demos and tests build on.

use std::cmp::Ordering;
use std::sync::Arc;

use parking_lot::RwLock;

use super::compare::CompareFn;
use super::source::{DataSource, SourceSignals, TableChange};
use super::value::{CellValue, ValueKind};

/// Definition of one column of a [`TableModel`].
#[derive(Clone)]
pub struct ColumnDef {
    /// Column name, or `None` for an unnamed column.
    pub name: Option<String>,
    /// Kind of value the column holds.
    pub kind: ValueKind,
    /// Whether cells in the column can be edited.
    pub editable: bool,
    /// Column-specific comparator.
    pub comparator: Option<CompareFn>,
}

impl ColumnDef {
    /// A named, read-only column of unspecified kind.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            kind: ValueKind::Any,
            editable: false,
            comparator: None,
        }
    }

    /// An unnamed, read-only column of unspecified kind.
    pub fn unnamed() -> Self {
        Self {
            name: None,
            kind: ValueKind::Any,
            editable: false,
            comparator: None,
        }
    }
}

impl std::fmt::Debug for ColumnDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("editable", &self.editable)
            .field("comparator", &self.comparator.is_some())
            .finish()
    }
}

/// A table of values held in memory.
///
/// Rows shorter than the column count read as [`CellValue::Empty`] in the
/// missing cells; longer rows are truncated when inserted.
///
/// # Example
///
/// ```
/// use gridstate::model::{CellValue, DataSource, TableModel};
///
/// let model = TableModel::new(["Name", "Age"])
///     .with_rows(vec![
///         vec!["Alice".into(), CellValue::from(30)],
///         vec!["Bob".into(), CellValue::from(25)],
///     ]);
///
/// assert_eq!(model.row_count(), 2);
/// assert_eq!(model.value(1, 0).to_string(), "Bob");
/// ```
pub struct TableModel {
    columns: RwLock<Vec<ColumnDef>>,
    rows: RwLock<Vec<Vec<CellValue>>>,
    signals: SourceSignals,
}

impl TableModel {
    /// Creates an empty table with the given column names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_columns(names.into_iter().map(ColumnDef::named).collect())
    }

    /// Creates an empty table with full column definitions.
    pub fn with_columns(columns: Vec<ColumnDef>) -> Self {
        Self {
            columns: RwLock::new(columns),
            rows: RwLock::new(Vec::new()),
            signals: SourceSignals::new(),
        }
    }

    /// Sets the initial rows.
    pub fn with_rows(self, rows: Vec<Vec<CellValue>>) -> Self {
        let width = self.columns.read().len();
        *self.rows.write() = rows.into_iter().map(|row| fit_row(row, width)).collect();
        self
    }

    /// Sets a column-specific comparator.
    pub fn with_comparator<F>(self, column: usize, compare: F) -> Self
    where
        F: Fn(&CellValue, &CellValue) -> Ordering + Send + Sync + 'static,
    {
        if let Some(def) = self.columns.write().get_mut(column) {
            def.comparator = Some(Arc::new(compare));
        }
        self
    }

    /// Sets the kind of a column.
    pub fn with_kind(self, column: usize, kind: ValueKind) -> Self {
        if let Some(def) = self.columns.write().get_mut(column) {
            def.kind = kind;
        }
        self
    }

    /// Makes a column editable.
    pub fn with_editable(self, column: usize) -> Self {
        if let Some(def) = self.columns.write().get_mut(column) {
            def.editable = true;
        }
        self
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Returns a copy of the row at `row`.
    pub fn row(&self, row: usize) -> Option<Vec<CellValue>> {
        self.rows.read().get(row).cloned()
    }

    /// Appends a row.
    pub fn push_row(&self, row: Vec<CellValue>) {
        let index = {
            let width = self.columns.read().len();
            let mut rows = self.rows.write();
            rows.push(fit_row(row, width));
            rows.len() - 1
        };
        self.signals.changed.emit(TableChange::rows_inserted(index, index));
    }

    /// Inserts a row at `index`, clamped to the row count.
    pub fn insert_row(&self, index: usize, row: Vec<CellValue>) {
        let index = {
            let width = self.columns.read().len();
            let mut rows = self.rows.write();
            let index = index.min(rows.len());
            rows.insert(index, fit_row(row, width));
            index
        };
        self.signals.changed.emit(TableChange::rows_inserted(index, index));
    }

    /// Removes and returns the row at `index`.
    pub fn remove_row(&self, index: usize) -> Option<Vec<CellValue>> {
        let removed = {
            let mut rows = self.rows.write();
            if index >= rows.len() {
                return None;
            }
            rows.remove(index)
        };
        self.signals.changed.emit(TableChange::rows_deleted(index, index));
        Some(removed)
    }

    /// Replaces every row. The columns are unchanged.
    pub fn set_rows(&self, rows: Vec<Vec<CellValue>>) {
        {
            let width = self.columns.read().len();
            *self.rows.write() = rows.into_iter().map(|row| fit_row(row, width)).collect();
        }
        self.signals.changed.emit(TableChange::data_changed());
    }

    /// Replaces the column definitions and all rows.
    pub fn set_columns(&self, columns: Vec<ColumnDef>, rows: Vec<Vec<CellValue>>) {
        {
            let width = columns.len();
            *self.columns.write() = columns;
            *self.rows.write() = rows.into_iter().map(|row| fit_row(row, width)).collect();
        }
        self.signals.changed.emit(TableChange::structure_changed());
    }

    /// Removes every row.
    pub fn clear(&self) {
        let count = {
            let mut rows = self.rows.write();
            let count = rows.len();
            rows.clear();
            count
        };
        if count > 0 {
            self.signals.changed.emit(TableChange::rows_deleted(0, count - 1));
        }
    }
}

fn fit_row(mut row: Vec<CellValue>, width: usize) -> Vec<CellValue> {
    row.resize(width, CellValue::Empty);
    row
}

impl DataSource for TableModel {
    fn row_count(&self) -> usize {
        self.rows.read().len()
    }

    fn column_count(&self) -> usize {
        self.columns.read().len()
    }

    fn value(&self, row: usize, column: usize) -> CellValue {
        self.rows
            .read()
            .get(row)
            .and_then(|r| r.get(column))
            .cloned()
            .unwrap_or_default()
    }

    fn set_value(&self, row: usize, column: usize, value: CellValue) -> bool {
        if !self.is_editable(row, column) {
            return false;
        }
        {
            let mut rows = self.rows.write();
            match rows.get_mut(row).and_then(|r| r.get_mut(column)) {
                Some(cell) => *cell = value,
                None => return false,
            }
        }
        self.signals
            .changed
            .emit(TableChange::cells_updated(row, row, column));
        true
    }

    fn is_editable(&self, row: usize, column: usize) -> bool {
        row < self.row_count()
            && self
                .columns
                .read()
                .get(column)
                .is_some_and(|def| def.editable)
    }

    fn column_name(&self, column: usize) -> Option<String> {
        self.columns.read().get(column).and_then(|def| def.name.clone())
    }

    fn column_kind(&self, column: usize) -> ValueKind {
        self.columns
            .read()
            .get(column)
            .map(|def| def.kind)
            .unwrap_or(ValueKind::Any)
    }

    fn comparator(&self, column: usize) -> Option<CompareFn> {
        self.columns
            .read()
            .get(column)
            .and_then(|def| def.comparator.clone())
    }

    fn signals(&self) -> &SourceSignals {
        &self.signals
    }
}

static_assertions::assert_impl_all!(TableModel: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::source::ChangeKind;
    use parking_lot::Mutex;

    fn record(model: &TableModel) -> Arc<Mutex<Vec<TableChange>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        model.signals().changed.connect(move |change| {
            events_clone.lock().push(*change);
        });
        events
    }

    #[test]
    fn test_rows_are_fitted_to_columns() {
        let model = TableModel::new(["A", "B"]).with_rows(vec![
            vec![CellValue::from(1)],
            vec![CellValue::from(1), CellValue::from(2), CellValue::from(3)],
        ]);
        assert!(model.value(0, 1).is_empty());
        assert_eq!(model.row(1).map(|r| r.len()), Some(2));
        assert!(model.value(9, 9).is_empty());
    }

    #[test]
    fn test_row_mutations_emit_changes() {
        let model = TableModel::new(["A"]);
        let events = record(&model);

        model.push_row(vec![CellValue::from("x")]);
        model.insert_row(0, vec![CellValue::from("y")]);
        assert_eq!(model.value(0, 0).to_string(), "y");
        assert_eq!(model.remove_row(1).map(|r| r[0].to_string()), Some("x".into()));
        assert!(model.remove_row(5).is_none());

        let kinds: Vec<_> = events.lock().iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Insert, ChangeKind::Insert, ChangeKind::Delete]);
    }

    #[test]
    fn test_set_value_requires_editable_column() {
        let model = TableModel::new(["A", "B"])
            .with_editable(1)
            .with_rows(vec![vec![CellValue::from(1), CellValue::from(2)]]);
        let events = record(&model);

        assert!(!model.set_value(0, 0, CellValue::from(5)));
        assert!(model.set_value(0, 1, CellValue::from(5)));
        assert!(!model.set_value(3, 1, CellValue::from(5)));
        assert_eq!(model.value(0, 1).as_int(), Some(5));
        assert_eq!(*events.lock(), vec![TableChange::cells_updated(0, 0, 1)]);
    }

    #[test]
    fn test_set_columns_is_structural() {
        let model = TableModel::new(["A"]);
        let events = record(&model);

        model.set_columns(
            vec![ColumnDef::named("X"), ColumnDef::unnamed()],
            vec![vec![CellValue::from(1)]],
        );
        assert_eq!(model.column_count(), 2);
        assert_eq!(model.column_name(1), None);
        assert!(events.lock()[0].is_structural());
    }

    #[test]
    fn test_comparator_and_kind() {
        let model = TableModel::new(["A"])
            .with_kind(0, ValueKind::Int)
            .with_comparator(0, |a, b| natural_reverse(a, b));
        assert_eq!(model.column_kind(0), ValueKind::Int);
        let compare = model.comparator(0).unwrap();
        assert_eq!(compare(&CellValue::from(1), &CellValue::from(2)), Ordering::Greater);
        assert!(model.comparator(1).is_none());
    }

    fn natural_reverse(a: &CellValue, b: &CellValue) -> Ordering {
        crate::model::natural_cmp(b, a)
    }
}
