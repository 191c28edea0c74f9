//! Column width layout.
//!
//! A [`ColumnLayout`] recomputes the preferred widths of the visible columns
//! from the data. The coordinator calls it when a source is first attached
//! and whenever saved column state could not be re-applied.

use gridstate_core::logging::targets;

use crate::columns::ColumnVisibility;
use crate::model::DataSource;

/// Recomputes preferred column widths.
///
/// Any `Fn(&dyn DataSource, &ColumnVisibility)` closure is a layout, which
/// is handy when the real measurement lives in a renderer:
///
/// ```
/// use std::sync::Arc;
/// use gridstate::layout::ColumnLayout;
///
/// let fixed: Arc<dyn ColumnLayout> = Arc::new(|_source: &dyn gridstate::model::DataSource,
///                                              columns: &gridstate::columns::ColumnVisibility| {
///     for id in columns.visible_ids() {
///         columns.set_preferred_width(&id, 100);
///     }
/// });
/// # let _ = fixed;
/// ```
pub trait ColumnLayout: Send + Sync {
    /// Sets the preferred width of every visible column of `columns`, reading
    /// cell content from `source`.
    fn balance(&self, source: &dyn DataSource, columns: &ColumnVisibility);
}

impl<F> ColumnLayout for F
where
    F: Fn(&dyn DataSource, &ColumnVisibility) + Send + Sync,
{
    fn balance(&self, source: &dyn DataSource, columns: &ColumnVisibility) {
        self(source, columns)
    }
}

/// Sizes columns by the length of their longest text.
///
/// The width of a column is the larger of its header and its widest cell,
/// measured in characters of a fixed width, plus padding. Cells never count
/// as narrower than `minimum_cell_width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextWidthLayout {
    /// Width of one character.
    pub char_width: u32,
    /// Extra width added to every measured text.
    pub padding: u32,
    /// Lower bound for the measured cell width.
    pub minimum_cell_width: u32,
}

impl Default for TextWidthLayout {
    fn default() -> Self {
        Self {
            char_width: 7,
            padding: 8,
            minimum_cell_width: 10,
        }
    }
}

impl TextWidthLayout {
    fn measure(&self, text: &str) -> u32 {
        let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        chars.saturating_mul(self.char_width).saturating_add(self.padding)
    }
}

impl ColumnLayout for TextWidthLayout {
    fn balance(&self, source: &dyn DataSource, columns: &ColumnVisibility) {
        let row_count = source.row_count();
        for column in columns.visible_columns() {
            let header_width = self.measure(column.header());
            let cell_width = (0..row_count)
                .map(|row| self.measure(&source.value(row, column.model_index()).to_string()))
                .fold(self.minimum_cell_width, u32::max);
            columns.set_preferred_width(column.id(), header_width.max(cell_width));
        }
        tracing::debug!(target: targets::COLUMNS, columns = columns.visible_count(), "balanced column widths");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{Column, ColumnDefaults, ColumnId};
    use crate::model::{CellValue, TableModel};

    fn setup() -> (TableModel, ColumnVisibility) {
        let model = TableModel::new(["Id", "Description"]).with_rows(vec![
            vec![CellValue::from(1), CellValue::from("short")],
            vec![CellValue::from(22), CellValue::from("a much longer text")],
        ]);
        let columns = ColumnVisibility::new();
        for (i, name) in ["Id", "Description"].into_iter().enumerate() {
            columns
                .add_column(Column::new(ColumnId::from(name), i, name, ColumnDefaults::default()))
                .unwrap();
        }
        (model, columns)
    }

    #[test]
    fn test_text_width_layout() {
        let (model, columns) = setup();
        TextWidthLayout::default().balance(&model, &columns);

        // "Id" header: 2 * 7 + 8 = 22; cells are narrower.
        assert_eq!(columns.column(&"Id".into()).map(|c| c.pref_width()), Some(22));
        // Longest cell: 18 chars.
        assert_eq!(columns.column(&"Description".into()).map(|c| c.pref_width()), Some(134));
    }

    #[test]
    fn test_width_respects_column_bounds() {
        let (model, columns) = setup();
        columns.set_width_bounds(&"Description".into(), 15, 100, 50);
        TextWidthLayout::default().balance(&model, &columns);
        assert_eq!(columns.column(&"Description".into()).map(|c| c.pref_width()), Some(100));
    }

    #[test]
    fn test_closure_layout() {
        let (model, columns) = setup();
        let layout = |_: &dyn DataSource, columns: &ColumnVisibility| {
            for id in columns.visible_ids() {
                columns.set_preferred_width(&id, 42);
            }
        };
        layout.balance(&model, &columns);
        assert_eq!(columns.column(&"Id".into()).map(|c| c.pref_width()), Some(42));
    }
}
