//! Data sources and row sorting.
//!
//! This module holds everything on the row side of a table view:
//!
//! - `CellValue`: Dynamically typed cell content
//! - `natural_cmp` / `ordered_cmp`: The default value ordering and its
//!   direction transform
//! - `DataSource`: The trait that tabular models implement
//! - `TableModel`: A concrete in-memory source
//! - `SortIndex`: The view row -> source row permutation
//! - `SortingModel`: A `DataSource` decorator that sorts another source
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gridstate::model::{CellValue, DataSource, SortOrder, SortingModel, TableModel};
//!
//! let table = Arc::new(TableModel::new(["Color", "Number"]).with_rows(vec![
//!     vec!["red".into(), CellValue::from(200)],
//!     vec!["blue".into(), CellValue::from(100)],
//! ]));
//! let sorted = SortingModel::new(table.clone());
//!
//! // Re-announce changes to whoever draws the table
//! sorted.signals().changed.connect(|change| {
//!     println!("rows {}..={} changed", change.first_row, change.last_row);
//! });
//!
//! sorted.sort_by(Some(1), SortOrder::Ascending);
//! assert_eq!(sorted.value(0, 0).to_string(), "blue");
//! ```
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────┐  changed  ┌──────────────┐  changed  ┌─────────────┐
//! │ DataSource  │──────────>│ SortingModel │──────────>│    View     │
//! │ (TableModel)│           │ (SortIndex)  │           │             │
//! └─────────────┘           └──────────────┘           └─────────────┘
//! ```

pub mod compare;
mod sort_index;
mod sorting_model;
mod source;
pub(crate) mod table_model;
mod value;

pub use compare::{CompareFn, SortOrder, natural_cmp, natural_comparator, ordered_cmp};
pub use sort_index::{SortIndex, resolve_comparator};
pub use sorting_model::SortingModel;
pub use source::{ChangeKind, ChangedColumns, DataSource, SourceSignals, TableChange, column_names};
pub use table_model::{ColumnDef, TableModel};
pub use value::{CellValue, CustomValue, ValueKind};
