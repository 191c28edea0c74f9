//! Column identity, width bounds and visibility.
//!
//! Columns live on the display side only. Hiding, showing or moving a column
//! never changes the data source; it only changes which source column is
//! drawn at which position.
//!
//! - `ColumnId`: Stable column identity, derived from the column name
//! - `Column`: Identity, source column, header and width bounds
//! - `ColumnVisibility`: Ordered visible columns plus remembered hidden ones

mod column;
mod visibility;

pub use column::{Column, ColumnDefaults, ColumnId};
pub use visibility::{ColumnSignals, ColumnVisibility};
