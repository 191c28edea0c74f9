//! gridstate - sortable rows, hideable columns and restorable view state
//! for tabular models.
//!
//! gridstate sits between a tabular data source and whatever draws it. It
//! adds two independent capabilities without touching the source:
//!
//! - **Row sorting**: a single active sort column with a remembered
//!   direction per column, driven by per-column comparators or the natural
//!   ordering of [`CellValue`](model::CellValue)s.
//! - **Column visibility**: hide, show and reorder columns; hidden columns
//!   come back where they were.
//!
//! Both capabilities can be captured in a [`ViewState`] and re-applied later,
//! including to a different source with the same columns.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gridstate::model::{CellValue, TableModel};
//! use gridstate::{ViewCoordinator, ViewState};
//!
//! let table = Arc::new(TableModel::new(["Color", "Number"]).with_rows(vec![
//!     vec!["red".into(), CellValue::from(200)],
//!     vec!["blue".into(), CellValue::from(100)],
//! ]));
//! let view = ViewCoordinator::new(table);
//! view.toggle_sort(1);
//! view.hide_column(&"Color".into());
//!
//! // Persist and restore
//! let json = view.get_state().to_json()?;
//! let state = ViewState::from_json(&json)?;
//! assert!(view.set_state(&state)?);
//! # Ok::<(), gridstate::GridError>(())
//! ```
//!
//! # Modules
//!
//! - [`model`]: Data sources, values, comparators and the sorting decorator
//! - [`columns`]: Column identity and visibility
//! - [`state`]: Serializable view state
//! - [`view`]: The coordinator a table widget talks to
//! - [`layout`]: Preferred-width computation
//! - [`config`]: Settings loadable from TOML

pub mod columns;
pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod state;
pub mod view;

pub use config::ViewConfig;
pub use error::{GridError, Result};
pub use state::{ColumnState, SortState, ViewState};
pub use view::{ColumnMenuEntry, DisplayChange, ViewCoordinator, ViewSignals};

pub use gridstate_core::{ConnectionId, PerfSpan, Signal};
