//! View state mementos.
//!
//! Plain value types capturing everything needed to put a table view back
//! the way it was: per-column geometry and visibility ([`ColumnState`]) and
//! the sort settings ([`SortState`]), combined in [`ViewState`].
//!
//! Mementos carry no version. Whether one can be re-applied is decided by
//! comparing it with the current columns when it is restored.
//!
//! # JSON Layout
//!
//! ```json
//! {
//!   "columns": [
//!     { "col_id": "Color", "min_width": 15, "max_width": 4294967295,
//!       "pref_width": 75, "index": 0, "hidden": false }
//!   ],
//!   "sort": {
//!     "sort_column": null,
//!     "column_names": ["Color"],
//!     "directions": ["ascending"]
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::columns::ColumnId;
use crate::error::{GridError, Result};
use crate::model::SortOrder;

/// Captured state of one column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnState {
    /// Identity of the column.
    pub col_id: ColumnId,
    /// Minimum width.
    pub min_width: u32,
    /// Maximum width.
    pub max_width: u32,
    /// Preferred width.
    pub pref_width: u32,
    /// Visible position, or the position the column had when hidden.
    pub index: usize,
    /// Whether the column is hidden.
    pub hidden: bool,
}

/// Captured sort settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SortState {
    /// The active sort column, in source coordinates.
    pub sort_column: Option<usize>,
    /// Column names of the source at capture time; the compatibility key.
    pub column_names: Vec<Option<String>>,
    /// Remembered direction per column.
    pub directions: Vec<SortOrder>,
}

/// Combined column and sort state of a view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ViewState {
    /// One entry per known column, visible ones first.
    pub columns: Vec<ColumnState>,
    /// The sort settings.
    pub sort: SortState,
}

impl ViewState {
    /// Encodes the state as JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(GridError::Encode)
    }

    /// Decodes a state previously produced by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(GridError::Decode)
    }
}
