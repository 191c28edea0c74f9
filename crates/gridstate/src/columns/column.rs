//! A single display column.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a column.
///
/// Ids survive source replacement: a column keeps its id as long as the
/// source column it shows keeps its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    /// Creates an id from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id of the column showing source column `model_index` named
    /// `name`: the name itself, or `#<index>` for an unnamed column.
    pub fn for_model_column(name: Option<&str>, model_index: usize) -> Self {
        match name {
            Some(name) => Self::new(name),
            None => Self(format!("#{model_index}")),
        }
    }

    /// A fallback id for a column whose name is already taken.
    ///
    /// `attempt` 0 gives `<name>#<index>`; later attempts append `#<attempt>`
    /// so a caller can keep asking until it finds an unused id.
    pub fn disambiguated(name: Option<&str>, model_index: usize, attempt: usize) -> Self {
        let base = format!("{}#{model_index}", name.unwrap_or_default());
        match attempt {
            0 => Self(base),
            n => Self(format!("{base}#{n}")),
        }
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColumnId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ColumnId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Width bounds given to newly created columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnDefaults {
    /// Minimum width.
    pub min_width: u32,
    /// Maximum width.
    pub max_width: u32,
    /// Preferred width.
    pub pref_width: u32,
}

impl Default for ColumnDefaults {
    fn default() -> Self {
        Self {
            min_width: 15,
            max_width: u32::MAX,
            pref_width: 75,
        }
    }
}

/// A column of a table view.
///
/// Width bounds always satisfy `min_width <= pref_width <= max_width`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    id: ColumnId,
    model_index: usize,
    header: String,
    min_width: u32,
    max_width: u32,
    pref_width: u32,
}

impl Column {
    /// Creates a column for source column `model_index`.
    pub fn new(id: ColumnId, model_index: usize, header: impl Into<String>, defaults: ColumnDefaults) -> Self {
        let mut column = Self {
            id,
            model_index,
            header: header.into(),
            min_width: 0,
            max_width: u32::MAX,
            pref_width: 0,
        };
        column.set_width_bounds(defaults.min_width, defaults.max_width, defaults.pref_width);
        column
    }

    /// The column's identity.
    pub fn id(&self) -> &ColumnId {
        &self.id
    }

    /// The source column this column displays.
    pub fn model_index(&self) -> usize {
        self.model_index
    }

    /// Header text.
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn min_width(&self) -> u32 {
        self.min_width
    }

    pub fn max_width(&self) -> u32 {
        self.max_width
    }

    pub fn pref_width(&self) -> u32 {
        self.pref_width
    }

    /// Sets the minimum width, raising the maximum and preferred widths
    /// when they fall below it.
    pub fn set_min_width(&mut self, min_width: u32) {
        self.min_width = min_width;
        self.max_width = self.max_width.max(min_width);
        self.pref_width = self.pref_width.max(min_width);
    }

    /// Sets the maximum width, never below the minimum. The preferred width
    /// is lowered when it exceeds it.
    pub fn set_max_width(&mut self, max_width: u32) {
        self.max_width = max_width.max(self.min_width);
        self.pref_width = self.pref_width.min(self.max_width);
    }

    /// Sets the preferred width, clamped into the width bounds.
    pub fn set_pref_width(&mut self, pref_width: u32) {
        self.pref_width = pref_width.max(self.min_width).min(self.max_width);
    }

    /// Applies all three widths in order: min, max, preferred.
    pub fn set_width_bounds(&mut self, min_width: u32, max_width: u32, pref_width: u32) {
        self.set_min_width(min_width);
        self.set_max_width(max_width);
        self.set_pref_width(pref_width);
    }
}
