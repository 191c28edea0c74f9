//! View configuration.
//!
//! [`ViewConfig`] collects the knobs of a [`ViewCoordinator`] that an
//! application usually keeps in its settings file. Every field has a
//! default, so a partial document is fine:
//!
//! ```
//! use gridstate::ViewConfig;
//!
//! let config = ViewConfig::from_toml_str(r#"
//! state_preserving = false
//!
//! [column_defaults]
//! pref_width = 120
//! "#)?;
//!
//! assert!(!config.state_preserving);
//! assert_eq!(config.column_defaults.pref_width, 120);
//! assert_eq!(config.column_defaults.min_width, 15);
//! # Ok::<(), gridstate::GridError>(())
//! ```
//!
//! [`ViewCoordinator`]: crate::view::ViewCoordinator

use serde::{Deserialize, Serialize};

use crate::columns::ColumnDefaults;
use crate::error::Result;

/// Settings for a view coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Keep column and sort state when the source is replaced or changes
    /// its structure.
    pub state_preserving: bool,
    /// Width bounds given to newly created columns.
    pub column_defaults: ColumnDefaults,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            state_preserving: true,
            column_defaults: ColumnDefaults::default(),
        }
    }
}

impl ViewConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Builder method to set state preservation.
    pub fn with_state_preserving(mut self, preserving: bool) -> Self {
        self.state_preserving = preserving;
        self
    }

    /// Builder method to set the column defaults.
    pub fn with_column_defaults(mut self, defaults: ColumnDefaults) -> Self {
        self.column_defaults = defaults;
        self
    }
}
