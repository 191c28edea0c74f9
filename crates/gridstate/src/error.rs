//! Error types for gridstate.
//!
//! Only inputs that cannot be interpreted at all are errors. A view state
//! that is well formed but was captured from a differently shaped source is
//! reported as `Ok(false)` by the restore operations.

use crate::columns::ColumnId;

/// Result type alias for gridstate operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors that can occur in gridstate.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A state object is internally inconsistent.
    #[error("Malformed view state: {0}")]
    MalformedState(String),

    /// A column with this id is already known.
    #[error("Duplicate column id '{0}'")]
    DuplicateColumn(ColumnId),

    /// A persisted view state could not be decoded.
    #[error("Failed to decode view state: {0}")]
    Decode(#[source] serde_json::Error),

    /// A view state could not be encoded.
    #[error("Failed to encode view state: {0}")]
    Encode(#[source] serde_json::Error),

    /// A configuration document could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl GridError {
    /// Create a malformed-state error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedState(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = GridError::malformed("2 directions for 3 columns");
        assert_eq!(err.to_string(), "Malformed view state: 2 directions for 3 columns");

        let err = GridError::DuplicateColumn(ColumnId::from("Name"));
        assert_eq!(err.to_string(), "Duplicate column id 'Name'");
    }

    #[test]
    fn test_source_is_kept() {
        use std::error::Error as _;
        let json_err = serde_json::from_str::<u32>("x").unwrap_err();
        let err = GridError::Decode(json_err);
        assert!(err.source().is_some());
    }
}
