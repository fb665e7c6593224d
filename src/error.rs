//! Error types for the persistence and session layers
//!
//! The timer engine and comparison queries never fail: invalid transitions are
//! ignored, mutators report `bool`, and queries return `Option`. Only code that
//! touches the filesystem surfaces a [`SplitError`].

use thiserror::Error;

/// Result type for goldsplit operations
pub type Result<T> = std::result::Result<T, SplitError>;

/// Errors raised while loading or saving run data
#[derive(Debug, Error)]
pub enum SplitError {
    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON record could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The settings file could not be parsed
    #[error("settings parse error: {0}")]
    SettingsParse(#[from] toml::de::Error),

    /// The settings could not be serialized
    #[error("settings write error: {0}")]
    SettingsWrite(#[from] toml::ser::Error),

    /// No record with the given id exists
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// No data directory could be determined for this platform
    #[error("could not determine a data directory")]
    NoDataDir,

    /// A session operation needs an active attempts record
    #[error("no attempts loaded")]
    NoActiveAttempts,
}

impl SplitError {
    /// Create a not-found error for a record kind
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Whether this error means the record simply does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            SplitError::NotFound { .. } => true,
            SplitError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
