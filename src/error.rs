//! Error types for the editor persistence layer.

use thiserror::Error;

/// Result type alias for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors that can occur while hydrating, saving, or restoring regions.
#[derive(Error, Debug)]
pub enum EditorError {
    /// Persistent storage could not be opened (private mode, disabled storage).
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A record could not be read back from storage.
    #[error("Failed to read record {key}: {reason}")]
    StorageRead { key: String, reason: String },

    /// A record could not be written (usually quota exhaustion).
    #[error("Failed to write record {key}: {reason}")]
    StorageWrite { key: String, reason: String },

    /// Backup file is not valid JSON.
    #[error("Error parsing file: {0}")]
    ImportParse(#[from] serde_json::Error),

    /// Backup file parsed but its top level is not an object.
    #[error("Error parsing file: expected a JSON object, found {0}")]
    ImportShape(&'static str),

    /// Stored table markup could not be decoded into rows.
    #[error("Malformed markup at byte {offset}: {reason}")]
    Markup { offset: usize, reason: String },

    /// Snapshot could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Region configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Hydration was requested a second time in the same session.
    #[error("Regions were already hydrated for this session")]
    AlreadyHydrated,

    /// The backup download could not be started.
    #[error("Failed to export backup: {0}")]
    Export(String),

    /// Reading the user-selected import file failed.
    #[error("Failed to read file: {0}")]
    FileRead(String),
}

impl EditorError {
    /// Creates a StorageRead error.
    pub fn storage_read(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StorageRead {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Creates a StorageWrite error.
    pub fn storage_write(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StorageWrite {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Creates a Markup error.
    pub fn markup(offset: usize, reason: impl Into<String>) -> Self {
        Self::Markup {
            offset,
            reason: reason.into(),
        }
    }

    /// Creates a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the failure left storage untouched (import can simply be retried).
    pub fn is_import_rejection(&self) -> bool {
        matches!(self, Self::ImportParse(_) | Self::ImportShape(_))
    }
}
