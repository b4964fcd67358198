//! Error types for the StickIt core library.

use thiserror::Error;

/// Failures raised by a key-value backend or by the note record codec.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend refused a write because it ran out of capacity.
    #[error("Storage quota exceeded")]
    QuotaExceeded,

    /// A SQLite operation failed.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The note record could not be serialised.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The opened file is not a valid StickIt store.
    #[error("Invalid store: {0}")]
    InvalidStore(String),

    /// Any other backend failure, carried as text.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Returns `true` when the failure is the recoverable capacity condition.
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded)
    }
}

/// All errors that can occur within the StickIt core library.
#[derive(Debug, Error)]
pub enum StickItError {
    /// The backend could not be opened or read.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A mutation was applied in memory but could not be written to the backend.
    ///
    /// `note_id` names the note the mutation touched, so a caller can still
    /// render a note that now only exists in memory.
    #[error("Failed to persist notes: {source}")]
    Persist {
        note_id: Option<String>,
        #[source]
        source: StorageError,
    },

    /// A color string is not one of the palette entries.
    #[error("Unknown note color: {0}")]
    InvalidColor(String),

    /// A coordinate or size was NaN or infinite.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Data could not be (de)serialised from JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias that pins the error type to [`StickItError`].
pub type Result<T> = std::result::Result<T, StickItError>;

impl StickItError {
    pub(crate) fn persist(note_id: Option<&str>, source: StorageError) -> Self {
        Self::Persist {
            note_id: note_id.map(str::to_string),
            source,
        }
    }

    /// Returns `true` for write failures caused by the backend running out of space.
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        match self {
            Self::Storage(e) | Self::Persist { source: e, .. } => e.is_quota_exceeded(),
            _ => false,
        }
    }

    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        if self.is_quota_exceeded() {
            return "Storage quota exceeded. Please delete some notes to continue.".to_string();
        }
        match self {
            Self::Storage(e) => format!("Could not open notes: {e}"),
            Self::Persist { source, .. } => format!("Failed to save: {source}"),
            Self::InvalidColor(c) => format!("{c} is not an available note color"),
            Self::InvalidGeometry(_) => "Positions and sizes must be finite numbers".to_string(),
            Self::Io(e) => format!("File error: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_message_is_user_facing() {
        let e = StickItError::persist(Some("note-1"), StorageError::QuotaExceeded);
        assert!(e.is_quota_exceeded());
        assert!(e.user_message().contains("delete some notes"));
    }

    #[test]
    fn test_persist_keeps_note_id() {
        let e = StickItError::persist(Some("abc"), StorageError::Backend("disk".to_string()));
        match e {
            StickItError::Persist { note_id, .. } => assert_eq!(note_id.as_deref(), Some("abc")),
            _ => panic!("Wrong variant"),
        }
    }

    #[test]
    fn test_non_quota_errors() {
        let e = StickItError::InvalidColor("#000000".to_string());
        assert!(!e.is_quota_exceeded());
        assert!(e.user_message().contains("#000000"));
    }
}
