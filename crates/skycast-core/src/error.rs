//! Storage error types.
//!
//! Preference and list persistence is best-effort: callers log these errors
//! and carry on, so the variants only need to say what went wrong on disk.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the preference store and the line stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed store file {path}: {message}")]
    Format { path: PathBuf, message: String },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            StoreError::Io { .. } => "Could not save your settings. Changes may not persist.",
            StoreError::Format { .. } => "Saved settings were unreadable and have been reset.",
        }
    }
}
