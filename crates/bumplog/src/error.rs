//! Error types for bumplog.
//!
//! Most of the event log is deliberately forgiving: unknown ids are ignored and
//! snapshot failures are logged and skipped. The errors here are what the
//! storage, configuration, and id-resolution layers report to callers that ask
//! for them.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for bumplog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// The database table layout is unreadable or from a newer release.
    #[error("unsupported database layout: {message}")]
    DatabaseLayout {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Event Lookup Errors ===
    /// No event matches the given id or id prefix.
    #[error("no event matches '{0}'")]
    UnknownEvent(String),

    /// More than one event matches the given id prefix.
    #[error("'{prefix}' matches {count} events; use a longer prefix")]
    AmbiguousEvent {
        /// The prefix that was given.
        prefix: String,
        /// How many events matched.
        count: usize,
    },

    /// The given text is not a usable event id.
    #[error("invalid event id: {0}")]
    InvalidEventId(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for bumplog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an unknown-event error.
    #[must_use]
    pub fn unknown_event(id: impl Into<String>) -> Self {
        Self::UnknownEvent(id.into())
    }

    /// Create an invalid-id error.
    #[must_use]
    pub fn invalid_event_id(id: impl Into<String>) -> Self {
        Self::InvalidEventId(id.into())
    }
}
