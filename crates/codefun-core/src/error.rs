//! Core error types for codefun-core.
//!
//! This module defines the error hierarchy using thiserror. Quiz errors
//! split into one fatal kind (`LoadFailure`) and recoverable kinds that
//! send the user back to level selection.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for codefun-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Quiz flow errors
    #[error("Quiz error: {0}")]
    Quiz(#[from] QuizError),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading questions or starting a session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    /// Question source unreachable or malformed. Fatal: no quiz can start.
    #[error("Failed to load questions from {source_name}: {message}")]
    LoadFailure { source_name: String, message: String },

    /// No level chosen before starting.
    #[error("Select a level before starting the quiz")]
    InvalidConfiguration,

    /// The chosen level has no questions.
    #[error("No questions available for level '{level}'")]
    NoQuestionsAvailable { level: String },

    /// The first sampled question is missing its text or options.
    #[error("Questions for level '{level}' do not have the expected structure")]
    MalformedQuestion { level: String },

    /// Answer index past the question's options.
    #[error("Option {option} does not exist (question has {len} options)")]
    OptionOutOfRange { option: usize, len: usize },

    /// A command arrived in a state that cannot accept it.
    #[error("Cannot {action} while the quiz is {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },
}

impl QuizError {
    /// Whether the user can recover by picking a level again.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, QuizError::LoadFailure { .. })
    }
}

/// Key-value storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the store
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Store is locked by another process
    #[error("Store is locked")]
    Locked,

    /// A stored record could not be decoded
    #[error("Corrupt record under key '{key}': {message}")]
    CorruptRecord { key: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown key for get/set
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
