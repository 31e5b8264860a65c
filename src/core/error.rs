//! Error types for the dispatch and rotation runtime
//!
//! Log calls never return these. They surface only from construction,
//! configuration and the rotation contract, where the scheduler absorbs them.

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON configuration could not be parsed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// The file holder has been released and no longer owns a file
    #[error("File holder for '{path}' is closed")]
    HolderClosed { path: String },

    /// Rotation scheduler thread is no longer running
    #[error("Rotation scheduler stopped")]
    SchedulerStopped,
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a closed holder error
    pub fn holder_closed(path: impl Into<String>) -> Self {
        LoggerError::HolderClosed { path: path.into() }
    }
}
