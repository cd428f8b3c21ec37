//! Agent configuration error types.

use log::error;
use std::{
    error::Error,
    fmt,
    path::{Path, PathBuf},
};

/// Ways loading the agent configuration can fail.
///
/// Read and parse failures carry the offending path so a misconfigured
/// deployment is diagnosable from the log line alone.
#[derive(Debug)]
pub enum ConfigError {
    /// The file parsed but its values cannot run the agent
    ValidationError(String),

    /// The file is not the expected JSON shape
    ParseError { path: PathBuf, message: String },

    /// The file could not be read
    FileError { path: PathBuf, message: String },
}

impl ConfigError {
    fn format_message(&self) -> String {
        match self {
            Self::ValidationError(msg) => {
                format!("Invalid agent configuration: {}", msg)
            }
            Self::ParseError { path, message } => {
                format!(
                    "Could not parse agent configuration {}: {}",
                    path.display(),
                    message
                )
            }
            Self::FileError { path, message } => {
                format!(
                    "Could not read agent configuration {}: {}",
                    path.display(),
                    message
                )
            }
        }
    }

    /// Create a new validation error and log it
    pub fn validation_error(msg: impl Into<String>) -> Self {
        let error = Self::ValidationError(msg.into());
        error!("{}", error.format_message());
        error
    }

    /// Create a new parse error for the given config file and log it
    pub fn parse_error(path: &Path, message: impl Into<String>) -> Self {
        let error = Self::ParseError {
            path: path.to_path_buf(),
            message: message.into(),
        };
        error!("{}", error.format_message());
        error
    }

    /// Create a new file error for the given config file and log it
    pub fn file_error(path: &Path, message: impl Into<String>) -> Self {
        let error = Self::FileError {
            path: path.to_path_buf(),
            message: message.into(),
        };
        error!("{}", error.format_message());
        error
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_message())
    }
}

impl Error for ConfigError {}
