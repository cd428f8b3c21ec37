use log::error;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum IngestError {
    /// A log did not match the expected schema for its event signature.
    /// This is a programming-contract violation, never retried.
    UnknownEventShape(String),
    NetworkError(String),
    StorageError(String),
    SinkError(String),
}

impl IngestError {
    fn format_message(&self) -> String {
        match self {
            Self::UnknownEventShape(msg) => format!("Unknown event shape: {}", msg),
            Self::NetworkError(msg) => format!("Network error: {}", msg),
            Self::StorageError(msg) => format!("Storage error: {}", msg),
            Self::SinkError(msg) => format!("Sink error: {}", msg),
        }
    }

    pub fn unknown_event_shape(msg: impl Into<String>) -> Self {
        let error = Self::UnknownEventShape(msg.into());
        error!("{}", error.format_message());
        error
    }

    pub fn network_error(msg: impl Into<String>) -> Self {
        let error = Self::NetworkError(msg.into());
        error!("{}", error.format_message());
        error
    }

    pub fn storage_error(msg: impl Into<String>) -> Self {
        let error = Self::StorageError(msg.into());
        error!("{}", error.format_message());
        error
    }

    pub fn sink_error(msg: impl Into<String>) -> Self {
        let error = Self::SinkError(msg.into());
        error!("{}", error.format_message());
        error
    }
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_message())
    }
}

impl Error for IngestError {}
