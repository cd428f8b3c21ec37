use log::error;
use std::error::Error;
use std::fmt;

use crate::models::FailureReason;

/// Failure modes of a single firing.
///
/// `NetworkUnavailable` is retried with bounded backoff inside the firing,
/// `NonceConflict` earns exactly one resubmission with a fresh nonce, the
/// rest are terminal for the firing and reported upward.
#[derive(Debug)]
pub enum SubmitterError {
    NetworkUnavailable(String),
    NonceConflict(String),
    InsufficientFunds(String),
    ExecutionReverted(String),
    Timeout(String),
    SignerError(String),
}

impl SubmitterError {
    fn format_message(&self) -> String {
        match self {
            Self::NetworkUnavailable(msg) => format!("Network unavailable: {}", msg),
            Self::NonceConflict(msg) => format!("Nonce conflict: {}", msg),
            Self::InsufficientFunds(msg) => format!("Insufficient funds: {}", msg),
            Self::ExecutionReverted(msg) => format!("Execution reverted: {}", msg),
            Self::Timeout(msg) => format!("Confirmation timeout: {}", msg),
            Self::SignerError(msg) => format!("Signer error: {}", msg),
        }
    }

    /// The lifecycle failure reason this error maps to, if it corresponds to a
    /// submitted request (signer errors happen before any submission exists)
    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            Self::NetworkUnavailable(_) => Some(FailureReason::NetworkUnavailable),
            Self::NonceConflict(_) => Some(FailureReason::NonceConflict),
            Self::InsufficientFunds(_) => Some(FailureReason::InsufficientFunds),
            Self::ExecutionReverted(_) => Some(FailureReason::ExecutionReverted),
            Self::Timeout(_) => Some(FailureReason::Timeout),
            Self::SignerError(_) => None,
        }
    }

    pub fn network_unavailable(msg: impl Into<String>) -> Self {
        let error = Self::NetworkUnavailable(msg.into());
        error!("{}", error.format_message());
        error
    }

    pub fn nonce_conflict(msg: impl Into<String>) -> Self {
        let error = Self::NonceConflict(msg.into());
        error!("{}", error.format_message());
        error
    }

    pub fn insufficient_funds(msg: impl Into<String>) -> Self {
        let error = Self::InsufficientFunds(msg.into());
        error!("{}", error.format_message());
        error
    }

    pub fn execution_reverted(msg: impl Into<String>) -> Self {
        let error = Self::ExecutionReverted(msg.into());
        error!("{}", error.format_message());
        error
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        let error = Self::Timeout(msg.into());
        error!("{}", error.format_message());
        error
    }

    pub fn signer_error(msg: impl Into<String>) -> Self {
        let error = Self::SignerError(msg.into());
        error!("{}", error.format_message());
        error
    }
}

impl fmt::Display for SubmitterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_message())
    }
}

impl Error for SubmitterError {}
