use alloy::primitives::B256;
use serde::{Deserialize, Serialize};

/// Terminal failure classification for a single firing.
///
/// Each reason maps to a distinct retry policy in the submitter: transient
/// network failures are retried with backoff, a nonce conflict earns exactly
/// one resubmission with a fresh nonce, and the rest end the firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    NetworkUnavailable,
    NonceConflict,
    InsufficientFunds,
    ExecutionReverted,
    Timeout,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkUnavailable => write!(f, "network unavailable"),
            Self::NonceConflict => write!(f, "nonce conflict"),
            Self::InsufficientFunds => write!(f, "insufficient funds"),
            Self::ExecutionReverted => write!(f, "execution reverted"),
            Self::Timeout => write!(f, "confirmation timeout"),
        }
    }
}

/// Lifecycle state of a transaction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Submitted,
    Confirmed,
    Failed(FailureReason),
}

/// One privileged transaction, created per firing and dropped after its
/// terminal status has been reported.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    /// Resolved lazily at submit time.
    pub nonce: Option<u64>,
    pub hash: Option<B256>,
    pub status: TransactionStatus,
}

impl TransactionRequest {
    pub fn new() -> Self {
        Self {
            nonce: None,
            hash: None,
            status: TransactionStatus::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            TransactionStatus::Confirmed | TransactionStatus::Failed(_)
        )
    }

    /// True while no submission is outstanding for this request
    pub fn can_submit(&self) -> bool {
        matches!(self.status, TransactionStatus::Pending)
    }

    /// Marks the submission that is now in flight
    pub fn mark_submitted(&mut self, hash: B256) {
        self.hash = Some(hash);
        self.status = TransactionStatus::Submitted;
    }

    /// Clears the outstanding submission so another attempt may be made.
    ///
    /// Only valid once the prior submission is confirmed absent from the
    /// chain.
    pub fn rearm(&mut self) {
        self.hash = None;
        self.status = TransactionStatus::Pending;
    }
}

impl Default for TransactionRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal receipt shape returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub block_number: String,
    /// "0x1" for success, "0x0" for a reverted execution.
    pub status: String,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status == "0x1"
    }
}
