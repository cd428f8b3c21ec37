//! Utility modules for common functionality.
//!
//! - logging: Tracing subscriber setup
//! - retry: Exponential backoff helper for transient failures

pub mod logging;
pub mod retry;

pub use retry::{RetryConfig, WithRetry};
