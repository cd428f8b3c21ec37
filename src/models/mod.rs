//! Domain models and data structures for the distribution agent.
//!
//! This module contains the core data structures used throughout the application:
//!
//! - `config`: Configuration loading and validation
//! - `core`: Core domain models (events, cursors, transaction lifecycle)

mod config;
mod core;

pub use config::{AgentConfig, ConfigError, ConfigLoader};

pub use core::{
    BackfillCursor, EventIdentity, EventKind, EventRecord, FailureReason, RawLog,
    TransactionReceipt, TransactionRequest, TransactionStatus,
};
