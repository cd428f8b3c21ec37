//! Blockchain client interface and implementation.
//!
//! Provides a thin, stateless-per-call abstraction over a single EVM-compatible
//! network endpoint. Includes:
//!
//! - Generic chain client trait (read calls, transaction submission, log queries,
//!   log subscriptions)
//! - HTTP JSON-RPC transport
//! - WebSocket subscription transport
//! - Error handling with transient/non-transient classification
//!
//! No retry logic lives in this layer; callers own their retry policies.

mod client;
mod error;
mod transports;

pub use client::{ChainClient, EvmChainClient};
pub use error::RpcError;
pub use transports::{BlockchainTransport, HttpTransportClient, WsSubscriber};
