//! Network transport implementations for RPC communication.
//!
//! - `http`: HTTP JSON-RPC transport for read calls, submissions and log queries
//! - `ws`: WebSocket transport for push log subscriptions

mod http;
mod ws;

pub use http::HttpTransportClient;
pub use ws::WsSubscriber;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::services::blockchain::RpcError;

/// Common interface for JSON-RPC request transports
#[async_trait]
pub trait BlockchainTransport: Send + Sync {
	/// Sends a raw JSON-RPC request and returns the full response object
	async fn send_raw_request<P>(&self, method: &str, params: Option<P>) -> Result<Value, RpcError>
	where
		P: Into<Value> + Send + Clone + Serialize;
}
