//! HTTP transport implementation for JSON-RPC interactions.
//!
//! This module provides a client for making JSON-RPC requests to an
//! EVM-compatible node over HTTP, supporting connection probing, request id
//! generation and node-reported error surfacing.

use std::{
	sync::atomic::{AtomicU64, Ordering},
	sync::Arc,
	time::Duration,
};

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;

use crate::services::blockchain::{transports::BlockchainTransport, RpcError};

/// HTTP JSON-RPC transport bound to a single endpoint
///
/// The client is thread-safe and can be shared across multiple tasks. It keeps
/// no per-call state; each request is framed, sent and decoded independently.
#[derive(Clone, Debug)]
pub struct HttpTransportClient {
	/// HTTP client for making requests
	client: Client,
	/// The JSON-RPC endpoint URL
	url: Url,
	/// Counter for generating unique request IDs
	request_id_counter: Arc<AtomicU64>,
}

impl HttpTransportClient {
	/// Creates a new HTTP transport client and probes the endpoint
	///
	/// Sends a `net_version` request to verify the endpoint is responsive
	/// before returning the client.
	///
	/// # Arguments
	/// * `rpc_url` - The JSON-RPC endpoint URL
	///
	/// # Returns
	/// * `Result<Self, RpcError>` - New client instance or connection error
	pub async fn new(rpc_url: &str) -> Result<Self, RpcError> {
		let url = Url::parse(rpc_url)
			.map_err(|e| RpcError::request_error(format!("Invalid RPC URL {}: {}", rpc_url, e)))?;

		let client = ClientBuilder::new()
			.timeout(Duration::from_secs(30))
			.build()
			.map_err(|e| RpcError::connection_error(format!("Failed to create HTTP client: {}", e)))?;

		let transport = Self {
			client,
			url,
			request_id_counter: Arc::new(AtomicU64::new(1)),
		};

		// Test connection with a basic request
		transport
			.send_raw_request::<Value>("net_version", None)
			.await?;

		Ok(transport)
	}

	/// Creates a client without probing the endpoint, for offline construction
	pub fn new_unchecked(rpc_url: &str) -> Result<Self, RpcError> {
		let url = Url::parse(rpc_url)
			.map_err(|e| RpcError::request_error(format!("Invalid RPC URL {}: {}", rpc_url, e)))?;

		let client = ClientBuilder::new()
			.timeout(Duration::from_secs(30))
			.build()
			.map_err(|e| RpcError::connection_error(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			client,
			url,
			request_id_counter: Arc::new(AtomicU64::new(1)),
		})
	}
}

#[async_trait]
impl BlockchainTransport for HttpTransportClient {
	/// Sends a JSON-RPC request to the node
	///
	/// Handles JSON-RPC 2.0 framing, request id generation and HTTP status
	/// checking. Node-reported error objects are surfaced as non-transient
	/// request errors; connectivity failures map to transient errors.
	async fn send_raw_request<P>(&self, method: &str, params: Option<P>) -> Result<Value, RpcError>
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		let request_id = self.request_id_counter.fetch_add(1, Ordering::SeqCst);
		let request_body = json!({
			"jsonrpc": "2.0",
			"id": request_id,
			"method": method,
			"params": params.map(Into::into).unwrap_or_else(|| json!([])),
		});

		let response = self
			.client
			.post(self.url.clone())
			.json(&request_body)
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			if status.is_server_error() {
				return Err(RpcError::connection_error(format!(
					"HTTP status {} from {}",
					status, self.url
				)));
			}
			return Err(RpcError::request_error(format!(
				"HTTP status {} from {}",
				status, self.url
			)));
		}

		let body: Value = response
			.json()
			.await
			.map_err(|e| RpcError::parse_error(format!("Invalid JSON-RPC response: {}", e)))?;

		if let Some(error) = body.get("error") {
			return Err(RpcError::request_error(format!(
				"RPC error for {}: {}",
				method, error
			)));
		}

		Ok(body)
	}
}
