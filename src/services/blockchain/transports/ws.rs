//! WebSocket transport implementation for live log subscriptions.
//!
//! This module provides a client that opens an `eth_subscribe` logs
//! subscription over WebSocket and forwards parsed log entries through a
//! channel. Connection loss closes the channel; reconnection policy is owned
//! by the caller, keeping this layer a pure transport.

use alloy::primitives::{Address, B256};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};
use url::Url;

use crate::{models::RawLog, services::blockchain::RpcError};

const SUBSCRIPTION_CHANNEL_CAPACITY: usize = 256;

/// Opens log subscriptions against a single WebSocket endpoint
#[derive(Clone, Debug)]
pub struct WsSubscriber {
	url: String,
}

impl WsSubscriber {
	/// Creates a new subscriber for the given `ws://` or `wss://` endpoint
	pub fn new(ws_url: &str) -> Result<Self, RpcError> {
		let parsed = Url::parse(ws_url)
			.map_err(|e| RpcError::request_error(format!("Invalid WS URL {}: {}", ws_url, e)))?;
		if parsed.scheme() != "ws" && parsed.scheme() != "wss" {
			return Err(RpcError::request_error(format!(
				"Unsupported WS scheme: {}",
				parsed.scheme()
			)));
		}
		Ok(Self {
			url: ws_url.to_string(),
		})
	}

	/// Subscribes to logs for one contract and topic0
	///
	/// Establishes the connection, registers the subscription, and spawns a
	/// reader task that parses pushed log entries into the returned channel.
	/// The channel closes when the connection drops or the subscription ends.
	///
	/// # Arguments
	/// * `contract` - Contract address to filter on
	/// * `topic0` - Event signature hash to filter on
	///
	/// # Returns
	/// * `Result<mpsc::Receiver<RawLog>, RpcError>` - Stream of raw logs or error
	pub async fn subscribe(
		&self,
		contract: Address,
		topic0: B256,
	) -> Result<mpsc::Receiver<RawLog>, RpcError> {
		let (mut stream, _) = connect_async(&self.url)
			.await
			.map_err(|e| RpcError::connection_error(format!("WS connect failed: {}", e)))?;

		let request = json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": "eth_subscribe",
			"params": ["logs", {
				"address": format!("{:#x}", contract),
				"topics": [format!("{:#x}", topic0)],
			}],
		});

		stream
			.send(Message::Text(request.to_string().into()))
			.await
			.map_err(|e| RpcError::connection_error(format!("WS send failed: {}", e)))?;

		// Wait for the subscription registration response
		let subscription_id = loop {
			match stream.next().await {
				Some(Ok(Message::Text(text))) => {
					let response: Value = serde_json::from_str(&text).map_err(|e| {
						RpcError::parse_error(format!("Invalid subscription response: {}", e))
					})?;
					if let Some(error) = response.get("error") {
						return Err(RpcError::request_error(format!(
							"eth_subscribe rejected: {}",
							error
						)));
					}
					if let Some(id) = response.get("result").and_then(|r| r.as_str()) {
						break id.to_string();
					}
				}
				Some(Ok(Message::Ping(data))) => {
					stream
						.send(Message::Pong(data))
						.await
						.map_err(|e| RpcError::connection_error(format!("WS pong failed: {}", e)))?;
				}
				Some(Ok(_)) => continue,
				Some(Err(e)) => {
					return Err(RpcError::connection_error(format!("WS read failed: {}", e)));
				}
				None => {
					return Err(RpcError::connection_error(
						"WS closed before subscription was registered".to_string(),
					));
				}
			}
		};

		debug!(
			subscription_id,
			contract = %contract,
			"Log subscription registered"
		);

		let (tx, rx) = mpsc::channel(SUBSCRIPTION_CHANNEL_CAPACITY);

		tokio::spawn(async move {
			while let Some(message) = stream.next().await {
				match message {
					Ok(Message::Text(text)) => {
						let value: Value = match serde_json::from_str(&text) {
							Ok(value) => value,
							Err(e) => {
								warn!("Discarding unparseable WS message: {}", e);
								continue;
							}
						};

						// Subscription pushes carry the log under params.result
						let Some(result) = value
							.get("params")
							.and_then(|params| params.get("result"))
						else {
							continue;
						};

						match serde_json::from_value::<RawLog>(result.clone()) {
							Ok(log) => {
								if tx.send(log).await.is_err() {
									// Receiver dropped; subscription abandoned
									break;
								}
							}
							Err(e) => {
								warn!("Discarding malformed log push: {}", e);
							}
						}
					}
					Ok(Message::Ping(data)) => {
						if stream.send(Message::Pong(data)).await.is_err() {
							break;
						}
					}
					Ok(Message::Close(_)) => break,
					Ok(_) => continue,
					Err(e) => {
						warn!("WS subscription stream error: {}", e);
						break;
					}
				}
			}
			// Sender drops here, closing the channel and signalling the drop
		});

		Ok(rx)
	}
}
