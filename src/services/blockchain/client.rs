//! EVM chain client implementation.
//!
//! This module defines the chain client interface the rest of the agent
//! depends on and its JSON-RPC implementation: read calls, raw transaction
//! submission, ranged log queries and live log subscriptions against a single
//! network endpoint.

use std::str::FromStr;

use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::{
	models::{RawLog, TransactionReceipt},
	services::blockchain::{
		transports::{BlockchainTransport, WsSubscriber},
		RpcError,
	},
};

/// Defines the core interface for chain access
///
/// All operations are stateless per call and may fail with [`RpcError`];
/// retry policies are the caller's responsibility.
#[async_trait]
pub trait ChainClient: Send + Sync {
	/// Executes a read-only contract call (`eth_call`) and returns the raw
	/// hex-encoded return data
	async fn call(&self, contract: Address, calldata: Vec<u8>) -> Result<String, RpcError>;

	/// Submits a signed raw transaction and returns its hash
	async fn send_raw_transaction(&self, raw: Vec<u8>) -> Result<B256, RpcError>;

	/// Returns the pending-state nonce for an address
	async fn get_transaction_count(&self, address: Address) -> Result<u64, RpcError>;

	/// Returns the receipt for a transaction, or `None` while unmined
	async fn get_transaction_receipt(
		&self,
		hash: B256,
	) -> Result<Option<TransactionReceipt>, RpcError>;

	/// Returns the transaction object by hash, or `None` if the node does not
	/// know the hash at all
	async fn get_transaction_by_hash(&self, hash: B256) -> Result<Option<Value>, RpcError>;

	/// Retrieves the latest block number
	async fn get_latest_block_number(&self) -> Result<u64, RpcError>;

	/// Returns the node's current gas price suggestion in wei
	async fn gas_price(&self) -> Result<u128, RpcError>;

	/// Retrieves logs for one contract and topic0 over an inclusive block range
	async fn get_logs(
		&self,
		contract: Address,
		topic0: B256,
		from_block: u64,
		to_block: u64,
	) -> Result<Vec<RawLog>, RpcError>;

	/// Opens a push subscription for logs matching one contract and topic0
	///
	/// The returned channel closes when the underlying connection drops.
	async fn subscribe_logs(
		&self,
		contract: Address,
		topic0: B256,
	) -> Result<mpsc::Receiver<RawLog>, RpcError>;
}

/// JSON-RPC chain client for EVM-compatible networks
#[derive(Clone, Debug)]
pub struct EvmChainClient<T: BlockchainTransport + Clone> {
	/// The underlying HTTP transport for request/response RPC
	transport: T,
	/// WebSocket subscriber for live log streams, when configured
	subscriber: Option<WsSubscriber>,
}

impl<T: BlockchainTransport + Clone> EvmChainClient<T> {
	pub fn new(transport: T, subscriber: Option<WsSubscriber>) -> Self {
		Self {
			transport,
			subscriber,
		}
	}
}

/// Extracts the "result" field from a JSON-RPC response
fn result_field(response: &Value) -> Result<&Value, RpcError> {
	response
		.get("result")
		.ok_or_else(|| RpcError::request_error("Missing 'result' field".to_string()))
}

/// Parses a hex quantity string ("0x...") into a u64
fn parse_quantity(hex: &str) -> Result<u64, RpcError> {
	u64::from_str_radix(hex.trim_start_matches("0x"), 16)
		.map_err(|e| RpcError::parse_error(format!("Failed to parse quantity {}: {}", hex, e)))
}

#[async_trait]
impl<T: BlockchainTransport + Clone> ChainClient for EvmChainClient<T> {
	async fn call(&self, contract: Address, calldata: Vec<u8>) -> Result<String, RpcError> {
		let params = json!([
			{
				"to": format!("{:#x}", contract),
				"data": format!("0x{}", hex::encode(calldata)),
			},
			"latest"
		]);

		let response = self.transport.send_raw_request("eth_call", Some(params)).await?;
		let data = result_field(&response)?
			.as_str()
			.ok_or_else(|| RpcError::parse_error("eth_call result is not a string".to_string()))?;
		Ok(data.to_string())
	}

	async fn send_raw_transaction(&self, raw: Vec<u8>) -> Result<B256, RpcError> {
		let params = json!([format!("0x{}", hex::encode(raw))]);
		let response = self
			.transport
			.send_raw_request("eth_sendRawTransaction", Some(params))
			.await?;
		let hash = result_field(&response)?
			.as_str()
			.ok_or_else(|| RpcError::parse_error("Transaction hash is not a string".to_string()))?;
		B256::from_str(hash)
			.map_err(|e| RpcError::parse_error(format!("Invalid transaction hash {}: {}", hash, e)))
	}

	async fn get_transaction_count(&self, address: Address) -> Result<u64, RpcError> {
		let params = json!([format!("{:#x}", address), "pending"]);
		let response = self
			.transport
			.send_raw_request("eth_getTransactionCount", Some(params))
			.await?;
		let hex_str = result_field(&response)?
			.as_str()
			.ok_or_else(|| RpcError::parse_error("Nonce is not a string".to_string()))?;
		parse_quantity(hex_str)
	}

	async fn get_transaction_receipt(
		&self,
		hash: B256,
	) -> Result<Option<TransactionReceipt>, RpcError> {
		let params = json!([format!("{:#x}", hash)]);
		let response = self
			.transport
			.send_raw_request("eth_getTransactionReceipt", Some(params))
			.await?;
		let receipt_data = result_field(&response)?;

		if receipt_data.is_null() {
			return Ok(None);
		}

		serde_json::from_value(receipt_data.clone())
			.map(Some)
			.map_err(|e| RpcError::parse_error(format!("Failed to parse receipt: {}", e)))
	}

	async fn get_transaction_by_hash(&self, hash: B256) -> Result<Option<Value>, RpcError> {
		let params = json!([format!("{:#x}", hash)]);
		let response = self
			.transport
			.send_raw_request("eth_getTransactionByHash", Some(params))
			.await?;
		let tx_data = result_field(&response)?;

		if tx_data.is_null() {
			return Ok(None);
		}
		Ok(Some(tx_data.clone()))
	}

	async fn get_latest_block_number(&self) -> Result<u64, RpcError> {
		let response = self
			.transport
			.send_raw_request::<Value>("eth_blockNumber", None)
			.await?;
		let hex_str = result_field(&response)?
			.as_str()
			.ok_or_else(|| RpcError::parse_error("Block number is not a string".to_string()))?;
		parse_quantity(hex_str)
	}

	async fn gas_price(&self) -> Result<u128, RpcError> {
		let response = self
			.transport
			.send_raw_request::<Value>("eth_gasPrice", None)
			.await?;
		let hex_str = result_field(&response)?
			.as_str()
			.ok_or_else(|| RpcError::parse_error("Gas price is not a string".to_string()))?;
		u128::from_str_radix(hex_str.trim_start_matches("0x"), 16)
			.map_err(|e| RpcError::parse_error(format!("Failed to parse gas price: {}", e)))
	}

	async fn get_logs(
		&self,
		contract: Address,
		topic0: B256,
		from_block: u64,
		to_block: u64,
	) -> Result<Vec<RawLog>, RpcError> {
		let params = json!([{
			"address": format!("{:#x}", contract),
			"topics": [format!("{:#x}", topic0)],
			"fromBlock": format!("0x{:x}", from_block),
			"toBlock": format!("0x{:x}", to_block),
		}]);

		let response = self
			.transport
			.send_raw_request("eth_getLogs", Some(params))
			.await?;
		let logs_data = result_field(&response)?;

		serde_json::from_value(logs_data.clone())
			.map_err(|e| RpcError::parse_error(format!("Failed to parse logs: {}", e)))
	}

	async fn subscribe_logs(
		&self,
		contract: Address,
		topic0: B256,
	) -> Result<mpsc::Receiver<RawLog>, RpcError> {
		let subscriber = self.subscriber.as_ref().ok_or_else(|| {
			RpcError::request_error("No WebSocket endpoint configured for subscriptions".to_string())
		})?;
		subscriber.subscribe(contract, topic0).await
	}
}
