//! Tests for the JSON-RPC chain client over a mocked HTTP endpoint.

use std::str::FromStr;

use alloy::primitives::{Address, B256};
use serde_json::json;

use distro_agent::services::blockchain::{
	ChainClient, EvmChainClient, HttpTransportClient, RpcError,
};

const CONTRACT: &str = "0xdd21cf61dd3e47cec1bc5190915d726c8b0876c1";

fn rpc_result(id: u64, result: serde_json::Value) -> String {
	json!({
		"jsonrpc": "2.0",
		"id": id,
		"result": result,
	})
	.to_string()
}

async fn client_for(server: &mockito::ServerGuard) -> EvmChainClient<HttpTransportClient> {
	let transport = HttpTransportClient::new_unchecked(&server.url()).unwrap();
	EvmChainClient::new(transport, None)
}

#[tokio::test]
async fn test_get_latest_block_number() {
	let mut server = mockito::Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.match_body(mockito::Matcher::PartialJson(json!({
			"method": "eth_blockNumber",
		})))
		.with_body(rpc_result(1, json!("0x10d4f")))
		.create_async()
		.await;

	let client = client_for(&server).await;
	let block = client.get_latest_block_number().await.unwrap();

	assert_eq!(block, 68943);
	mock.assert_async().await;
}

#[tokio::test]
async fn test_get_transaction_count_uses_pending_state() {
	let mut server = mockito::Server::new_async().await;
	let address = Address::from_str(CONTRACT).unwrap();
	let mock = server
		.mock("POST", "/")
		.match_body(mockito::Matcher::PartialJson(json!({
			"method": "eth_getTransactionCount",
			"params": [format!("{:#x}", address), "pending"],
		})))
		.with_body(rpc_result(1, json!("0x2a")))
		.create_async()
		.await;

	let client = client_for(&server).await;
	let nonce = client.get_transaction_count(address).await.unwrap();

	assert_eq!(nonce, 42);
	mock.assert_async().await;
}

#[tokio::test]
async fn test_call_returns_raw_return_data() {
	let mut server = mockito::Server::new_async().await;
	let mock = server
		.mock("POST", "/")
		.match_body(mockito::Matcher::PartialJson(json!({
			"method": "eth_call",
		})))
		.with_body(rpc_result(
			1,
			json!("0x0000000000000000000000000000000000000000000000000000000000000001"),
		))
		.create_async()
		.await;

	let client = client_for(&server).await;
	let data = client
		.call(Address::from_str(CONTRACT).unwrap(), vec![0xde, 0xad])
		.await
		.unwrap();

	assert!(data.ends_with("01"));
	mock.assert_async().await;
}

#[tokio::test]
async fn test_unmined_receipt_is_none() {
	let mut server = mockito::Server::new_async().await;
	server
		.mock("POST", "/")
		.match_body(mockito::Matcher::PartialJson(json!({
			"method": "eth_getTransactionReceipt",
		})))
		.with_body(rpc_result(1, serde_json::Value::Null))
		.create_async()
		.await;

	let client = client_for(&server).await;
	let receipt = client.get_transaction_receipt(B256::ZERO).await.unwrap();

	assert!(receipt.is_none());
}

#[tokio::test]
async fn test_node_reported_error_surfaces_as_request_error() {
	let mut server = mockito::Server::new_async().await;
	server
		.mock("POST", "/")
		.with_body(
			json!({
				"jsonrpc": "2.0",
				"id": 1,
				"error": { "code": -32000, "message": "nonce too low" },
			})
			.to_string(),
		)
		.create_async()
		.await;

	let client = client_for(&server).await;
	let result = client.send_raw_transaction(vec![0x02, 0x01]).await;

	match result {
		Err(RpcError::RequestError(msg)) => assert!(msg.contains("nonce too low")),
		other => panic!("Expected request error, got {:?}", other.map(|h| h.to_string())),
	}
}

#[tokio::test]
async fn test_server_failure_is_transient_connection_error() {
	let mut server = mockito::Server::new_async().await;
	server
		.mock("POST", "/")
		.with_status(503)
		.with_body("Service Unavailable")
		.create_async()
		.await;

	let client = client_for(&server).await;
	let result = client.get_latest_block_number().await;

	match result {
		Err(e) => assert!(e.is_transient()),
		Ok(_) => panic!("Expected connection error"),
	}
}

#[tokio::test]
async fn test_get_logs_parses_raw_entries() {
	let mut server = mockito::Server::new_async().await;
	let topic0 = format!(
		"{:#x}",
		distro_agent::models::EventKind::TokenSwap.topic0()
	);
	server
		.mock("POST", "/")
		.match_body(mockito::Matcher::PartialJson(json!({
			"method": "eth_getLogs",
		})))
		.with_body(rpc_result(
			1,
			json!([{
				"address": CONTRACT,
				"topics": [topic0, "0x00000000000000000000000000000000000000000000000000000000000000aa"],
				"data": "0x0000000000000000000000000000000000000000000000000000000000001388",
				"blockNumber": "0x64",
				"transactionHash": "0xabc",
				"logIndex": "0x0",
			}]),
		))
		.create_async()
		.await;

	let client = client_for(&server).await;
	let logs = client
		.get_logs(
			Address::from_str(CONTRACT).unwrap(),
			distro_agent::models::EventKind::TokenSwap.topic0(),
			100,
			200,
		)
		.await
		.unwrap();

	assert_eq!(logs.len(), 1);
	assert_eq!(logs[0].block_number().unwrap(), 100);
	assert_eq!(logs[0].log_index().unwrap(), 0);
}

#[tokio::test]
async fn test_subscribe_without_ws_endpoint_fails() {
	let server = mockito::Server::new_async().await;
	let client = client_for(&server).await;

	let result = client
		.subscribe_logs(
			Address::from_str(CONTRACT).unwrap(),
			distro_agent::models::EventKind::TokenSwap.topic0(),
		)
		.await;

	assert!(result.is_err());
}
