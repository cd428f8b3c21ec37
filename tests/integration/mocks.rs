//! Mock implementations for integration tests.
//!
//! Provides a mock chain client, an in-memory cursor storage and a collecting
//! event sink so the services can be exercised without network access.

use std::collections::HashMap;
use std::error::Error;

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::mock;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};

use distro_agent::{
	models::{EventKind, EventRecord, RawLog, TransactionReceipt},
	services::{
		blockchain::{ChainClient, RpcError},
		ingest::{CursorStorage, EventSink, IngestError},
	},
};

mock! {
	/// Mock implementation of the chain client trait.
	///
	/// Simulates node responses without actual network calls.
	pub ChainClient {}

	#[async_trait]
	impl ChainClient for ChainClient {
		async fn call(&self, contract: Address, calldata: Vec<u8>) -> Result<String, RpcError>;
		async fn send_raw_transaction(&self, raw: Vec<u8>) -> Result<B256, RpcError>;
		async fn get_transaction_count(&self, address: Address) -> Result<u64, RpcError>;
		async fn get_transaction_receipt(
			&self,
			hash: B256,
		) -> Result<Option<TransactionReceipt>, RpcError>;
		async fn get_transaction_by_hash(&self, hash: B256) -> Result<Option<Value>, RpcError>;
		async fn get_latest_block_number(&self) -> Result<u64, RpcError>;
		async fn gas_price(&self) -> Result<u128, RpcError>;
		async fn get_logs(
			&self,
			contract: Address,
			topic0: B256,
			from_block: u64,
			to_block: u64,
		) -> Result<Vec<RawLog>, RpcError>;
		async fn subscribe_logs(
			&self,
			contract: Address,
			topic0: B256,
		) -> Result<mpsc::Receiver<RawLog>, RpcError>;
	}
}

/// Sink that records every delivered record
pub struct CollectingSink {
	pub delivered: Mutex<Vec<EventRecord>>,
}

impl CollectingSink {
	pub fn new() -> Self {
		Self {
			delivered: Mutex::new(Vec::new()),
		}
	}
}

#[async_trait]
impl EventSink for CollectingSink {
	async fn deliver(&self, record: EventRecord) -> Result<(), IngestError> {
		self.delivered.lock().await.push(record);
		Ok(())
	}
}

/// Passthrough so a shared `CollectingSink` can sit behind wrapper sinks
pub struct SharedSink(pub std::sync::Arc<CollectingSink>);

#[async_trait]
impl EventSink for SharedSink {
	async fn deliver(&self, record: EventRecord) -> Result<(), IngestError> {
		self.0.deliver(record).await
	}
}

/// In-memory cursor storage
pub struct MemoryStorage {
	pub last_blocks: Mutex<HashMap<EventKind, u64>>,
	pub fired_date: Mutex<Option<NaiveDate>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self {
			last_blocks: Mutex::new(HashMap::new()),
			fired_date: Mutex::new(None),
		}
	}
}

#[async_trait]
impl CursorStorage for MemoryStorage {
	async fn get_last_processed_block(
		&self,
		kind: EventKind,
	) -> Result<Option<u64>, Box<dyn Error + Send + Sync>> {
		Ok(self.last_blocks.lock().await.get(&kind).copied())
	}

	async fn save_last_processed_block(
		&self,
		kind: EventKind,
		block: u64,
	) -> Result<(), Box<dyn Error + Send + Sync>> {
		self.last_blocks.lock().await.insert(kind, block);
		Ok(())
	}

	async fn get_last_fired_date(
		&self,
	) -> Result<Option<NaiveDate>, Box<dyn Error + Send + Sync>> {
		Ok(*self.fired_date.lock().await)
	}

	async fn save_last_fired_date(
		&self,
		date: NaiveDate,
	) -> Result<(), Box<dyn Error + Send + Sync>> {
		*self.fired_date.lock().await = Some(date);
		Ok(())
	}
}

/// Builds a well-formed raw log of the given kind
pub fn raw_log(kind: EventKind, block: u64, log_index: u64, tx: &str) -> RawLog {
	let mut address_topic = [0u8; 32];
	address_topic[31] = 0xaa;

	let word = hex::encode(U256::from(1000u64).to_be_bytes::<32>());
	let data = format!("0x{}", word.repeat(kind.data_word_count()));

	RawLog {
		address: "0xdd21cf61dd3e47cec1bc5190915d726c8b0876c1".into(),
		topics: vec![
			format!("{:#x}", kind.topic0()),
			format!("0x{}", hex::encode(address_topic)),
		],
		data,
		block_number: format!("0x{:x}", block),
		transaction_hash: tx.to_string(),
		log_index: format!("0x{:x}", log_index),
	}
}
