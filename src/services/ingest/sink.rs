//! Event delivery boundary.
//!
//! Records leave the ingestion pipeline through an [`EventSink`]. The
//! [`DedupingSink`] wrapper enforces exactly-once delivery by identity key
//! across live and backfill sources; what sits behind it (storage, alerting)
//! is an external collaborator.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
	models::EventIdentity,
	models::EventRecord,
	services::ingest::{CursorStorage, IngestError},
};

/// Number of recent blocks the dedupe window remembers identities for.
/// Live/backfill overlap spans at most a reconnect gap, far below this.
const DEDUPE_RETENTION_BLOCKS: u64 = 4096;

#[async_trait]
pub trait EventSink: Send + Sync {
	async fn deliver(&self, record: EventRecord) -> Result<(), IngestError>;
}

/// Sink that logs each record, mirroring the agent's observable output
pub struct LoggingSink;

#[async_trait]
impl EventSink for LoggingSink {
	async fn deliver(&self, record: EventRecord) -> Result<(), IngestError> {
		info!(
			kind = %record.kind,
			block = record.block_number,
			log_index = record.log_index,
			tx = %record.transaction_hash,
			args = %serde_json::Value::Object(record.args.clone()),
			"Event ingested"
		);
		Ok(())
	}
}

struct SeenWindow {
	identities: HashSet<EventIdentity>,
	by_block: BTreeMap<u64, Vec<EventIdentity>>,
}

impl SeenWindow {
	fn new() -> Self {
		Self {
			identities: HashSet::new(),
			by_block: BTreeMap::new(),
		}
	}

	/// Returns true when the identity is new to the window
	fn insert(&mut self, block: u64, identity: EventIdentity) -> bool {
		if !self.identities.insert(identity.clone()) {
			return false;
		}
		self.by_block.entry(block).or_default().push(identity);
		self.prune(block);
		true
	}

	fn prune(&mut self, current_block: u64) {
		let cutoff = current_block.saturating_sub(DEDUPE_RETENTION_BLOCKS);
		let stale: Vec<u64> = self
			.by_block
			.range(..cutoff)
			.map(|(block, _)| *block)
			.collect();
		for block in stale {
			if let Some(identities) = self.by_block.remove(&block) {
				for identity in identities {
					self.identities.remove(&identity);
				}
			}
		}
	}
}

/// Wrapper sink that drops records whose identity was already delivered
pub struct DedupingSink<S: EventSink> {
	inner: S,
	seen: Mutex<SeenWindow>,
}

impl<S: EventSink> DedupingSink<S> {
	pub fn new(inner: S) -> Self {
		Self {
			inner,
			seen: Mutex::new(SeenWindow::new()),
		}
	}
}

#[async_trait]
impl<S: EventSink> EventSink for DedupingSink<S> {
	async fn deliver(&self, record: EventRecord) -> Result<(), IngestError> {
		// Lock held across the forward so delivery order matches arrival order
		let mut seen = self.seen.lock().await;
		if !seen.insert(record.block_number, record.identity()) {
			return Ok(());
		}
		self.inner.deliver(record).await
	}
}

/// Wrapper sink that advances the persisted per-kind cursor after delivery.
///
/// A failed cursor write is logged but never fails the delivery; replaying a
/// range past a stale cursor is absorbed by the dedupe window.
pub struct TrackingSink<S: EventSink> {
	inner: S,
	storage: Arc<dyn CursorStorage>,
}

impl<S: EventSink> TrackingSink<S> {
	pub fn new(inner: S, storage: Arc<dyn CursorStorage>) -> Self {
		Self { inner, storage }
	}
}

#[async_trait]
impl<S: EventSink> EventSink for TrackingSink<S> {
	async fn deliver(&self, record: EventRecord) -> Result<(), IngestError> {
		let kind = record.kind;
		let block = record.block_number;
		self.inner.deliver(record).await?;
		if let Err(e) = self.storage.save_last_processed_block(kind, block).await {
			warn!(kind = %kind, block, "Cursor write failed: {}", e);
		}
		Ok(())
	}
}
