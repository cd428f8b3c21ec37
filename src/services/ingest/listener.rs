//! Live event listening.
//!
//! Maintains one push subscription per event kind. Received logs are
//! normalized and forwarded to the sink. A dropped subscription is reconnected
//! with exponential backoff (bounded interval, unbounded retries); the last
//! block seen before the drop is handed to the backfiller so coverage stays
//! gapless across the reconnect. Overlap at the gap boundary is absorbed by
//! the sink's dedupe.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use crate::{
	models::{BackfillCursor, EventKind, RawLog},
	services::{
		blockchain::ChainClient,
		ingest::{normalize, Backfiller, EventSink, IngestError},
	},
};

const INITIAL_RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

enum StreamEnd {
	Shutdown,
	Dropped(Option<u64>),
}

pub struct LiveListener {
	client: Arc<dyn ChainClient>,
	contract: Address,
	kind: EventKind,
	sink: Arc<dyn EventSink>,
	backfiller: Arc<Backfiller>,
	max_backoff: Duration,
}

impl LiveListener {
	pub fn new(
		client: Arc<dyn ChainClient>,
		contract: Address,
		kind: EventKind,
		sink: Arc<dyn EventSink>,
		backfiller: Arc<Backfiller>,
		max_backoff: Duration,
	) -> Self {
		Self {
			client,
			contract,
			kind,
			sink,
			backfiller,
			max_backoff,
		}
	}

	/// Runs the subscribe/consume/reconnect loop until shutdown
	pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
		let mut backoff = INITIAL_RECONNECT_BACKOFF;
		let mut gap_from: Option<u64> = None;

		loop {
			if *shutdown.borrow() {
				break;
			}

			match self
				.client
				.subscribe_logs(self.contract, self.kind.topic0())
				.await
			{
				Ok(mut stream) => {
					info!(kind = %self.kind, "Live subscription established");
					backoff = INITIAL_RECONNECT_BACKOFF;

					if !self.cover_pending_gap(&mut gap_from, &mut shutdown).await {
						break;
					}

					match self.consume(&mut stream, &mut shutdown).await {
						StreamEnd::Shutdown => break,
						StreamEnd::Dropped(last_seen) => {
							warn!(kind = %self.kind, "Live subscription dropped");
							// Re-scan from the last seen block; the overlap
							// block is deduped at the sink. An uncovered gap
							// merges with the new one at the earliest block.
							gap_from = match (gap_from, last_seen) {
								(Some(pending), Some(seen)) => Some(pending.min(seen)),
								(pending, seen) => pending.or(seen),
							};
						}
					}
				}
				Err(e) => {
					warn!(
						kind = %self.kind,
						"Subscription attempt failed ({}), retrying in {:?}",
						e,
						backoff
					);
					tokio::select! {
						_ = shutdown.changed() => break,
						_ = tokio::time::sleep(backoff) => {}
					}
					backoff = crate::utils::retry::next_backoff(backoff, self.max_backoff);
				}
			}
		}

		info!(kind = %self.kind, "Live listener stopped");
	}

	/// Consumes pushed logs until the stream drops or shutdown is signalled
	async fn consume(
		&self,
		stream: &mut mpsc::Receiver<RawLog>,
		shutdown: &mut watch::Receiver<bool>,
	) -> StreamEnd {
		let mut last_seen: Option<u64> = None;

		loop {
			tokio::select! {
				_ = shutdown.changed() => return StreamEnd::Shutdown,
				maybe_log = stream.recv() => {
					let Some(log) = maybe_log else {
						return StreamEnd::Dropped(last_seen);
					};

					match normalize(self.kind, &log) {
						Ok(record) => {
							last_seen = Some(record.block_number);
							if let Err(e) = self.sink.deliver(record).await {
								error!(kind = %self.kind, "Sink delivery failed: {}", e);
							}
						}
						Err(IngestError::UnknownEventShape(msg)) => {
							// Contract violation; surfaced, never retried
							error!(kind = %self.kind, "Dropping malformed event: {}", msg);
						}
						Err(e) => {
							error!(kind = %self.kind, "Normalization failed: {}", e);
						}
					}
				}
			}
		}
	}

	/// Retries gap coverage until it succeeds or shutdown is signalled.
	///
	/// The pending gap is cleared only once the backfiller has covered it; a
	/// coverage failure leaves it in place so no block range is ever skipped
	/// over. Returns `false` when shutdown interrupted the retries.
	async fn cover_pending_gap(
		&self,
		gap_from: &mut Option<u64>,
		shutdown: &mut watch::Receiver<bool>,
	) -> bool {
		let mut backoff = INITIAL_RECONNECT_BACKOFF;

		while let Some(from) = *gap_from {
			match self.cover_gap(from).await {
				Ok(()) => {
					*gap_from = None;
				}
				Err(IngestError::UnknownEventShape(msg)) => {
					// Contract violation inside the range; retrying cannot
					// repair it
					error!(kind = %self.kind, "Abandoning uncoverable gap: {}", msg);
					*gap_from = None;
				}
				Err(e) => {
					warn!(
						kind = %self.kind,
						from,
						"Gap coverage failed ({}), retrying in {:?}",
						e,
						backoff
					);
					tokio::select! {
						_ = shutdown.changed() => return false,
						_ = tokio::time::sleep(backoff) => {}
					}
					backoff = crate::utils::retry::next_backoff(backoff, self.max_backoff);
				}
			}
		}

		true
	}

	/// Backfills the window between the pre-drop position and the chain head
	async fn cover_gap(&self, from: u64) -> Result<(), IngestError> {
		let latest = self.client.get_latest_block_number().await.map_err(|e| {
			IngestError::network_error(format!(
				"Could not resolve chain head for gap coverage: {}",
				e
			))
		})?;

		if latest < from {
			return Ok(());
		}

		let cursor = BackfillCursor::new(self.kind, from, latest);
		let count = self.backfiller.backfill(&cursor, self.sink.as_ref()).await?;
		info!(
			kind = %self.kind,
			from, to = latest, count, "Reconnect gap covered"
		);
		Ok(())
	}
}
