//! Historical event backfill.
//!
//! Retrieves logs for one event kind over an inclusive block range with
//! paginated `eth_getLogs` queries, normalizes them, and forwards a sorted,
//! duplicate-free sequence to the sink. Page size is bounded to respect node
//! limits; re-running over an overlapping range is idempotent past the sink's
//! dedupe boundary.

use std::sync::Arc;

use alloy::primitives::Address;
use tracing::debug;

use crate::{
	models::BackfillCursor,
	services::{
		blockchain::ChainClient,
		ingest::{normalize, EventSink, IngestError},
	},
	utils::WithRetry,
};

pub struct Backfiller {
	client: Arc<dyn ChainClient>,
	contract: Address,
	page_size: u64,
}

impl Backfiller {
	pub fn new(client: Arc<dyn ChainClient>, contract: Address, page_size: u64) -> Self {
		Self {
			client,
			contract,
			page_size,
		}
	}

	/// Runs one backfill over the cursor's range
	///
	/// Within a single run the forwarded records are sorted ascending by
	/// `(block_number, log_index)` and duplicate-free.
	///
	/// # Returns
	/// * `Ok(count)` - Number of records forwarded to the sink
	pub async fn backfill(
		&self,
		cursor: &BackfillCursor,
		sink: &dyn EventSink,
	) -> Result<usize, IngestError> {
		if cursor.is_empty() {
			return Ok(0);
		}

		let topic0 = cursor.kind.topic0();
		let retry = WithRetry::with_default_config();
		let mut records = Vec::new();
		let mut from = cursor.from_block;

		loop {
			let to = cursor.to_block.min(from.saturating_add(self.page_size - 1));
			debug!(
				kind = %cursor.kind,
				from,
				to,
				"Backfill page"
			);

			// Transient node failures retry the page; node-reported errors abort
			let logs = retry
				.attempt(
					|| self.client.get_logs(self.contract, topic0, from, to),
					|e| e.is_transient(),
				)
				.await
				.map_err(|e| {
					IngestError::network_error(format!(
						"getLogs failed for {} over [{}, {}]: {}",
						cursor.kind, from, to, e
					))
				})?;

			for log in &logs {
				records.push(normalize(cursor.kind, log)?);
			}

			if to == cursor.to_block {
				break;
			}
			from = to + 1;
		}

		records.sort_by(|a, b| {
			(a.block_number, a.log_index).cmp(&(b.block_number, b.log_index))
		});
		records.dedup_by_key(|r| r.identity());

		let count = records.len();
		for record in records {
			sink.deliver(record).await?;
		}

		debug!(
			kind = %cursor.kind,
			from_block = cursor.from_block,
			to_block = cursor.to_block,
			count,
			"Backfill run complete"
		);
		Ok(count)
	}
}
