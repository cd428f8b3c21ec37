//! Bootstrap module for initializing services and creating handlers.
//!
//! This module wires the agent together at startup: it builds the chain
//! client from the configured endpoints, assembles the event sink stack and
//! backfiller, and produces the handlers the runtime loops consume.
//!
//! # Services
//! - `ChainClient`: JSON-RPC access to the configured network
//! - `TransactionSubmitter`: Drives the daily distribution call
//! - `Backfiller` and per-kind `LiveListener`s: Event coverage
//!
//! # Handlers
//! - `create_fire_handler`: Creates the scheduler's firing closure, resolving
//!   a signer at fire time and submitting the distribution transaction

use futures::future::BoxFuture;
use std::{error::Error, sync::Arc, time::Duration};
use tokio::sync::watch;
use tracing::{error, info};

use crate::{
	models::{AgentConfig, BackfillCursor, EventKind},
	services::{
		blockchain::{ChainClient, EvmChainClient, HttpTransportClient, WsSubscriber},
		ingest::{
			Backfiller, CursorStorage, DedupingSink, EventSink, FileCursorStorage, LiveListener,
			LoggingSink, TrackingSink,
		},
		submitter::{SignerProvider, TransactionSubmitter},
	},
};

/// Type alias for handling ServiceResult
pub type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Fully wired agent services, shared by the runtime loops
pub struct AgentServices {
	pub client: Arc<dyn ChainClient>,
	pub storage: Arc<dyn CursorStorage>,
	pub submitter: Arc<TransactionSubmitter>,
	pub sink: Arc<dyn EventSink>,
	pub backfiller: Arc<Backfiller>,
}

/// Initializes all required services for the distribution agent.
///
/// Builds the HTTP transport (probing the endpoint), the WebSocket
/// subscriber, persisted cursor storage, the submitter, and the deduping
/// cursor-tracking sink stack shared by live and backfill ingestion.
///
/// # Errors
/// Returns an error if the configuration is invalid or the RPC endpoint is
/// unreachable
pub async fn initialize_services(config: &AgentConfig) -> Result<AgentServices> {
	let contract = config.contract_address()?;

	let transport = HttpTransportClient::new(&config.rpc_url).await?;
	let subscriber = WsSubscriber::new(&config.ws_url)?;
	let client: Arc<dyn ChainClient> = Arc::new(EvmChainClient::new(transport, Some(subscriber)));

	let storage: Arc<dyn CursorStorage> = Arc::new(FileCursorStorage::new(&config.storage_path));

	let submitter = Arc::new(TransactionSubmitter::new(
		client.clone(),
		contract,
		config.chain_id,
		config.confirmation_timeout(),
	));

	let sink: Arc<dyn EventSink> = Arc::new(DedupingSink::new(TrackingSink::new(
		LoggingSink,
		storage.clone(),
	)));

	let backfiller = Arc::new(Backfiller::new(
		client.clone(),
		contract,
		config.backfill_page_size,
	));

	Ok(AgentServices {
		client,
		storage,
		submitter,
		sink,
		backfiller,
	})
}

/// Creates the closure the scheduler runs at each firing.
///
/// The signer is resolved from the provider at fire time, used for the one
/// submission, and dropped when the firing completes.
pub fn create_fire_handler(
	submitter: Arc<TransactionSubmitter>,
	signer_provider: Arc<dyn SignerProvider>,
) -> impl Fn() -> BoxFuture<'static, std::result::Result<(), anyhow::Error>> + Send {
	move || -> BoxFuture<'static, std::result::Result<(), anyhow::Error>> {
		let submitter = submitter.clone();
		let signer_provider = signer_provider.clone();
		Box::pin(async move {
			let signer = signer_provider.signer()?;
			let hash = submitter.submit_distro(signer.as_ref()).await?;
			info!(hash = %hash, "Scheduled distribution completed");
			Ok(())
		})
	}
}

/// Catches event coverage up from the persisted cursors to the chain head.
///
/// Kinds with no persisted cursor start from the live stream only; a
/// coverage failure for one kind is logged and does not block the others.
pub async fn run_startup_backfill(services: &AgentServices) -> Result<()> {
	let latest = services.client.get_latest_block_number().await?;

	for kind in EventKind::all() {
		let last = match services.storage.get_last_processed_block(kind).await {
			Ok(last) => last,
			Err(e) => {
				error!(kind = %kind, "Could not read cursor, skipping catch-up: {}", e);
				continue;
			}
		};

		let Some(last) = last else {
			info!(kind = %kind, "No cursor yet, starting from live stream");
			continue;
		};

		if last >= latest {
			continue;
		}

		let cursor = BackfillCursor::new(kind, last + 1, latest);
		match services.backfiller.backfill(&cursor, services.sink.as_ref()).await {
			Ok(count) => {
				info!(kind = %kind, from = last + 1, to = latest, count, "Startup catch-up complete");
			}
			Err(e) => {
				error!(kind = %kind, "Startup catch-up failed: {}", e);
			}
		}
	}

	Ok(())
}

/// Spawns one live listener task per event kind
pub fn spawn_listeners(
	services: &AgentServices,
	contract: alloy::primitives::Address,
	max_backoff: Duration,
	shutdown: watch::Receiver<bool>,
) -> Vec<tokio::task::JoinHandle<()>> {
	EventKind::all()
		.into_iter()
		.map(|kind| {
			let listener = LiveListener::new(
				services.client.clone(),
				contract,
				kind,
				services.sink.clone(),
				services.backfiller.clone(),
				max_backoff,
			);
			let shutdown = shutdown.clone();
			tokio::spawn(async move { listener.run(shutdown).await })
		})
		.collect()
}
