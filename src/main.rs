//! Distribution agent entry point.
//!
//! This binary runs the daily distribution agent: it arms the UTC-midnight
//! trigger for the contract's `distro()` call, keeps live event coverage for
//! the exchange contract's swap and liquidity events, and exposes a small
//! HTTP surface for manual triggering and health checks.
//!
//! # Flow
//! 1. Loads the agent configuration file
//! 2. Initializes the chain client, submitter, sink stack and storage
//! 3. Catches event coverage up from the persisted cursors
//! 4. Starts per-kind live listeners, the daily scheduler and the HTTP server
//! 5. Handles graceful shutdown on Ctrl+C

pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;

use crate::{
	bootstrap::{
		create_fire_handler, initialize_services, run_startup_backfill, spawn_listeners, Result,
	},
	models::{AgentConfig, BackfillCursor, ConfigLoader, EventKind},
	services::{
		scheduler::{DailyScheduler, SystemClock},
		submitter::{EnvSignerProvider, SignerProvider},
		trigger::{create_trigger_server, DistroRunner, DistroTrigger},
	},
	utils::logging::setup_logging,
};

use clap::{Arg, Command};
use dotenvy::dotenv;
use std::env::{set_var, var};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

/// Environment variable holding the hex private key used for scheduled and
/// manually requested firings when no per-request key is supplied
const SIGNER_KEY_VAR: &str = "DISTRO_PRIVATE_KEY";

/// Runs one distribution submission immediately and exits
async fn trigger_once(services: &bootstrap::AgentServices) -> Result<()> {
	let provider = EnvSignerProvider::new(SIGNER_KEY_VAR);
	let signer = provider.signer()?;

	info!("Submitting one-off distribution");
	let runner = DistroRunner::new(services.submitter.clone());
	let hash = runner.trigger(signer).await?;
	info!(hash = %hash, "Distribution confirmed");
	Ok(())
}

/// Backfills all event kinds over an inclusive block range and exits
async fn backfill_range(services: &bootstrap::AgentServices, range: &str) -> Result<()> {
	let (from, to) = range
		.split_once("..")
		.ok_or_else(|| anyhow::anyhow!("Backfill range must be FROM..TO, got {}", range))?;
	let from: u64 = from.trim().parse()?;
	let to: u64 = to.trim().parse()?;
	if from > to {
		return Err(anyhow::anyhow!("Backfill range is empty: {}..{}", from, to).into());
	}

	for kind in EventKind::all() {
		let cursor = BackfillCursor::new(kind, from, to);
		let count = services
			.backfiller
			.backfill(&cursor, services.sink.as_ref())
			.await?;
		info!(kind = %kind, from, to, count, "Backfill finished");
	}
	Ok(())
}

/// Main entry point for the distribution agent.
///
/// # Errors
/// Returns an error if service initialization fails or if there's an error
/// during shutdown.
#[tokio::main]
async fn main() -> Result<()> {
	// Initialize command-line interface
	let matches = Command::new("distro-agent")
		.version(env!("CARGO_PKG_VERSION"))
		.about(
			"An agent that fires a daily on-chain token distribution and keeps a \
			 normalized record of the exchange contract's swap and liquidity events.",
		)
		.arg(
			Arg::new("config")
				.long("config")
				.help("Path to the agent configuration file (default: config/agent.json)")
				.value_name("PATH"),
		)
		.arg(
			Arg::new("log-level")
				.long("log-level")
				.help("Set log level (trace, debug, info, warn, error)")
				.value_name("LEVEL"),
		)
		.arg(
			Arg::new("trigger-now")
				.long("trigger-now")
				.help("Submit one distribution immediately and exit")
				.action(clap::ArgAction::SetTrue),
		)
		.arg(
			Arg::new("backfill")
				.long("backfill")
				.help("Backfill all event kinds over an inclusive block range and exit")
				.value_name("FROM..TO"),
		)
		.get_matches();

	// Load environment variables from .env file
	dotenv().ok();

	// Only apply CLI options if the corresponding environment variables are NOT already set
	if let Some(level) = matches.get_one::<String>("log-level") {
		if var("RUST_LOG").is_err() {
			set_var("RUST_LOG", level);
		}
	}

	setup_logging().unwrap_or_else(|e| {
		error!("Failed to setup logging: {}", e);
	});

	let config_path = matches
		.get_one::<String>("config")
		.map(|s| s.to_string())
		.unwrap_or_else(|| "config/agent.json".to_string());
	let config = AgentConfig::load_from_path(Path::new(&config_path))
		.map_err(|e| anyhow::anyhow!("Failed to load configuration {}: {}", config_path, e))?;
	let contract = config.contract_address()?;

	let services = initialize_services(&config)
		.await
		.map_err(|e| anyhow::anyhow!("Failed to initialize services: {}", e))?;

	if matches.get_flag("trigger-now") {
		return trigger_once(&services).await;
	}

	if let Some(range) = matches.get_one::<String>("backfill") {
		return backfill_range(&services, range).await;
	}

	// Service mode: catch up coverage, then run listeners, scheduler and server
	run_startup_backfill(&services).await?;

	let (shutdown_tx, shutdown_rx) = watch::channel(false);

	let listener_handles = spawn_listeners(
		&services,
		contract,
		config.max_reconnect_backoff(),
		shutdown_rx.clone(),
	);

	let scheduler_handle = if config.daily_trigger_enabled {
		let scheduler = DailyScheduler::new(SystemClock, services.storage.clone());
		let on_fire = create_fire_handler(
			services.submitter.clone(),
			Arc::new(EnvSignerProvider::new(SIGNER_KEY_VAR)),
		);
		let shutdown = shutdown_rx.clone();
		Some(tokio::spawn(async move {
			scheduler.run(on_fire, shutdown).await;
		}))
	} else {
		info!("Daily trigger disabled by configuration");
		None
	};

	let trigger: Arc<dyn DistroTrigger> = Arc::new(DistroRunner::new(services.submitter.clone()));
	let server = create_trigger_server(format!("0.0.0.0:{}", config.server_port), trigger)?;

	info!("Service started. Press Ctrl+C to shutdown");

	let ctrl_c = tokio::signal::ctrl_c();
	tokio::select! {
		result = ctrl_c => {
			if let Err(e) = result {
				error!("Error waiting for Ctrl+C: {}", e);
			}
			info!("Shutdown signal received, stopping services...");
		}
		result = server => {
			if let Err(e) = result {
				error!("Trigger server error: {}", e);
			}
			info!("Trigger server stopped, shutting down services...");
		}
	}

	// Common shutdown logic
	let _ = shutdown_tx.send(true);

	for result in futures::future::join_all(listener_handles).await {
		if let Err(e) = result {
			error!("Listener task error during shutdown: {}", e);
		}
	}
	if let Some(handle) = scheduler_handle {
		if let Err(e) = handle.await {
			error!("Scheduler task error during shutdown: {}", e);
		}
	}

	info!("Shutdown complete");
	Ok(())
}
