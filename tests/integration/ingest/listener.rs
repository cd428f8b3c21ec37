//! Tests for live subscription consumption and reconnect gap coverage.

use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use tokio::sync::{mpsc, watch};

use distro_agent::{
	models::EventKind,
	services::{
		blockchain::RpcError,
		ingest::{Backfiller, DedupingSink, LiveListener},
	},
};

use crate::integration::mocks::{raw_log, CollectingSink, MockChainClient, SharedSink};

const CONTRACT: &str = "0xdd21cf61dd3e47cec1bc5190915d726c8b0876c1";

fn contract() -> Address {
	Address::from_str(CONTRACT).unwrap()
}

async fn wait_for<F>(mut condition: F)
where
	F: FnMut() -> bool,
{
	for _ in 0..1000 {
		if condition() {
			return;
		}
		tokio::time::sleep(Duration::from_millis(10)).await;
	}
	panic!("Condition not reached in time");
}

#[tokio::test]
async fn test_live_records_flow_to_sink() {
	let mut client = MockChainClient::new();
	let (tx, rx) = mpsc::channel(16);
	let mut stream = Some(rx);
	client
		.expect_subscribe_logs()
		.times(1)
		.returning(move |_, _| Ok(stream.take().unwrap()));

	let client = Arc::new(client);
	let sink = Arc::new(CollectingSink::new());
	let backfiller = Arc::new(Backfiller::new(client.clone(), contract(), 50));
	let listener = LiveListener::new(
		client,
		contract(),
		EventKind::TokenSwap,
		sink.clone(),
		backfiller,
		Duration::from_secs(1),
	);

	let (shutdown_tx, shutdown_rx) = watch::channel(false);
	let handle = tokio::spawn(async move { listener.run(shutdown_rx).await });

	tx.send(raw_log(EventKind::TokenSwap, 100, 0, "0x01"))
		.await
		.unwrap();
	tx.send(raw_log(EventKind::TokenSwap, 101, 0, "0x02"))
		.await
		.unwrap();

	wait_for(|| sink.delivered.try_lock().map(|d| d.len() == 2).unwrap_or(false)).await;

	shutdown_tx.send(true).unwrap();
	handle.await.unwrap();

	let delivered = sink.delivered.lock().await;
	assert_eq!(delivered[0].block_number, 100);
	assert_eq!(delivered[1].block_number, 101);
}

#[tokio::test]
async fn test_reconnect_covers_gap_from_last_seen_block() {
	let mut client = MockChainClient::new();

	// First subscription delivers one log at block 100, then drops
	let (tx, rx) = mpsc::channel(16);
	let mut streams = vec![rx];
	tokio::spawn(async move {
		tx.send(raw_log(EventKind::TokenSwap, 100, 0, "0x01"))
			.await
			.unwrap();
		// Dropping the sender closes the stream
	});

	// Second subscription stays open until shutdown
	let (keepalive_tx, keepalive_rx) = mpsc::channel(16);
	streams.push(keepalive_rx);
	streams.reverse();

	client
		.expect_subscribe_logs()
		.times(2)
		.returning(move |_, _| Ok(streams.pop().unwrap()));
	client
		.expect_get_latest_block_number()
		.times(1)
		.returning(|| Ok(105));
	// Gap query starts at the last seen block; the boundary overlap is deduped
	client
		.expect_get_logs()
		.withf(|_, _, from, to| *from == 100 && *to == 105)
		.times(1)
		.returning(|_, _, _, _| {
			Ok(vec![
				raw_log(EventKind::TokenSwap, 100, 0, "0x01"),
				raw_log(EventKind::TokenSwap, 103, 0, "0x03"),
			])
		});

	let client = Arc::new(client);
	let inner = Arc::new(CollectingSink::new());
	let sink = Arc::new(DedupingSink::new(SharedSink(inner.clone())));
	let backfiller = Arc::new(Backfiller::new(client.clone(), contract(), 50));
	let listener = LiveListener::new(
		client,
		contract(),
		EventKind::TokenSwap,
		sink,
		backfiller,
		Duration::from_secs(1),
	);

	let (shutdown_tx, shutdown_rx) = watch::channel(false);
	let handle = tokio::spawn(async move { listener.run(shutdown_rx).await });

	// Live record, then the deduped gap record
	wait_for(|| inner.delivered.try_lock().map(|d| d.len() == 2).unwrap_or(false)).await;

	shutdown_tx.send(true).unwrap();
	handle.await.unwrap();
	drop(keepalive_tx);

	let delivered = inner.delivered.lock().await;
	let blocks: Vec<u64> = delivered.iter().map(|r| r.block_number).collect();
	assert_eq!(blocks, vec![100, 103]);
}

#[tokio::test(start_paused = true)]
async fn test_failed_gap_coverage_is_retried_until_covered() {
	let mut client = MockChainClient::new();

	// First subscription delivers one log at block 100, then drops
	let (tx, rx) = mpsc::channel(16);
	let mut streams = vec![rx];
	tokio::spawn(async move {
		tx.send(raw_log(EventKind::TokenSwap, 100, 0, "0x01"))
			.await
			.unwrap();
	});

	// Second subscription carries a live record past the gap
	let (keepalive_tx, keepalive_rx) = mpsc::channel(16);
	keepalive_tx
		.try_send(raw_log(EventKind::TokenSwap, 110, 0, "0x0a"))
		.unwrap();
	streams.push(keepalive_rx);
	streams.reverse();

	client
		.expect_subscribe_logs()
		.times(2)
		.returning(move |_, _| Ok(streams.pop().unwrap()));
	client
		.expect_get_latest_block_number()
		.times(2)
		.returning(|| Ok(105));

	// The first coverage run exhausts its retries; the gap must stay pending
	// so a later run can still deliver the missed block
	let calls = AtomicU32::new(0);
	client
		.expect_get_logs()
		.withf(|_, _, from, to| *from == 100 && *to == 105)
		.times(4)
		.returning(move |_, _, _, _| {
			if calls.fetch_add(1, Ordering::SeqCst) < 3 {
				Err(RpcError::ConnectionError("node down".into()))
			} else {
				Ok(vec![
					raw_log(EventKind::TokenSwap, 100, 0, "0x01"),
					raw_log(EventKind::TokenSwap, 103, 0, "0x03"),
				])
			}
		});

	let client = Arc::new(client);
	let inner = Arc::new(CollectingSink::new());
	let sink = Arc::new(DedupingSink::new(SharedSink(inner.clone())));
	let backfiller = Arc::new(Backfiller::new(client.clone(), contract(), 50));
	let listener = LiveListener::new(
		client,
		contract(),
		EventKind::TokenSwap,
		sink,
		backfiller,
		Duration::from_secs(1),
	);

	let (shutdown_tx, shutdown_rx) = watch::channel(false);
	let handle = tokio::spawn(async move { listener.run(shutdown_rx).await });

	wait_for(|| inner.delivered.try_lock().map(|d| d.len() == 3).unwrap_or(false)).await;

	shutdown_tx.send(true).unwrap();
	handle.await.unwrap();
	drop(keepalive_tx);

	let delivered = inner.delivered.lock().await;
	let blocks: Vec<u64> = delivered.iter().map(|r| r.block_number).collect();
	// Gap coverage completes before live consumption resumes
	assert_eq!(blocks, vec![100, 103, 110]);
}

#[tracing_test::traced_test]
#[tokio::test]
async fn test_malformed_log_does_not_stop_the_stream() {
	let mut client = MockChainClient::new();
	let (tx, rx) = mpsc::channel(16);
	let mut stream = Some(rx);
	client
		.expect_subscribe_logs()
		.times(1)
		.returning(move |_, _| Ok(stream.take().unwrap()));

	let client = Arc::new(client);
	let sink = Arc::new(CollectingSink::new());
	let backfiller = Arc::new(Backfiller::new(client.clone(), contract(), 50));
	let listener = LiveListener::new(
		client,
		contract(),
		EventKind::RemoveLiquidity,
		sink.clone(),
		backfiller,
		Duration::from_secs(1),
	);

	let (shutdown_tx, shutdown_rx) = watch::channel(false);
	let handle = tokio::spawn(async move { listener.run(shutdown_rx).await });

	// Wrong kind: TokenSwap payload pushed to the RemoveLiquidity stream
	tx.send(raw_log(EventKind::TokenSwap, 50, 0, "0xbad"))
		.await
		.unwrap();
	tx.send(raw_log(EventKind::RemoveLiquidity, 51, 0, "0x05"))
		.await
		.unwrap();

	wait_for(|| sink.delivered.try_lock().map(|d| d.len() == 1).unwrap_or(false)).await;

	shutdown_tx.send(true).unwrap();
	handle.await.unwrap();

	assert_eq!(sink.delivered.lock().await[0].block_number, 51);
	assert!(logs_contain("Dropping malformed event"));
}
