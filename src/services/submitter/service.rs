//! Transaction submission service.
//!
//! Drives one privileged `distro()` call through its full lifecycle: nonce
//! resolution, signing, submission, and confirmation with a mandatory timeout.
//! Outcomes are classified so each failure reason follows its own retry
//! policy, and a timed-out submission is reconciled by hash before the
//! submitter will ever consider sending a replacement.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{keccak256, Address, B256};
use tracing::{info, warn};

use crate::{
	models::{TransactionRequest, TransactionStatus},
	services::{
		blockchain::{ChainClient, RpcError},
		submitter::{SigningCapability, SubmitterError, TransactionPayload},
	},
	utils::retry::next_backoff,
};

/// Gas ceiling for the distribution call; generous for a no-argument method
const DEFAULT_GAS_LIMIT: u64 = 200_000;
const MAX_NETWORK_ATTEMPTS: u32 = 3;
const NETWORK_RETRY_INITIAL_DELAY: Duration = Duration::from_secs(1);
const NETWORK_RETRY_MAX_DELAY: Duration = Duration::from_secs(8);
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Calldata for the fixed target method `distro()`
fn distro_calldata() -> Vec<u8> {
	keccak256("distro()".as_bytes())[..4].to_vec()
}

/// Submits and confirms the daily distribution transaction
pub struct TransactionSubmitter {
	client: Arc<dyn ChainClient>,
	contract: Address,
	chain_id: u64,
	confirmation_timeout: Duration,
}

impl TransactionSubmitter {
	pub fn new(
		client: Arc<dyn ChainClient>,
		contract: Address,
		chain_id: u64,
		confirmation_timeout: Duration,
	) -> Self {
		Self {
			client,
			contract,
			chain_id,
			confirmation_timeout,
		}
	}

	/// Submits the `distro()` call and waits for confirmation
	///
	/// Exactly one transaction request exists per call; it is resubmitted only
	/// under the per-reason policies (bounded backoff for network failures,
	/// one fresh-nonce attempt for a nonce conflict, and after a timeout only
	/// when the previous submission is confirmed absent from the chain).
	///
	/// # Returns
	/// * `Ok(hash)` - The transaction was included and its receipt reports success
	/// * `Err(SubmitterError)` - Terminal failure for this firing
	pub async fn submit_distro(
		&self,
		signer: &dyn SigningCapability,
	) -> Result<B256, SubmitterError> {
		let mut request = TransactionRequest::new();
		let mut network_attempts: u32 = 0;
		let mut nonce_retried = false;
		let mut backoff = NETWORK_RETRY_INITIAL_DELAY;

		loop {
			match self.attempt_submission(signer, &mut request).await {
				Ok(hash) => {
					request.status = TransactionStatus::Confirmed;
					debug_assert!(request.is_terminal());
					info!(hash = %hash, nonce = ?request.nonce, "Distribution transaction confirmed");
					return Ok(hash);
				}
				Err(SubmitterError::NetworkUnavailable(msg)) => {
					network_attempts += 1;
					if network_attempts >= MAX_NETWORK_ATTEMPTS {
						let error = SubmitterError::network_unavailable(format!(
							"Giving up after {} attempts: {}",
							network_attempts, msg
						));
						self.finish(&mut request, &error);
						return Err(error);
					}
					warn!(
						attempt = network_attempts,
						"Network unavailable, retrying submission: {}", msg
					);
					// The prior submission, if any, was confirmed absent from
					// the chain by the reconciliation read
					request.rearm();
					tokio::time::sleep(backoff).await;
					backoff = next_backoff(backoff, NETWORK_RETRY_MAX_DELAY);
				}
				Err(SubmitterError::NonceConflict(msg)) if !nonce_retried => {
					nonce_retried = true;
					warn!(
						stale_nonce = ?request.nonce,
						"Nonce conflict, refetching nonce and resubmitting once: {}", msg
					);
				}
				Err(error) => {
					self.finish(&mut request, &error);
					return Err(error);
				}
			}
		}
	}

	fn finish(&self, request: &mut TransactionRequest, error: &SubmitterError) {
		if let Some(reason) = error.reason() {
			request.status = TransactionStatus::Failed(reason);
		}
		warn!(
			status = ?request.status,
			hash = ?request.hash,
			"Firing ended without confirmation"
		);
	}

	/// One submission attempt: resolve nonce, sign, submit, await confirmation
	async fn attempt_submission(
		&self,
		signer: &dyn SigningCapability,
		request: &mut TransactionRequest,
	) -> Result<B256, SubmitterError> {
		// At most one submission may be in flight per request
		debug_assert!(request.can_submit());

		let address = signer.address();

		let nonce = self
			.client
			.get_transaction_count(address)
			.await
			.map_err(|e| SubmitterError::network_unavailable(format!("Nonce fetch failed: {}", e)))?;
		request.nonce = Some(nonce);

		let gas_price = self
			.client
			.gas_price()
			.await
			.map_err(|e| SubmitterError::network_unavailable(format!("Gas price fetch failed: {}", e)))?;

		let payload = TransactionPayload {
			chain_id: self.chain_id,
			nonce,
			to: self.contract,
			gas_limit: DEFAULT_GAS_LIMIT,
			max_fee_per_gas: gas_price.saturating_mul(2),
			max_priority_fee_per_gas: gas_price.min(1_500_000_000),
			input: distro_calldata(),
		};

		let raw = signer.sign_transaction(&payload)?;

		let hash = match self.client.send_raw_transaction(raw).await {
			Ok(hash) => hash,
			Err(e) => return Err(classify_submit_error(e)),
		};

		request.mark_submitted(hash);
		info!(hash = %hash, nonce, "Distribution transaction submitted");

		self.await_confirmation(hash).await
	}

	/// Polls for the receipt until it appears or the timeout elapses
	///
	/// RPC errors during polling do not abort the wait; the submission may
	/// still land, so only the timeout path decides the outcome.
	async fn await_confirmation(&self, hash: B256) -> Result<B256, SubmitterError> {
		let poll = async {
			loop {
				tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
				match self.client.get_transaction_receipt(hash).await {
					Ok(Some(receipt)) => {
						if receipt.succeeded() {
							return Ok(hash);
						}
						return Err(SubmitterError::execution_reverted(format!(
							"Transaction {} reverted in block {}",
							hash, receipt.block_number
						)));
					}
					Ok(None) => continue,
					Err(e) => {
						warn!("Receipt poll failed, continuing: {}", e);
						continue;
					}
				}
			}
		};

		match tokio::time::timeout(self.confirmation_timeout, poll).await {
			Ok(result) => result,
			Err(_) => self.reconcile_after_timeout(hash).await,
		}
	}

	/// Re-queries a timed-out submission by hash before classifying
	///
	/// The transaction may still land after the deadline; concluding `Failed`
	/// without this read risks a duplicate submission.
	async fn reconcile_after_timeout(&self, hash: B256) -> Result<B256, SubmitterError> {
		if let Ok(Some(receipt)) = self.client.get_transaction_receipt(hash).await {
			if receipt.succeeded() {
				info!(hash = %hash, "Transaction found confirmed during timeout reconciliation");
				return Ok(hash);
			}
			return Err(SubmitterError::execution_reverted(format!(
				"Transaction {} reverted in block {}",
				hash, receipt.block_number
			)));
		}

		match self.client.get_transaction_by_hash(hash).await {
			Ok(Some(_)) => Err(SubmitterError::timeout(format!(
				"Transaction {} still pending after timeout; not resubmitting",
				hash
			))),
			Ok(None) => Err(SubmitterError::network_unavailable(format!(
				"Transaction {} absent from chain after timeout",
				hash
			))),
			Err(e) => Err(SubmitterError::timeout(format!(
				"Transaction {} unconfirmed and reconciliation read failed: {}",
				hash, e
			))),
		}
	}
}

/// Maps a submission RPC failure onto the firing failure taxonomy
fn classify_submit_error(error: RpcError) -> SubmitterError {
	let message = error.to_string();
	let lowered = message.to_lowercase();

	if error.is_transient() {
		return SubmitterError::network_unavailable(message);
	}
	if lowered.contains("nonce") || lowered.contains("replacement transaction") {
		return SubmitterError::nonce_conflict(message);
	}
	if lowered.contains("insufficient funds") {
		return SubmitterError::insufficient_funds(message);
	}
	if lowered.contains("revert") {
		return SubmitterError::execution_reverted(message);
	}
	SubmitterError::network_unavailable(message)
}
