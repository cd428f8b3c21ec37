//! Signing capability provider interface.
//!
//! The agent never generates or stores key material. Callers hand it a
//! [`SigningCapability`] (or a [`SignerProvider`] that resolves one at fire
//! time); the only concrete implementation wraps a locally supplied private
//! key, parsed from a hex string that is zeroized after use.

use std::str::FromStr;
use std::sync::Arc;

use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, TxKind, U256};
use alloy::signers::local::PrivateKeySigner;
use zeroize::Zeroizing;

use crate::services::submitter::SubmitterError;

/// Parameters of one privileged call, resolved by the submitter at submit time
#[derive(Debug, Clone)]
pub struct TransactionPayload {
	pub chain_id: u64,
	pub nonce: u64,
	pub to: Address,
	pub gas_limit: u64,
	pub max_fee_per_gas: u128,
	pub max_priority_fee_per_gas: u128,
	pub input: Vec<u8>,
}

/// Opaque signing capability: an address plus the ability to produce a signed
/// raw transaction for a payload
pub trait SigningCapability: Send + Sync {
	fn address(&self) -> Address;

	/// Signs the payload and returns the EIP-2718 encoded raw transaction
	fn sign_transaction(&self, payload: &TransactionPayload) -> Result<Vec<u8>, SubmitterError>;
}

/// Signing capability backed by a locally held private key
pub struct LocalSigner {
	inner: PrivateKeySigner,
}

impl LocalSigner {
	/// Parses a hex private key (with or without `0x` prefix)
	///
	/// The intermediate key string is zeroized when parsing completes.
	pub fn from_hex_key(key: &str) -> Result<Self, SubmitterError> {
		let key = Zeroizing::new(key.trim().trim_start_matches("0x").to_string());
		let inner = PrivateKeySigner::from_str(&key)
			.map_err(|e| SubmitterError::signer_error(format!("Invalid private key: {}", e)))?;
		Ok(Self { inner })
	}
}

impl SigningCapability for LocalSigner {
	fn address(&self) -> Address {
		self.inner.address()
	}

	fn sign_transaction(&self, payload: &TransactionPayload) -> Result<Vec<u8>, SubmitterError> {
		let mut tx = TxEip1559 {
			chain_id: payload.chain_id,
			nonce: payload.nonce,
			gas_limit: payload.gas_limit,
			max_fee_per_gas: payload.max_fee_per_gas,
			max_priority_fee_per_gas: payload.max_priority_fee_per_gas,
			to: TxKind::Call(payload.to),
			value: U256::ZERO,
			access_list: Default::default(),
			input: Bytes::from(payload.input.clone()),
		};

		let signature = self
			.inner
			.sign_transaction_sync(&mut tx)
			.map_err(|e| SubmitterError::signer_error(format!("Signing failed: {}", e)))?;

		let envelope = TxEnvelope::from(tx.into_signed(signature));
		Ok(envelope.encoded_2718())
	}
}

/// Resolves a signing capability at fire time
///
/// Keeps key acquisition outside the scheduling core; the daily trigger asks
/// its provider for a signer only when a firing actually happens.
pub trait SignerProvider: Send + Sync {
	fn signer(&self) -> Result<Arc<dyn SigningCapability>, SubmitterError>;
}

/// Provider reading a hex private key from an environment variable
pub struct EnvSignerProvider {
	var_name: String,
}

impl EnvSignerProvider {
	pub fn new(var_name: impl Into<String>) -> Self {
		Self {
			var_name: var_name.into(),
		}
	}
}

impl SignerProvider for EnvSignerProvider {
	fn signer(&self) -> Result<Arc<dyn SigningCapability>, SubmitterError> {
		let key = Zeroizing::new(std::env::var(&self.var_name).map_err(|_| {
			SubmitterError::signer_error(format!(
				"Environment variable {} is not set",
				self.var_name
			))
		})?);
		Ok(Arc::new(LocalSigner::from_hex_key(&key)?))
	}
}
