use alloy::primitives::{keccak256, B256};
use serde::{Deserialize, Serialize};

/// The three event categories emitted by the exchange contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    TokenSwap,
    AddLiquidity,
    RemoveLiquidity,
}

impl EventKind {
    /// Canonical Solidity event signature for this kind.
    pub fn signature(&self) -> &'static str {
        match self {
            Self::TokenSwap => "TokenSwap(address,uint256)",
            Self::AddLiquidity => "AddLiquidity(address,uint256)",
            Self::RemoveLiquidity => "RemoveLiquidity(address,uint256,uint256)",
        }
    }

    /// The keccak-256 hash of the canonical signature, used as `topics[0]`.
    pub fn topic0(&self) -> B256 {
        keccak256(self.signature().as_bytes())
    }

    /// Number of non-indexed 32-byte data words expected in the log payload.
    pub fn data_word_count(&self) -> usize {
        match self {
            Self::TokenSwap | Self::AddLiquidity => 1,
            Self::RemoveLiquidity => 2,
        }
    }

    pub fn all() -> [EventKind; 3] {
        [Self::TokenSwap, Self::AddLiquidity, Self::RemoveLiquidity]
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenSwap => write!(f, "TokenSwap"),
            Self::AddLiquidity => write!(f, "AddLiquidity"),
            Self::RemoveLiquidity => write!(f, "RemoveLiquidity"),
        }
    }
}

/// A raw log entry as returned by `eth_getLogs` or an `eth_subscribe` push.
///
/// Quantities are kept as the hex strings the node reports; parsing happens
/// at the normalization boundary so malformed entries surface as schema
/// violations rather than silent drops.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
    pub block_number: String,
    pub transaction_hash: String,
    pub log_index: String,
}

impl RawLog {
    pub fn block_number(&self) -> Result<u64, std::num::ParseIntError> {
        u64::from_str_radix(self.block_number.trim_start_matches("0x"), 16)
    }

    pub fn log_index(&self) -> Result<u64, std::num::ParseIntError> {
        u64::from_str_radix(self.log_index.trim_start_matches("0x"), 16)
    }
}

/// Identity key for a normalized event record.
///
/// Two records with the same identity refer to the same on-chain log entry,
/// regardless of whether they arrived via live subscription or backfill.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventIdentity {
    pub kind: EventKind,
    pub transaction_hash: String,
    pub log_index: u64,
}

/// A normalized, immutable event record produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub kind: EventKind,
    pub block_number: u64,
    pub log_index: u64,
    pub transaction_hash: String,
    /// Kind-specific named fields. TokenSwap: buyer, tokens_sold;
    /// AddLiquidity: provider, token_amounts; RemoveLiquidity: provider,
    /// token_amounts, lp_token_supply. Amounts are decimal strings.
    pub args: serde_json::Map<String, serde_json::Value>,
}

impl EventRecord {
    pub fn identity(&self) -> EventIdentity {
        EventIdentity {
            kind: self.kind,
            transaction_hash: self.transaction_hash.clone(),
            log_index: self.log_index,
        }
    }
}
