//! Event normalization.
//!
//! Pure mapping from a raw log entry plus its known event signature to a
//! uniform [`EventRecord`]. Shape mismatches fail with
//! [`IngestError::UnknownEventShape`]; that is a programming-contract
//! violation between agent and contract, not a runtime condition to retry.

use std::str::FromStr;

use alloy::primitives::{B256, U256};
use serde_json::Value;

use crate::{
	models::{EventKind, EventRecord, RawLog},
	services::ingest::IngestError,
};

/// Normalizes a raw log of the given kind into an [`EventRecord`]
pub fn normalize(kind: EventKind, log: &RawLog) -> Result<EventRecord, IngestError> {
	// The indexed account address rides in topics[1]; all kinds carry one
	if log.topics.len() != 2 {
		return Err(IngestError::unknown_event_shape(format!(
			"{} log has {} topics, expected 2",
			kind,
			log.topics.len()
		)));
	}

	let topic0 = B256::from_str(&log.topics[0]).map_err(|e| {
		IngestError::unknown_event_shape(format!("Invalid topic0 {}: {}", log.topics[0], e))
	})?;
	if topic0 != kind.topic0() {
		return Err(IngestError::unknown_event_shape(format!(
			"Log topic0 {} does not match {} signature",
			topic0, kind
		)));
	}

	let account = decode_topic_address(&log.topics[1])?;
	let words = decode_data_words(kind, &log.data)?;

	let block_number = log.block_number().map_err(|e| {
		IngestError::unknown_event_shape(format!("Invalid block number {}: {}", log.block_number, e))
	})?;
	let log_index = log.log_index().map_err(|e| {
		IngestError::unknown_event_shape(format!("Invalid log index {}: {}", log.log_index, e))
	})?;

	let mut args = serde_json::Map::new();
	match kind {
		EventKind::TokenSwap => {
			args.insert("buyer".into(), Value::String(account));
			args.insert("tokens_sold".into(), Value::String(words[0].to_string()));
		}
		EventKind::AddLiquidity => {
			args.insert("provider".into(), Value::String(account));
			args.insert("token_amounts".into(), Value::String(words[0].to_string()));
		}
		EventKind::RemoveLiquidity => {
			args.insert("provider".into(), Value::String(account));
			args.insert("token_amounts".into(), Value::String(words[0].to_string()));
			args.insert(
				"lp_token_supply".into(),
				Value::String(words[1].to_string()),
			);
		}
	}

	Ok(EventRecord {
		kind,
		block_number,
		log_index,
		transaction_hash: log.transaction_hash.to_lowercase(),
		args,
	})
}

/// Extracts the 20-byte address padded into a 32-byte indexed topic
fn decode_topic_address(topic: &str) -> Result<String, IngestError> {
	let bytes = hex::decode(topic.trim_start_matches("0x"))
		.map_err(|e| IngestError::unknown_event_shape(format!("Invalid address topic: {}", e)))?;
	if bytes.len() != 32 {
		return Err(IngestError::unknown_event_shape(format!(
			"Address topic has {} bytes, expected 32",
			bytes.len()
		)));
	}
	Ok(format!("0x{}", hex::encode(&bytes[12..])))
}

/// Decodes the non-indexed data payload into 32-byte uint words
fn decode_data_words(kind: EventKind, data: &str) -> Result<Vec<U256>, IngestError> {
	let bytes = hex::decode(data.trim_start_matches("0x"))
		.map_err(|e| IngestError::unknown_event_shape(format!("Invalid data payload: {}", e)))?;

	let expected = kind.data_word_count();
	if bytes.len() != expected * 32 {
		return Err(IngestError::unknown_event_shape(format!(
			"{} data payload has {} bytes, expected {}",
			kind,
			bytes.len(),
			expected * 32
		)));
	}

	Ok(bytes.chunks(32).map(U256::from_be_slice).collect())
}
