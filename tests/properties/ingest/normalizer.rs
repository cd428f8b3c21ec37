//! Properties of raw log normalization.

use alloy::primitives::U256;
use proptest::prelude::*;

use distro_agent::{
	models::{EventKind, RawLog},
	services::ingest::normalize,
};

fn encode_word(value: u128) -> String {
	hex::encode(U256::from(value).to_be_bytes::<32>())
}

fn encode_address_topic(address: [u8; 20]) -> String {
	let mut padded = [0u8; 32];
	padded[12..].copy_from_slice(&address);
	format!("0x{}", hex::encode(padded))
}

fn raw_log(kind: EventKind, address: [u8; 20], words: &[u128], block: u64, index: u64) -> RawLog {
	let data: String = words.iter().map(|w| encode_word(*w)).collect();
	RawLog {
		address: "0xdd21cf61dd3e47cec1bc5190915d726c8b0876c1".into(),
		topics: vec![
			format!("{:#x}", kind.topic0()),
			encode_address_topic(address),
		],
		data: format!("0x{}", data),
		block_number: format!("0x{:x}", block),
		transaction_hash: format!("0x{:x}", block),
		log_index: format!("0x{:x}", index),
	}
}

proptest! {
	#[test]
	fn token_swap_amounts_round_trip_as_decimal_strings(
		address in any::<[u8; 20]>(),
		amount in any::<u128>(),
		block in 0u64..=u64::MAX / 2,
		index in 0u64..10_000,
	) {
		let log = raw_log(EventKind::TokenSwap, address, &[amount], block, index);
		let record = normalize(EventKind::TokenSwap, &log).unwrap();

		prop_assert_eq!(record.block_number, block);
		prop_assert_eq!(record.log_index, index);
		prop_assert_eq!(
			record.args.get("buyer").and_then(|v| v.as_str()).unwrap(),
			format!("0x{}", hex::encode(address))
		);
		prop_assert_eq!(
			record.args.get("tokens_sold").and_then(|v| v.as_str()).unwrap(),
			amount.to_string()
		);
	}

	#[test]
	fn remove_liquidity_keeps_word_order(
		address in any::<[u8; 20]>(),
		amounts in any::<[u128; 2]>(),
		block in 0u64..=1_000_000,
	) {
		let log = raw_log(EventKind::RemoveLiquidity, address, &amounts, block, 0);
		let record = normalize(EventKind::RemoveLiquidity, &log).unwrap();

		prop_assert_eq!(
			record.args.get("token_amounts").and_then(|v| v.as_str()).unwrap(),
			amounts[0].to_string()
		);
		prop_assert_eq!(
			record.args.get("lp_token_supply").and_then(|v| v.as_str()).unwrap(),
			amounts[1].to_string()
		);
	}

	#[test]
	fn identity_is_stable_across_repeated_normalization(
		address in any::<[u8; 20]>(),
		amount in any::<u128>(),
		block in 0u64..=1_000_000,
		index in 0u64..10_000,
	) {
		let log = raw_log(EventKind::AddLiquidity, address, &[amount], block, index);
		let first = normalize(EventKind::AddLiquidity, &log).unwrap();
		let second = normalize(EventKind::AddLiquidity, &log).unwrap();

		prop_assert_eq!(first.identity(), second.identity());
	}

	#[test]
	fn truncated_data_is_rejected_for_every_kind(
		address in any::<[u8; 20]>(),
		extra_bytes in 1usize..32,
	) {
		for kind in EventKind::all() {
			let mut log = raw_log(kind, address, &vec![1u128; kind.data_word_count()], 1, 0);
			// Shave bytes off the payload so the word count no longer matches
			log.data.truncate(log.data.len() - extra_bytes * 2);
			prop_assert!(normalize(kind, &log).is_err());
		}
	}
}
