//! Properties of the UTC-midnight boundary arithmetic.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use distro_agent::services::scheduler::ms_until_next_midnight;

const DAY_MS: u64 = 86_400_000;

fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
	// 1970 through end of 2099, with sub-second offsets
	(0i64..4_102_444_800, 0u32..1_000_000_000)
		.prop_map(|(secs, nanos)| Utc.timestamp_opt(secs, nanos).unwrap())
}

proptest! {
	#[test]
	fn delay_is_strictly_forward_and_at_most_one_day(now in arb_instant()) {
		let ms = ms_until_next_midnight(now);
		prop_assert!(ms >= 1);
		prop_assert!(ms <= DAY_MS);
	}

	#[test]
	fn firing_instant_is_at_or_before_the_boundary(now in arb_instant()) {
		let ms = ms_until_next_midnight(now);
		let fired = now + Duration::milliseconds(ms as i64);

		// The wake-up lands on the boundary, give or take the truncated
		// sub-millisecond remainder
		let next_day = now.date_naive().succ_opt().unwrap();
		prop_assert!(fired.date_naive() <= next_day);
		let boundary = next_day.and_time(chrono::NaiveTime::MIN).and_utc();
		prop_assert!((boundary - fired).num_milliseconds().abs() <= 1);
	}

	#[test]
	fn delay_shrinks_with_elapsed_time_within_a_day(now in arb_instant()) {
		let ms = ms_until_next_midnight(now);
		// Only meaningful when a full second remains before the boundary
		prop_assume!(ms > 1000);

		let later = now + Duration::seconds(1);
		let later_ms = ms_until_next_midnight(later);
		prop_assert_eq!(later_ms, ms - 1000);
	}
}
