// --- File: crates/opaylink_opay/src/countdown_proptest.rs ---
#[cfg(test)]
mod tests {
    use crate::countdown::{compute_remaining, TimeRemaining};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn base_time(offset_secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(offset_secs)
    }

    proptest! {
        // Expired or missing end dates always read zero
        #[test]
        fn test_expired_end_date_is_zero(
            now_offset in 0..100_000_000i64,
            past_ms in 0..10_000_000_000i64,
        ) {
            let now = base_time(now_offset);
            let end = now - Duration::milliseconds(past_ms);
            prop_assert_eq!(compute_remaining(Some(end), now), TimeRemaining::ZERO);
            prop_assert_eq!(compute_remaining(None, now), TimeRemaining::ZERO);
        }

        // Every field stays in range and the parts add back up to the truncated diff
        #[test]
        fn test_fields_in_range(
            now_offset in 0..100_000_000i64,
            ahead_ms in 1..20_000_000_000i64,
        ) {
            let now = base_time(now_offset);
            let end = now + Duration::milliseconds(ahead_ms);
            let remaining = compute_remaining(Some(end), now);

            prop_assert!(remaining.hours <= 23);
            prop_assert!(remaining.minutes <= 59);
            prop_assert!(remaining.seconds <= 59);
            prop_assert_eq!(remaining.total_seconds(), u64::try_from(ahead_ms / 1000).unwrap());
        }

        // A tick removes exactly one second until zero, then nothing
        #[test]
        fn test_tick_removes_one_second(
            days in 0..400u64,
            hours in 0..24u32,
            minutes in 0..60u32,
            seconds in 0..60u32,
        ) {
            let mut remaining = TimeRemaining::new(days, hours, minutes, seconds);
            let before = remaining.total_seconds();
            let advanced = remaining.tick();

            if before == 0 {
                prop_assert!(!advanced);
                prop_assert!(remaining.is_zero());
            } else {
                prop_assert!(advanced);
                prop_assert_eq!(remaining.total_seconds(), before - 1);
                prop_assert!(remaining.hours <= 23);
                prop_assert!(remaining.minutes <= 59);
                prop_assert!(remaining.seconds <= 59);
            }
        }
    }
}
