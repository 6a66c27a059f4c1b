// --- File: crates/opaylink_opay/src/countdown.rs ---

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

const MS_PER_DAY: i64 = 86_400_000;
const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_SECOND: i64 = 1_000;

/// Days/hours/minutes/seconds left on a subscription. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TimeRemaining {
    pub days: u64,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl TimeRemaining {
    pub const ZERO: TimeRemaining = TimeRemaining {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    pub fn new(days: u64, hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            days,
            hours,
            minutes,
            seconds,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn total_seconds(&self) -> u64 {
        self.days * 86_400
            + u64::from(self.hours) * 3_600
            + u64::from(self.minutes) * 60
            + u64::from(self.seconds)
    }

    /// Advances the countdown by one second, borrowing from the next larger
    /// unit on underflow. Returns `false` and leaves the value untouched once
    /// it has reached zero.
    pub fn tick(&mut self) -> bool {
        if self.is_zero() {
            return false;
        }

        if self.seconds > 0 {
            self.seconds -= 1;
            return true;
        }
        self.seconds = 59;

        if self.minutes > 0 {
            self.minutes -= 1;
            return true;
        }
        self.minutes = 59;

        if self.hours > 0 {
            self.hours -= 1;
            return true;
        }
        self.hours = 23;

        // is_zero() was false and every smaller unit was zero, so days > 0
        self.days -= 1;
        true
    }
}

/// Breaks the time left until `end_date` into whole days, hours, minutes and
/// seconds. Missing or past end dates yield zero. Truncates, never rounds.
pub fn compute_remaining(end_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> TimeRemaining {
    let Some(end_date) = end_date else {
        return TimeRemaining::ZERO;
    };

    let diff = end_date.signed_duration_since(now).num_milliseconds();
    if diff <= 0 {
        return TimeRemaining::ZERO;
    }

    // diff > 0, so every quotient below is non-negative
    let days = diff / MS_PER_DAY;
    let hours = (diff % MS_PER_DAY) / MS_PER_HOUR;
    let minutes = (diff % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (diff % MS_PER_MINUTE) / MS_PER_SECOND;

    TimeRemaining {
        days: u64::try_from(days).unwrap_or(0),
        hours: u32::try_from(hours).unwrap_or(0),
        minutes: u32::try_from(minutes).unwrap_or(0),
        seconds: u32::try_from(seconds).unwrap_or(0),
    }
}
