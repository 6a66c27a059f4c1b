// --- File: crates/opaylink_opay/src/status.rs ---

use crate::countdown::{compute_remaining, TimeRemaining};
use crate::models::ValidationResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Where the subscription sits in the validation state machine.
///
/// `Unvalidated -> Validating -> {Valid, Invalid}`; both settled states can
/// re-enter `Validating`. There is no terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ValidationPhase {
    #[default]
    Unvalidated,
    Validating,
    Valid,
    Invalid,
}

/// The validation result and the countdown derived from it, always read and
/// written together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSnapshot {
    pub result: ValidationResult,
    pub remaining: TimeRemaining,
    pub phase: ValidationPhase,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    fn settled_phase(&self) -> ValidationPhase {
        match (self.updated_at, self.result.valid) {
            (None, _) => ValidationPhase::Unvalidated,
            (Some(_), true) => ValidationPhase::Valid,
            (Some(_), false) => ValidationPhase::Invalid,
        }
    }
}

/// Holds the last known validation result for the running process.
///
/// Every mutation goes through the single `watch` sender, so subscribers
/// (the countdown ticker, status readers) never see a result paired with a
/// countdown from a different result. Concurrent updates are last-write-wins.
#[derive(Debug)]
pub struct SubscriptionStatusStore {
    state: watch::Sender<StatusSnapshot>,
}

impl Default for SubscriptionStatusStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionStatusStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(StatusSnapshot::default());
        Self { state }
    }

    /// Replaces the stored result and reseeds the countdown from the wall clock.
    pub fn update(&self, result: ValidationResult) {
        self.update_at(result, Utc::now());
    }

    /// Replaces the stored result, seeding the countdown against `now`.
    /// An invalid result always carries a zero countdown.
    pub fn update_at(&self, result: ValidationResult, now: DateTime<Utc>) {
        let remaining = if result.valid {
            compute_remaining(result.end_date, now)
        } else {
            TimeRemaining::ZERO
        };
        let phase = if result.valid {
            ValidationPhase::Valid
        } else {
            ValidationPhase::Invalid
        };

        self.state.send_replace(StatusSnapshot {
            result,
            remaining,
            phase,
            updated_at: Some(now),
        });
    }

    /// Back to "No Plan", unvalidated, zero countdown.
    pub fn reset(&self) {
        self.state.send_replace(StatusSnapshot::default());
    }

    pub fn current(&self) -> ValidationResult {
        self.state.borrow().result.clone()
    }

    pub fn remaining(&self) -> TimeRemaining {
        self.state.borrow().remaining
    }

    pub fn phase(&self) -> ValidationPhase {
        self.state.borrow().phase
    }

    pub fn is_valid(&self) -> bool {
        self.state.borrow().result.valid
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.state.subscribe()
    }

    /// Marks a validation attempt as in flight and returns the phase it replaced.
    pub fn begin_validation(&self) -> ValidationPhase {
        let mut previous = ValidationPhase::Unvalidated;
        self.state.send_modify(|snapshot| {
            previous = snapshot.phase;
            snapshot.phase = ValidationPhase::Validating;
        });
        previous
    }

    /// Settles the phase after a failed attempt without touching the stored
    /// result, so last-good data survives transient failures.
    pub fn abort_validation(&self) {
        self.state.send_if_modified(|snapshot| {
            if snapshot.phase != ValidationPhase::Validating {
                return false;
            }
            snapshot.phase = snapshot.settled_phase();
            true
        });
    }

    /// Advances the stored countdown by one second. Returns the new value, or
    /// `None` when the subscription is invalid or the countdown is already at
    /// zero (in which case subscribers are not woken).
    pub fn tick_countdown(&self) -> Option<TimeRemaining> {
        let mut ticked = None;
        self.state.send_if_modified(|snapshot| {
            if !snapshot.result.valid || !snapshot.remaining.tick() {
                return false;
            }
            ticked = Some(snapshot.remaining);
            true
        });
        ticked
    }
}
