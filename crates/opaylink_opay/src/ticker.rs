// --- File: crates/opaylink_opay/src/ticker.rs ---
//! One-second countdown driven from the stored validation result.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::status::SubscriptionStatusStore;

/// Handle to the background task decrementing the stored countdown.
///
/// The task only runs its interval while the subscription is valid and the
/// countdown is non-zero. Otherwise it waits on the store until a new result
/// arrives. Dropping the handle cancels the task.
#[derive(Debug)]
pub struct CountdownTicker {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl CountdownTicker {
    pub fn start(
        store: Arc<SubscriptionStatusStore>,
        period: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let handle = tokio::spawn(countdown_task(store, period, cancel.clone()));
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancels the task and waits for it to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn countdown_task(
    store: Arc<SubscriptionStatusStore>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut updates = store.subscribe();

    'outer: loop {
        let idle = {
            let snapshot = updates.borrow_and_update();
            !snapshot.result.valid || snapshot.remaining.is_zero()
        };

        if idle {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            }
        }

        debug!("countdown ticker active");
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await; // consume the immediate first tick

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break 'outer,
                _ = interval.tick() => {
                    match store.tick_countdown() {
                        Some(remaining) => trace!(?remaining, "countdown tick"),
                        None => {
                            debug!("countdown ticker idle");
                            continue 'outer;
                        }
                    }
                }
            }
        }
    }

    debug!("countdown ticker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValidationResult;
    use chrono::Utc;

    fn valid_for(seconds: i64) -> ValidationResult {
        ValidationResult {
            valid: true,
            plan: "Premium".to_string(),
            end_date: Some(Utc::now() + chrono::Duration::seconds(seconds)),
            ..ValidationResult::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_down_from_three_and_stays_at_zero() {
        let store = Arc::new(SubscriptionStatusStore::new());
        let now = Utc::now();
        let result = ValidationResult {
            end_date: Some(now + chrono::Duration::seconds(3)),
            ..valid_for(0)
        };
        store.update_at(result, now);

        let mut updates = store.subscribe();
        updates.borrow_and_update();

        let ticker = CountdownTicker::start(
            Arc::clone(&store),
            Duration::from_secs(1),
            CancellationToken::new(),
        );

        let mut seen = Vec::new();
        for _ in 0..3 {
            updates.changed().await.unwrap();
            seen.push(updates.borrow_and_update().remaining.seconds);
        }
        assert_eq!(seen, vec![2, 1, 0]);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(store.remaining().is_zero());
        assert!(!updates.has_changed().unwrap());
        assert!(ticker.is_running());

        ticker.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_does_not_tick_while_invalid() {
        let store = Arc::new(SubscriptionStatusStore::new());
        let mut invalid = valid_for(3_600);
        invalid.valid = false;
        store.update(invalid);

        let ticker = CountdownTicker::start(
            Arc::clone(&store),
            Duration::from_secs(1),
            CancellationToken::new(),
        );
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(store.remaining().is_zero());

        store.update(valid_for(3_600));
        let seeded = store.remaining().total_seconds();
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(store.remaining().total_seconds(), seeded - 2);

        ticker.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_token_stops_task() {
        let store = Arc::new(SubscriptionStatusStore::new());
        let cancel = CancellationToken::new();
        let ticker = CountdownTicker::start(store, Duration::from_secs(1), cancel.clone());

        cancel.cancel();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!ticker.is_running());
    }
}
