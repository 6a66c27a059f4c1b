// --- File: crates/opaylink_opay/src/poller.rs ---
//! Manual and scheduled validation of the stored API key.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::OpayError;
use crate::history::{HistoryEntry, ValidationHistoryLog};
use crate::models::ValidationResult;
use crate::repository::SettingsRepository;
use crate::service::ValidationService;
use crate::status::SubscriptionStatusStore;

/// Who asked for a validation. Only affects logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Admin pressed "Validate"
    Manual,
    /// Periodic refresh
    Scheduled,
}

/// Runs validations against the external service and records their outcome.
///
/// A failure of any kind leaves the stored result untouched. Every attempt,
/// including one rejected for a missing key, lands in the history log.
pub struct ValidationPoller {
    service: Arc<dyn ValidationService>,
    store: Arc<SubscriptionStatusStore>,
    history: Arc<ValidationHistoryLog>,
    repository: Arc<dyn SettingsRepository>,
}

impl ValidationPoller {
    pub fn new(
        service: Arc<dyn ValidationService>,
        store: Arc<SubscriptionStatusStore>,
        history: Arc<ValidationHistoryLog>,
        repository: Arc<dyn SettingsRepository>,
    ) -> Self {
        Self {
            service,
            store,
            history,
            repository,
        }
    }

    pub fn store(&self) -> &Arc<SubscriptionStatusStore> {
        &self.store
    }

    pub fn history(&self) -> &Arc<ValidationHistoryLog> {
        &self.history
    }

    pub async fn validate(
        &self,
        api_key: Option<&str>,
        trigger: Trigger,
    ) -> Result<ValidationResult, OpayError> {
        let Some(api_key) = api_key.map(str::trim).filter(|k| !k.is_empty()) else {
            let err = OpayError::MissingApiKey;
            self.record_failure(&err, trigger);
            return Err(err);
        };

        self.store.begin_validation();

        match self.service.validate(api_key).await {
            Ok(result) => {
                self.store.update(result.clone());
                self.history
                    .append(HistoryEntry::success(&result, Utc::now()));

                match trigger {
                    Trigger::Manual => info!(
                        valid = result.valid,
                        plan = %result.plan,
                        "Opay validation completed"
                    ),
                    Trigger::Scheduled => debug!(
                        valid = result.valid,
                        "Scheduled Opay validation completed"
                    ),
                }

                if let Err(e) = self.repository.save_validation(&result).await {
                    warn!("Could not persist validation result: {}", e);
                }
                Ok(result)
            }
            Err(err) => {
                self.store.abort_validation();
                self.record_failure(&err, trigger);
                Err(err)
            }
        }
    }

    fn record_failure(&self, err: &OpayError, trigger: Trigger) {
        match trigger {
            Trigger::Manual => info!("Opay validation failed: {}", err),
            Trigger::Scheduled => warn!("Scheduled Opay validation failed: {}", err),
        }
        self.history
            .append(HistoryEntry::failure(err.user_message(), Utc::now()));
    }

    /// Validates the stored key, but only while the last known result is
    /// valid. Returns `None` when nothing was attempted.
    pub async fn refresh_if_valid(&self) -> Option<Result<ValidationResult, OpayError>> {
        if !self.store.is_valid() {
            debug!("Skipping scheduled validation, subscription is not valid");
            return None;
        }

        let api_key = match self.repository.load().await {
            Ok(settings) => settings.api_key,
            Err(e) => {
                warn!("Could not read stored API key for scheduled validation: {}", e);
                return None;
            }
        };

        Some(self.validate(api_key.as_deref(), Trigger::Scheduled).await)
    }

    /// Spawns the periodic refresh. The first attempt happens one full
    /// `period` after spawning.
    pub fn spawn_auto_refresh(
        self: &Arc<Self>,
        period: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(auto_refresh_task(Arc::clone(self), period, cancel))
    }
}

async fn auto_refresh_task(poller: Arc<ValidationPoller>, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = poller.refresh_if_valid() => {}
                }
            }
        }
    }

    debug!("Opay auto-refresh stopped");
}
