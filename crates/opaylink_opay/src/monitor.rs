// --- File: crates/opaylink_opay/src/monitor.rs ---
//! Owns the subscription state and the two background timers for one
//! configured Opay integration.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use opaylink_config::OpayConfig;

use crate::client::HttpValidationService;
use crate::error::OpayError;
use crate::history::{HistoryEntry, ValidationHistoryLog};
use crate::models::{SettingsResponse, StatusResponse, ValidationResult};
use crate::poller::{Trigger, ValidationPoller};
use crate::repository::{InMemorySettingsRepository, JsonFileSettingsRepository, SettingsRepository};
use crate::service::ValidationService;
use crate::status::SubscriptionStatusStore;
use crate::ticker::CountdownTicker;

struct MonitorTasks {
    cancel: CancellationToken,
    ticker: CountdownTicker,
    refresh: JoinHandle<()>,
}

/// Entry point used by the HTTP layer and the backend binary.
pub struct OpayMonitor {
    poller: Arc<ValidationPoller>,
    repository: Arc<dyn SettingsRepository>,
    default_api_key: Option<String>,
    tick_interval: Duration,
    poll_interval: Duration,
    root_cancel: CancellationToken,
    tasks: Mutex<Option<MonitorTasks>>,
}

impl OpayMonitor {
    pub fn new(
        config: &OpayConfig,
        service: Arc<dyn ValidationService>,
        repository: Arc<dyn SettingsRepository>,
    ) -> Self {
        let store = Arc::new(SubscriptionStatusStore::new());
        let history = Arc::new(ValidationHistoryLog::new(config.history_capacity));
        let poller = Arc::new(ValidationPoller::new(
            service,
            store,
            history,
            Arc::clone(&repository),
        ));

        Self {
            poller,
            repository,
            default_api_key: config
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty()),
            tick_interval: Duration::from_millis(config.tick_interval_ms.max(1)),
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
            root_cancel: CancellationToken::new(),
            tasks: Mutex::new(None),
        }
    }

    /// Wires the HTTP client and the repository named by the configuration.
    /// Without a `settings_path` the record lives in memory.
    pub fn from_config(config: &OpayConfig) -> Result<Self, OpayError> {
        let service: Arc<dyn ValidationService> = Arc::new(HttpValidationService::new(config)?);
        let repository: Arc<dyn SettingsRepository> = match config.settings_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Arc::new(JsonFileSettingsRepository::new(path)),
            _ => {
                warn!("No opay.settings_path configured, settings will not survive a restart");
                Arc::new(InMemorySettingsRepository::new())
            }
        };
        Ok(Self::new(config, service, repository))
    }

    pub fn store(&self) -> &Arc<SubscriptionStatusStore> {
        self.poller.store()
    }

    /// Seeds the store from the cached settings and spawns the countdown
    /// ticker and the auto-refresh. Calling it again while running is a no-op.
    pub async fn start(&self) -> Result<(), OpayError> {
        let mut tasks = self.tasks.lock().await;
        if tasks.is_some() {
            warn!("Opay monitor already started");
            return Ok(());
        }

        let mut settings = self.repository.load().await?;
        if settings.api_key.is_none() {
            if let Some(key) = self.default_api_key.as_deref() {
                info!("Seeding Opay API key from configuration");
                settings = self.repository.save_key(key).await?;
            }
        }

        match settings.validation {
            Some(cached) => self.store().update(cached),
            None => self.store().reset(),
        }

        let cancel = self.root_cancel.child_token();
        let ticker = CountdownTicker::start(
            Arc::clone(self.store()),
            self.tick_interval,
            cancel.child_token(),
        );
        let refresh = self
            .poller
            .spawn_auto_refresh(self.poll_interval, cancel.child_token());

        info!(
            valid = self.store().is_valid(),
            poll_secs = self.poll_interval.as_secs(),
            "Opay monitor started"
        );

        *tasks = Some(MonitorTasks {
            cancel,
            ticker,
            refresh,
        });
        Ok(())
    }

    /// Cancels both timers and waits for them to exit.
    pub async fn shutdown(&self) {
        let Some(tasks) = self.tasks.lock().await.take() else {
            return;
        };

        tasks.cancel.cancel();
        tasks.ticker.stop().await;
        if let Err(e) = tasks.refresh.await {
            warn!("Opay auto-refresh task ended abnormally: {}", e);
        }
        info!("Opay monitor stopped");
    }

    pub async fn is_started(&self) -> bool {
        self.tasks.lock().await.is_some()
    }

    /// The settings record. With `cached == false` the stored key is
    /// validated first; a failure is reported next to the last good data.
    pub async fn settings(&self, cached: bool) -> Result<SettingsResponse, OpayError> {
        let mut error = None;
        if !cached {
            let stored = self.repository.load().await?;
            if let Err(e) = self
                .poller
                .validate(stored.api_key.as_deref(), Trigger::Manual)
                .await
            {
                error = Some(e.user_message());
            }
        }

        Ok(SettingsResponse {
            settings: self.repository.load().await?,
            error,
        })
    }

    pub async fn save_key(&self, api_key: &str) -> Result<SettingsResponse, OpayError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(OpayError::MissingApiKey);
        }

        Ok(SettingsResponse {
            settings: self.repository.save_key(api_key).await?,
            error: None,
        })
    }

    /// Persists the running flag. Never triggers a validation.
    pub async fn toggle_running(&self, running: bool) -> Result<bool, OpayError> {
        let saved = self.repository.set_running(running).await?;
        info!(running = saved.running, "Opay integration running flag changed");
        Ok(saved.running)
    }

    /// Validates `api_key`, or the stored key when none is given.
    /// A blank explicit key fails with [`OpayError::MissingApiKey`].
    pub async fn validate_now(
        &self,
        api_key: Option<&str>,
    ) -> Result<ValidationResult, OpayError> {
        match api_key {
            Some(key) => self.poller.validate(Some(key), Trigger::Manual).await,
            None => {
                let stored = self.repository.load().await?.api_key;
                self.poller.validate(stored.as_deref(), Trigger::Manual).await
            }
        }
    }

    pub async fn status(&self) -> Result<StatusResponse, OpayError> {
        let snapshot = self.store().snapshot();
        let settings = self.repository.load().await?;

        Ok(StatusResponse {
            phase: snapshot.phase,
            validation: snapshot.result,
            time_remaining: snapshot.remaining,
            running: settings.running,
            updated_at: snapshot.updated_at,
            history: self.history(),
        })
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.poller.history().entries()
    }
}

impl Drop for OpayMonitor {
    fn drop(&mut self) {
        self.root_cancel.cancel();
    }
}
