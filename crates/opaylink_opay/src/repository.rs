// --- File: crates/opaylink_opay/src/repository.rs ---
//! Persistence for the shared settings record (API key, last validation,
//! running flag).
//!
//! There is one record per process and writes are last-write-wins; no
//! concurrency token is carried.

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::error::OpayError;
use crate::models::{IntegrationSettings, ValidationResult};

/// Storage for [`IntegrationSettings`]. Every mutating call returns the record
/// as it was written.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// The stored record, or the default one if nothing was saved yet.
    async fn load(&self) -> Result<IntegrationSettings, OpayError>;

    async fn save_key(&self, api_key: &str) -> Result<IntegrationSettings, OpayError>;

    async fn set_running(&self, running: bool) -> Result<IntegrationSettings, OpayError>;

    async fn save_validation(
        &self,
        result: &ValidationResult,
    ) -> Result<IntegrationSettings, OpayError>;
}

fn touch(settings: &mut IntegrationSettings) {
    settings.updated_at = Some(Utc::now());
}

/// Keeps the record in memory only. Used when no `settings_path` is configured
/// and in tests.
#[derive(Debug, Default)]
pub struct InMemorySettingsRepository {
    settings: RwLock<IntegrationSettings>,
}

impl InMemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: IntegrationSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }

    async fn modify(
        &self,
        f: impl FnOnce(&mut IntegrationSettings) + Send,
    ) -> IntegrationSettings {
        let mut settings = self.settings.write().await;
        f(&mut settings);
        touch(&mut settings);
        settings.clone()
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn load(&self) -> Result<IntegrationSettings, OpayError> {
        Ok(self.settings.read().await.clone())
    }

    async fn save_key(&self, api_key: &str) -> Result<IntegrationSettings, OpayError> {
        let api_key = api_key.to_string();
        Ok(self.modify(|s| s.api_key = Some(api_key)).await)
    }

    async fn set_running(&self, running: bool) -> Result<IntegrationSettings, OpayError> {
        Ok(self.modify(|s| s.running = running).await)
    }

    async fn save_validation(
        &self,
        result: &ValidationResult,
    ) -> Result<IntegrationSettings, OpayError> {
        let result = result.clone();
        Ok(self.modify(|s| s.validation = Some(result)).await)
    }
}

/// Stores the record as a single JSON document.
///
/// Writes go to a sibling temp file which is then renamed over the target, so
/// a crash mid-write never leaves a truncated document behind.
#[derive(Debug)]
pub struct JsonFileSettingsRepository {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileSettingsRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> Result<IntegrationSettings, OpayError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => {
                Ok(IntegrationSettings::default())
            }
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                OpayError::Settings(format!(
                    "corrupt settings file {}: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    "No settings file at {}, starting from defaults",
                    self.path.display()
                );
                Ok(IntegrationSettings::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_file(&self, settings: &IntegrationSettings) -> Result<(), OpayError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let body = serde_json::to_vec_pretty(settings)
            .map_err(|e| OpayError::Settings(format!("could not encode settings: {}", e)))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn modify(
        &self,
        f: impl FnOnce(&mut IntegrationSettings) + Send,
    ) -> Result<IntegrationSettings, OpayError> {
        let _guard = self.write_lock.lock().await;
        let mut settings = self.read_file().await?;
        f(&mut settings);
        touch(&mut settings);
        self.write_file(&settings).await?;
        Ok(settings)
    }
}

#[async_trait]
impl SettingsRepository for JsonFileSettingsRepository {
    async fn load(&self) -> Result<IntegrationSettings, OpayError> {
        self.read_file().await
    }

    async fn save_key(&self, api_key: &str) -> Result<IntegrationSettings, OpayError> {
        let api_key = api_key.to_string();
        let saved = self.modify(|s| s.api_key = Some(api_key)).await?;
        info!("Opay API key saved to {}", self.path.display());
        Ok(saved)
    }

    async fn set_running(&self, running: bool) -> Result<IntegrationSettings, OpayError> {
        self.modify(|s| s.running = running).await
    }

    async fn save_validation(
        &self,
        result: &ValidationResult,
    ) -> Result<IntegrationSettings, OpayError> {
        let result = result.clone();
        self.modify(|s| s.validation = Some(result)).await
    }
}
