// --- File: crates/opaylink_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Opay Config ---
// Holds the subscription-validation settings. The API key may be injected
// from OPAY_API_KEY via the "secret_from_env" marker.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpayConfig {
    pub validation_base_url: String, // Mandatory
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Interval between automatic re-validations while the subscription is valid.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Countdown tick period.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Where the settings record is persisted. In-memory only when absent.
    #[serde(default)]
    pub settings_path: Option<String>,
    /// Fallback API key used when no key has been saved through the settings API.
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_poll_interval_secs() -> u64 {
    300
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_history_capacity() -> usize {
    5
}

impl OpayConfig {
    pub fn new(validation_base_url: impl Into<String>) -> Self {
        Self {
            validation_base_url: validation_base_url.into(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            tick_interval_ms: default_tick_interval_ms(),
            history_capacity: default_history_capacity(),
            settings_path: None,
            api_key: None,
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_opay: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub opay: Option<OpayConfig>,
}
