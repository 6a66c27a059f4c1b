// --- File: crates/opaylink_opay/src/lib.rs ---

pub mod client;
pub mod countdown;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod history;
pub mod models;
pub mod monitor;
pub mod poller;
pub mod repository;
pub mod routes;
pub mod service;
pub mod status;
pub mod ticker;

#[cfg(test)]
mod countdown_proptest;
#[cfg(test)]
mod poller_test;

// Re-export for main backend
pub use routes::routes;
pub use client::HttpValidationService;
pub use countdown::{compute_remaining, TimeRemaining};
pub use error::OpayError;
pub use handlers::OpayState;
pub use history::{HistoryEntry, ValidationHistoryLog};
pub use models::{IntegrationSettings, ValidationResult};
pub use monitor::OpayMonitor;
pub use poller::{Trigger, ValidationPoller};
pub use repository::{InMemorySettingsRepository, JsonFileSettingsRepository, SettingsRepository};
pub use service::ValidationService;
pub use status::{StatusSnapshot, SubscriptionStatusStore, ValidationPhase};
pub use ticker::CountdownTicker;
