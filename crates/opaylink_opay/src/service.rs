// --- File: crates/opaylink_opay/src/service.rs ---
//! Seam between the validation logic and the external validation service.

use crate::error::OpayError;
use crate::models::ValidationResult;
use async_trait::async_trait;

/// Asks the external service whether an API key is entitled to service.
#[async_trait]
pub trait ValidationService: Send + Sync {
    /// Validate `api_key`. Transport failures, refusals and unreadable
    /// bodies come back as distinct [`OpayError`] variants.
    async fn validate(&self, api_key: &str) -> Result<ValidationResult, OpayError>;
}
