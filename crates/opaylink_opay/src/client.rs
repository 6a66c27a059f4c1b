// --- File: crates/opaylink_opay/src/client.rs ---
//! HTTP client for the Opay subscription-validation service.
//!
//! Posts `{ "apiKey": ... }` to `{validation_base_url}/validate` and maps the
//! answer onto [`ValidationResult`] or one of the [`OpayError`] classes.

use async_trait::async_trait;
use opaylink_common::create_client;
use opaylink_config::OpayConfig;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::OpayError;
use crate::models::{ServiceErrorBody, ValidateRequest, ValidateResponse, ValidationResult};
use crate::service::ValidationService;

/// [`ValidationService`] backed by the real HTTP API.
#[derive(Debug, Clone)]
pub struct HttpValidationService {
    client: Client,
    base_url: String,
}

impl HttpValidationService {
    /// Builds a client with the configured timeout, at least one second.
    /// Redirects are not followed.
    pub fn new(config: &OpayConfig) -> Result<Self, OpayError> {
        let client = create_client(config.request_timeout_secs.max(1), false)?;

        Ok(Self {
            client,
            base_url: config.validation_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/validate", self.base_url)
    }
}

/// Picks the most useful message out of an error response.
fn rejection_message(status: reqwest::StatusCode, body_text: &str) -> String {
    serde_json::from_str::<ServiceErrorBody>(body_text)
        .ok()
        .and_then(|body| body.message.or(body.error))
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            if body_text.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Validation request failed")
                    .to_string()
            } else {
                body_text.trim().to_string()
            }
        })
}

#[async_trait]
impl ValidationService for HttpValidationService {
    async fn validate(&self, api_key: &str) -> Result<ValidationResult, OpayError> {
        let url = self.endpoint();
        debug!("Sending validation request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&ValidateRequest { api_key })
            .send()
            .await?;

        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            warn!("Validation service returned HTTP {}", status);
            return Err(OpayError::Rejected {
                status: status.as_u16(),
                message: rejection_message(status, &body_text),
            });
        }

        let parsed: ValidateResponse = serde_json::from_str(&body_text)?;
        if !parsed.success {
            let message = parsed
                .message
                .or(parsed.reason)
                .unwrap_or_else(|| "Validation service reported failure".to_string());
            return Err(OpayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(parsed.into_result())
    }
}
