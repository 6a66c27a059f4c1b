// --- File: crates/opaylink_opay/src/models.rs ---

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::countdown::TimeRemaining;
use crate::history::HistoryEntry;
use crate::status::ValidationPhase;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Plan label used before any successful validation.
pub const NO_PLAN: &str = "No Plan";

/// The validation service's verdict on a subscription, replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    #[serde(default)]
    pub valid: bool,
    #[serde(default = "default_plan")]
    #[cfg_attr(feature = "openapi", schema(example = "Premium"))]
    pub plan: String,
    #[serde(default)]
    pub primary_domain: String,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub device_count: u32,
    #[serde(default)]
    pub active_number_count: u32,
    #[serde(default, deserialize_with = "deserialize_lenient_date")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_lenient_date")]
    pub latest_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subscription_id: String,
    /// Free-text explanation from the validation service, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

fn default_plan() -> String {
    NO_PLAN.to_string()
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            valid: false,
            plan: NO_PLAN.to_string(),
            primary_domain: String::new(),
            domains: Vec::new(),
            device_count: 0,
            active_number_count: 0,
            end_date: None,
            latest_end_date: None,
            subscription_id: String::new(),
            reason: None,
        }
    }
}

/// The persisted settings record shared by every admin session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct IntegrationSettings {
    pub api_key: Option<String>,
    pub validation: Option<ValidationResult>,
    #[serde(default)]
    pub running: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

// --- Admin API types ---

/// Query for `GET /opay/settings`.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct SettingsQuery {
    /// `false` re-validates the stored key before answering. Defaults to `true`.
    #[serde(default = "default_cached")]
    pub cached: bool,
}

fn default_cached() -> bool {
    true
}

/// The settings record plus the error of a re-validation that failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    #[serde(flatten)]
    pub settings: IntegrationSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SaveKeyRequest {
    #[cfg_attr(feature = "openapi", schema(example = "opay_live_3f9a..."))]
    pub api_key: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ToggleRunningRequest {
    pub running: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ToggleRunningResponse {
    pub running: bool,
}

/// Body of `POST /opay/validate`. Without a key the stored one is used.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ValidateKeyRequest {
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Everything the admin status panel shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub phase: ValidationPhase,
    pub validation: ValidationResult,
    pub time_remaining: TimeRemaining,
    pub running: bool,
    pub updated_at: Option<DateTime<Utc>>,
    pub history: Vec<HistoryEntry>,
}

// --- Wire types for the external validation service ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest<'a> {
    pub api_key: &'a str,
}

/// Response body of `POST /validate` on the validation service.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub valid: bool,
    pub plan: Option<String>,
    pub primary_domain: Option<String>,
    pub domains: Option<Vec<String>>,
    pub device_count: Option<u32>,
    pub active_number_count: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_lenient_date")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_lenient_date")]
    pub latest_end_date: Option<DateTime<Utc>>,
    pub subscription_id: Option<String>,
    pub reason: Option<String>,
    pub message: Option<String>,
}

impl ValidateResponse {
    pub fn into_result(self) -> ValidationResult {
        let domains = self.domains.unwrap_or_default();
        let primary_domain = self
            .primary_domain
            .filter(|d| !d.is_empty())
            .or_else(|| domains.first().cloned())
            .unwrap_or_default();

        ValidationResult {
            valid: self.valid,
            plan: self
                .plan
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| NO_PLAN.to_string()),
            primary_domain,
            domains,
            device_count: self.device_count.unwrap_or(0),
            active_number_count: self.active_number_count.unwrap_or(0),
            end_date: self.end_date,
            latest_end_date: self.latest_end_date,
            subscription_id: self.subscription_id.unwrap_or_default(),
            reason: self.reason,
        }
    }
}

/// Error body returned by the validation service on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ServiceErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

// --- Date handling ---

/// Parses the date shapes the validation service has been seen to emit:
/// RFC 3339, epoch milliseconds (number or string) and bare `YYYY-MM-DD`.
/// Anything else is treated as absent, i.e. expired.
pub fn parse_lenient_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| s.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis))
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(|naive| naive.and_utc())
                })
        }
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

fn deserialize_lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(parse_lenient_date))
}
