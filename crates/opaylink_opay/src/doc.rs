// --- File: crates/opaylink_opay/src/doc.rs ---
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::countdown::TimeRemaining;
use crate::history::HistoryEntry;
use crate::models::{
    IntegrationSettings, SaveKeyRequest, SettingsResponse, StatusResponse, ToggleRunningRequest,
    ToggleRunningResponse, ValidateKeyRequest, ValidationResult,
};
use crate::status::ValidationPhase;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_settings_handler,
        crate::handlers::save_key_handler,
        crate::handlers::toggle_running_handler,
        crate::handlers::validate_handler,
        crate::handlers::status_handler,
        crate::handlers::history_handler
    ),
    components(
        schemas(
            ValidationResult, IntegrationSettings, SettingsResponse,
            SaveKeyRequest, ToggleRunningRequest, ToggleRunningResponse,
            ValidateKeyRequest, StatusResponse, ValidationPhase,
            TimeRemaining, HistoryEntry
        )
    ),
    tags(
        (name = "Opay", description = "Opay subscription validation and integration settings")
    )
)]
pub struct OpayApiDoc;
