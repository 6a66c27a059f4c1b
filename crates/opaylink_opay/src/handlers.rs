// --- File: crates/opaylink_opay/src/handlers.rs ---
use axum::{
    body::Bytes,
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, info};

use opaylink_common::{handle_json_result, is_opay_enabled, map_json_error, OpaylinkError};
use opaylink_config::AppConfig;

use crate::history::HistoryEntry;
use crate::models::{
    SaveKeyRequest, SettingsQuery, SettingsResponse, StatusResponse, ToggleRunningRequest,
    ToggleRunningResponse, ValidateKeyRequest, ValidationResult,
};
use crate::monitor::OpayMonitor;

// --- State for Opay Handlers ---
#[derive(Clone)]
pub struct OpayState {
    pub config: Arc<AppConfig>,
    pub monitor: Arc<OpayMonitor>,
}

fn ensure_enabled(state: &OpayState) -> Result<(), Response> {
    if is_opay_enabled(&state.config) {
        Ok(())
    } else {
        Err(OpaylinkError::UnavailableError("Opay integration is disabled.".to_string())
            .into_response())
    }
}

/// Returns the shared settings record.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/opay/settings", // Path relative to /api
    params(SettingsQuery),
    responses(
        (status = 200, description = "Settings record, with `error` set if re-validation failed", body = SettingsResponse),
        (status = 500, description = "Settings storage error"),
        (status = 503, description = "Opay integration disabled")
    ),
    tag = "Opay"
))]
pub async fn get_settings_handler(
    State(state): State<Arc<OpayState>>,
    Query(query): Query<SettingsQuery>,
) -> Result<Json<SettingsResponse>, Response> {
    ensure_enabled(&state)?;
    debug!(cached = query.cached, "Opay settings requested");
    map_json_error(state.monitor.settings(query.cached).await, OpaylinkError::from)
}

/// Stores a new API key. Does not validate it.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/opay/save-key",
    request_body = SaveKeyRequest,
    responses(
        (status = 200, description = "Key saved", body = SettingsResponse),
        (status = 400, description = "Blank API key"),
        (status = 503, description = "Opay integration disabled")
    ),
    tag = "Opay"
))]
pub async fn save_key_handler(
    State(state): State<Arc<OpayState>>,
    Json(payload): Json<SaveKeyRequest>,
) -> Result<Json<SettingsResponse>, Response> {
    ensure_enabled(&state)?;
    map_json_error(state.monitor.save_key(&payload.api_key).await, OpaylinkError::from)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/opay/toggle-running",
    request_body = ToggleRunningRequest,
    responses(
        (status = 200, description = "Running flag persisted", body = ToggleRunningResponse),
        (status = 503, description = "Opay integration disabled")
    ),
    tag = "Opay"
))]
pub async fn toggle_running_handler(
    State(state): State<Arc<OpayState>>,
    Json(payload): Json<ToggleRunningRequest>,
) -> Result<Json<ToggleRunningResponse>, Response> {
    ensure_enabled(&state)?;
    let result = state
        .monitor
        .toggle_running(payload.running)
        .await
        .map(|running| ToggleRunningResponse { running });
    map_json_error(result, OpaylinkError::from)
}

/// Validates the given key, or the stored one when the body is empty.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/opay/validate",
    request_body(content = ValidateKeyRequest, description = "Optional key; the stored key is used when absent"),
    responses(
        (status = 200, description = "Validation result", body = ValidationResult),
        (status = 400, description = "No API key available"),
        (status = 502, description = "Validation service unreachable or rejected the key"),
        (status = 504, description = "Validation service timed out")
    ),
    tag = "Opay"
))]
pub async fn validate_handler(
    State(state): State<Arc<OpayState>>,
    body: Bytes,
) -> Result<Json<ValidationResult>, Response> {
    ensure_enabled(&state)?;

    // An empty body is allowed and means "use the stored key".
    let payload = if body.iter().all(u8::is_ascii_whitespace) {
        ValidateKeyRequest::default()
    } else {
        serde_json::from_slice::<ValidateKeyRequest>(&body).map_err(|e| {
            OpaylinkError::ParseError(format!("invalid validate request: {}", e)).into_response()
        })?
    };

    info!("Manual Opay validation requested");
    map_json_error(
        state.monitor.validate_now(payload.api_key.as_deref()).await,
        OpaylinkError::from,
    )
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/opay/status",
    responses(
        (status = 200, description = "Current phase, result, countdown and history", body = StatusResponse),
        (status = 503, description = "Opay integration disabled")
    ),
    tag = "Opay"
))]
pub async fn status_handler(
    State(state): State<Arc<OpayState>>,
) -> Result<Json<StatusResponse>, Response> {
    ensure_enabled(&state)?;
    handle_json_result(state.monitor.status().await.map_err(OpaylinkError::from))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/opay/history",
    responses(
        (status = 200, description = "Recent validation attempts, newest first", body = [HistoryEntry]),
        (status = 503, description = "Opay integration disabled")
    ),
    tag = "Opay"
))]
pub async fn history_handler(
    State(state): State<Arc<OpayState>>,
) -> Result<Json<Vec<HistoryEntry>>, Response> {
    ensure_enabled(&state)?;
    Ok(Json(state.monitor.history()))
}
