// --- File: crates/opaylink_opay/src/routes.rs ---

use crate::handlers::{
    get_settings_handler, history_handler, save_key_handler, status_handler,
    toggle_running_handler, validate_handler, OpayState,
};
use crate::monitor::OpayMonitor;
use axum::{
    routing::{get, post},
    Router,
};
use opaylink_config::AppConfig;
use std::sync::Arc;

/// Creates a router containing all routes for the Opay integration.
///
/// The monitor is shared with the caller so it can be shut down with the server.
pub fn routes(config: Arc<AppConfig>, monitor: Arc<OpayMonitor>) -> Router {
    let opay_state = Arc::new(OpayState { config, monitor });

    Router::new()
        // Settings record
        .route("/opay/settings", get(get_settings_handler))
        .route("/opay/save-key", post(save_key_handler))
        .route("/opay/toggle-running", post(toggle_running_handler))
        // Validation and live status
        .route("/opay/validate", post(validate_handler))
        .route("/opay/status", get(status_handler))
        .route("/opay/history", get(history_handler))
        .with_state(opay_state)
}
