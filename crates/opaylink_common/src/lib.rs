// --- File: crates/opaylink_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod features; // Feature flag handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod routes; // Route definitions

// Re-export the routes function to be used by the main backend service
pub use routes::routes;

// Re-export error types and utilities for easier access
pub use error::{external_service_error, Context, HttpStatusCode, OpaylinkError};

// Re-export HTTP utilities for easier access
pub use http::{
    client::create_client,
    handle_json_result, map_json_error, IntoHttpResponse,
};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level, log_error, log_result};

// Re-export feature flag handling utilities for easier access
pub use features::is_feature_enabled;

#[cfg(feature = "opay")]
pub use features::is_opay_enabled;
