// --- File: crates/opaylink_common/src/features.rs ---
//! Feature flag handling.
//!
//! Features are switched twice: at compile time with `#[cfg(feature = "...")]`
//! and at runtime with the `use_*` flags in `AppConfig`.
//!
//! ## Available Features
//!
//! - `opay`: Enables the Opay subscription integration

#[cfg(feature = "opay")]
use opaylink_config::AppConfig;
#[cfg(feature = "opay")]
use std::sync::Arc;

/// A feature is enabled when its runtime flag is set and its section is configured.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

/// Check if the Opay integration is enabled at runtime.
#[cfg(feature = "opay")]
pub fn is_opay_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config.use_opay, config.opay.as_ref())
}
