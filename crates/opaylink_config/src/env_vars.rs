// --- File: crates/opaylink_config/src/env_vars.rs ---
//! Environment variable naming for the Opaylink configuration.
//!
//! Configuration values are overridden with `OPAYLINK__SECTION__KEY`
//! variables; secrets marked `secret_from_env` in a config file are read from
//! `SECTION_KEY`.

use std::env;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "OPAYLINK";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// The separator for secret environment variables
pub const SECRET_SEPARATOR: &str = "_";

/// Marker value that asks the loader to pull the real value from the environment.
pub const SECRET_MARKER: &str = "secret_from_env";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path to an environment variable name
///
/// # Arguments
///
/// * `path` - The configuration path (e.g., "server.host")
///
/// # Returns
///
/// The environment variable name (e.g., "OPAYLINK__SERVER__HOST")
pub fn config_path_to_env_var(path: &str) -> String {
    config_path_to_env_var_with_prefix(&get_config_prefix(), path)
}

pub fn config_path_to_env_var_with_prefix(prefix: &str, path: &str) -> String {
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to an environment variable name
///
/// # Arguments
///
/// * `segments` - The path segments of the marked value (e.g., ["opay", "api_key"])
///
/// # Returns
///
/// The environment variable name (e.g., "OPAY_API_KEY")
pub fn secret_path_to_env_var(segments: &[String]) -> String {
    segments.join(SECRET_SEPARATOR).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_to_env_var() {
        assert_eq!(
            config_path_to_env_var_with_prefix("OPAYLINK", "opay.poll_interval_secs"),
            "OPAYLINK__OPAY__POLL_INTERVAL_SECS"
        );
    }

    #[test]
    fn test_secret_path_to_env_var() {
        let segments = vec!["opay".to_string(), "api_key".to_string()];
        assert_eq!(secret_path_to_env_var(&segments), "OPAY_API_KEY");
    }
}
