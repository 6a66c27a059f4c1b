// --- File: crates/opaylink_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The error type every Opaylink HTTP response is rendered from.
///
/// Feature crates keep their own enums and convert with
/// `From<FeatureError> for OpaylinkError` at the handler boundary.
#[derive(Error, Debug)]
pub enum OpaylinkError {
    /// Upstream HTTP call failed before an answer arrived
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Request body could not be read
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Caller supplied unusable input
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Persisted settings could not be read or written
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// The requested feature is switched off in configuration
    #[error("Service unavailable: {0}")]
    UnavailableError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Maps an error onto the HTTP status it is reported with.
pub trait HttpStatusCode {
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for OpaylinkError {
    fn status_code(&self) -> u16 {
        match self {
            OpaylinkError::ParseError(_) | OpaylinkError::ValidationError(_) => 400,
            OpaylinkError::HttpError(_) | OpaylinkError::ExternalServiceError { .. } => 502,
            OpaylinkError::UnavailableError(_) => 503,
            OpaylinkError::TimeoutError(_) => 504,
            OpaylinkError::ConfigError(_)
            | OpaylinkError::StorageError(_)
            | OpaylinkError::InternalError(_) => 500,
        }
    }
}

/// Attaches a description to any error, turning it into an internal error.
pub trait Context<T, E> {
    fn context<C>(self, context: C) -> Result<T, OpaylinkError>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Like [`Context::context`], building the description only on failure.
    fn with_context<C, F>(self, f: F) -> Result<T, OpaylinkError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, OpaylinkError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| OpaylinkError::InternalError(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, OpaylinkError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| OpaylinkError::InternalError(format!("{}: {}", f(), error)))
    }
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> OpaylinkError {
    OpaylinkError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}
