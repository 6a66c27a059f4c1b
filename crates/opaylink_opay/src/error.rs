// --- File: crates/opaylink_opay/src/error.rs ---
use opaylink_common::{external_service_error, OpaylinkError};
use thiserror::Error;

/// Name used when reporting validation-service failures upstream.
pub const SERVICE_NAME: &str = "Opay validation service";

/// Opay-specific error types.
#[derive(Error, Debug)]
pub enum OpayError {
    /// No API key was supplied or stored; rejected before any network call
    #[error("No Opay API key is set")]
    MissingApiKey,

    /// The validation service could not be reached
    #[error("Opay validation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The validation service answered but refused the key
    #[error("Opay validation rejected: {message} (Status: {status})")]
    Rejected { status: u16, message: String },

    /// The validation service answered with a body we could not read
    #[error("Failed to parse Opay validation response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Reading or writing the settings record failed
    #[error("Opay settings storage error: {0}")]
    Settings(String),
}

impl OpayError {
    /// Message shown to the admin, one per failure class.
    pub fn user_message(&self) -> String {
        match self {
            OpayError::MissingApiKey => "Please enter an API key before validating.".to_string(),
            OpayError::Transport(_) => {
                "Could not reach the validation service. Check your connection and try again."
                    .to_string()
            }
            OpayError::Rejected { message, .. } => format!("Validation failed: {}", message),
            OpayError::Parse(_) => {
                "The validation service sent an unexpected response.".to_string()
            }
            OpayError::Settings(_) => "Could not save the Opay settings.".to_string(),
        }
    }
}

impl From<std::io::Error> for OpayError {
    fn from(err: std::io::Error) -> Self {
        OpayError::Settings(err.to_string())
    }
}

/// Convert OpayError to OpaylinkError
impl From<OpayError> for OpaylinkError {
    fn from(err: OpayError) -> Self {
        match err {
            OpayError::MissingApiKey => {
                OpaylinkError::ValidationError(OpayError::MissingApiKey.user_message())
            }
            OpayError::Transport(e) => {
                if e.is_timeout() {
                    OpaylinkError::TimeoutError(format!("Opay validation timed out: {}", e))
                } else {
                    OpaylinkError::HttpError(format!("Opay request error: {}", e))
                }
            }
            OpayError::Rejected { status, message } => external_service_error(
                SERVICE_NAME,
                format!("Status: {}, Message: {}", status, message),
            ),
            OpayError::Parse(e) => {
                external_service_error(SERVICE_NAME, format!("unreadable response: {}", e))
            }
            OpayError::Settings(msg) => OpaylinkError::StorageError(msg),
        }
    }
}
