// --- File: crates/opaylink_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{HttpStatusCode, OpaylinkError};

// Include the client module
pub mod client;

/// Extension trait for OpaylinkError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for OpaylinkError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let error_message = self.to_string();

        let body = Json(json!({
            "error": {
                "message": error_message,
                "code": status_code.as_u16(),
            }
        }));

        (status_code, body).into_response()
    }
}

impl IntoResponse for OpaylinkError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// Converts a Result<T, OpaylinkError> to a Result<Json<T>, Response>.
pub fn handle_json_result<T>(result: Result<T, OpaylinkError>) -> Result<Json<T>, Response>
where
    T: serde::Serialize,
{
    result.map(Json).map_err(|err| err.into_response())
}

/// Converts a Result<T, E> to a Result<Json<T>, Response> using a custom error mapper.
/// Used by feature crates to turn their own error enums into HTTP responses.
pub fn map_json_error<T, E, F>(result: Result<T, E>, f: F) -> Result<Json<T>, Response>
where
    T: serde::Serialize,
    F: FnOnce(E) -> OpaylinkError,
{
    result.map(Json).map_err(|err| f(err).into_response())
}
