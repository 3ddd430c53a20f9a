use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// AppError
///
/// Every failure a handler or the security filter can surface to a client.
/// `Unauthorized` is the only one produced by the policy layer itself.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid credentials. Carries the realm for the Basic challenge.
    #[error("unauthorized")]
    Unauthorized { realm: String },

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// Details are logged but never returned to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn unauthorized(realm: impl Into<String>) -> Self {
        AppError::Unauthorized { realm: realm.into() }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(format!("database: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized { realm } => {
                let mut response = StatusCode::UNAUTHORIZED.into_response();
                let challenge = format!("Basic realm=\"{}\"", realm);
                // A realm with non-visible characters cannot be sent; the 401 alone still holds.
                if let Ok(value) = HeaderValue::from_str(&challenge) {
                    response
                        .headers_mut()
                        .insert(header::WWW_AUTHENTICATE, value);
                }
                response
            }
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            AppError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response()
            }
            AppError::Internal(details) => {
                tracing::error!(%details, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
