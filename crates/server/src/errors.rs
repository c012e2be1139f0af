use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::auth::errors::AuthError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// Error body every handler renders: `{"error": CODE, "message": text}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let status = match &e {
            ServiceError::Validation { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::Conflict { .. } => StatusCode::CONFLICT,
            ServiceError::Locked { .. } => StatusCode::LOCKED,
            ServiceError::Gateway(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Model(models::errors::ModelError::Validation(_)) => StatusCode::BAD_REQUEST,
            ServiceError::Db(_) | ServiceError::Internal(_) | ServiceError::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let code = e.code();
        if status.is_server_error() {
            error!(code, err = %e, "request failed");
            let message = match e {
                ServiceError::Gateway(_) => "Payment gateway unavailable".to_string(),
                _ => "Internal server error".to_string(),
            };
            return Self::new(status, code, message);
        }
        Self::new(status, code, e.to_string())
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        ServiceError::from(e).into()
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({"error": self.code, "message": self.message}))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
