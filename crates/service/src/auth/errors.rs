use thiserror::Error;

use crate::errors::ServiceError;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{1}")]
    Validation(&'static str, String),
    #[error("user already exists")]
    Conflict,
    #[error("user not found")]
    NotFound,
    #[error("invalid credentials")]
    Unauthorized,
    #[error("session invalid or expired")]
    InvalidToken,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(..) => 1001,
            AuthError::Conflict => 1002,
            AuthError::NotFound => 1003,
            AuthError::Unauthorized => 1004,
            AuthError::InvalidToken => 1005,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::Repository(_) => 1200,
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(code, msg) => ServiceError::validation(code, msg),
            AuthError::Conflict => ServiceError::conflict("USER_ALREADY_EXISTS", "User already exists"),
            AuthError::NotFound => ServiceError::not_found("User"),
            AuthError::Unauthorized => ServiceError::unauthorized("INVALID_CREDENTIALS", "Invalid email or password"),
            AuthError::InvalidToken => ServiceError::unauthorized("INVALID_SESSION", "Session invalid or expired"),
            AuthError::HashError(m) | AuthError::TokenError(m) => ServiceError::Internal(m),
            AuthError::Repository(m) => ServiceError::Db(m),
        }
    }
}

impl From<ServiceError> for AuthError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Conflict { .. } => AuthError::Conflict,
            ServiceError::NotFound { .. } => AuthError::NotFound,
            other => AuthError::Repository(other.to_string()),
        }
    }
}
