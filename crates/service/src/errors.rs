use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Business failures. Every variant maps to a stable SCREAMING_SNAKE code
/// that clients can match on; `message` is for humans.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation { code: &'static str, message: String },
    #[error("{message}")]
    Unauthorized { code: &'static str, message: String },
    #[error("{message}")]
    Forbidden { code: &'static str, message: String },
    #[error("{message}")]
    NotFound { code: &'static str, message: String },
    #[error("{message}")]
    Conflict { code: &'static str, message: String },
    #[error("{message}")]
    Locked { code: &'static str, message: String },
    #[error("payment gateway error: {0}")]
    Gateway(String),
    #[error("database error: {0}")]
    Db(String),
    /// Hashing or token signing failed.
    #[error("internal error: {0}")]
    Internal(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { code, message: message.into() }
    }

    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::Unauthorized { code, message: message.into() }
    }

    pub fn forbidden(code: &'static str, message: impl Into<String>) -> Self {
        Self::Forbidden { code, message: message.into() }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict { code, message: message.into() }
    }

    pub fn locked(code: &'static str, message: impl Into<String>) -> Self {
        Self::Locked { code, message: message.into() }
    }

    /// `not_found("Team")` yields code `TEAM_NOT_FOUND`.
    pub fn not_found(entity: &str) -> Self {
        let code = match entity {
            "User" => "USER_NOT_FOUND",
            "Profile" => "PROFILE_NOT_FOUND",
            "Event" => "EVENT_NOT_FOUND",
            "Team" => "TEAM_NOT_FOUND",
            "Registration" => "REGISTRATION_NOT_FOUND",
            "Announcement" => "ANNOUNCEMENT_NOT_FOUND",
            _ => "NOT_FOUND",
        };
        Self::NotFound { code, message: format!("{} not found", entity) }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { code, .. }
            | Self::Unauthorized { code, .. }
            | Self::Forbidden { code, .. }
            | Self::NotFound { code, .. }
            | Self::Conflict { code, .. }
            | Self::Locked { code, .. } => code,
            Self::Gateway(_) => "PAYMENT_GATEWAY_ERROR",
            Self::Db(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Model(models::errors::ModelError::Validation(_)) => "VALIDATION_ERROR",
            Self::Model(models::errors::ModelError::Db(_)) => "DATABASE_ERROR",
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                Self::conflict("DUPLICATE_KEY", format!("duplicate value: {detail}"))
            }
            _ => Self::Db(e.to_string()),
        }
    }
}
