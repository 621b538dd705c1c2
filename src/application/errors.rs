use thiserror::Error;

use crate::application::ports::UniqueViolation;

pub type AppResult<T> = Result<T, AppError>;

/// Typed failures returned by use cases. Presentation maps each variant to an
/// HTTP status and the response envelope.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(Vec<String>),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    TokenExpired,

    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("email address has not been verified")]
    EmailNotVerified,

    #[error("account is disabled")]
    AccountDisabled,

    #[error("account locked until {until}")]
    AccountLocked {
        until: chrono::DateTime<chrono::Utc>,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BusinessRule(String),

    #[error(transparent)]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<UniqueViolation>() {
            Ok(violation) => AppError::Conflict(violation.0),
            Err(err) => AppError::Internal(err),
        }
    }
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn rule(msg: impl Into<String>) -> Self {
        AppError::BusinessRule(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        AppError::Validation(vec![msg.into()])
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(crate::application::services::validation::messages(&errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violations_from_ports_become_conflicts() {
        let err: AppError = anyhow::Error::new(UniqueViolation("a team with this name already exists".into())).into();
        assert!(matches!(err, AppError::Conflict(msg) if msg == "a team with this name already exists"));

        let err: AppError = anyhow::anyhow!("connection reset").into();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
