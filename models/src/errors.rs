// models/src/errors.rs

pub use thiserror::Error;

/// Domain failure taxonomy. Every operation boundary translates underlying
/// failures into one of these kinds; the REST layer maps each kind to a
/// status code. Messages are user-visible and must not carry internal
/// detail beyond a single string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    Authorization(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Wraps an underlying store or primitive failure. Only the display
    /// string survives to the caller.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Internal(format!("JSON processing error: {}", err))
    }
}

impl From<bcrypt::BcryptError> for DomainError {
    fn from(err: bcrypt::BcryptError) -> Self {
        DomainError::Internal(format!("Password hashing error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::DomainError;

    #[test]
    fn should_display_bare_message_for_user_facing_kinds() {
        let err = DomainError::authentication("Invalid email or password.");
        assert_eq!(err.to_string(), "Invalid email or password.");
    }

    #[test]
    fn should_prefix_internal_errors() {
        let err = DomainError::internal("store unavailable");
        assert_eq!(err.to_string(), "Internal server error: store unavailable");
    }
}
