pub mod dates;
pub mod payment;

pub use dates::DateRange;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::ValidationError(msg.into())
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        CoreError::NotFound { entity, id }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        CoreError::Conflict(msg.into())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
