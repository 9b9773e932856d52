use thiserror::Error;

/// Failures surfaced by the simulation engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A parameter lies outside its documented domain. Raised before any simulation work.
    #[error("invalid parameter {field}: {message}")]
    InvalidParameter { field: String, message: String },
    /// An internal guarantee was broken; unreachable with validated parameters.
    #[error("engine invariant violated: {0}")]
    InvariantViolation(String),
}

impl EngineError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        EngineError::InvalidParameter {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        EngineError::InvariantViolation(message.into())
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            EngineError::InvalidParameter { field, .. } => Some(field),
            EngineError::InvariantViolation(_) => None,
        }
    }
}
