use thiserror::Error;

/// Raised while translating raw filter input into a [`crate::protocol::FilterRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid integer '{value}' for filter '{attribute}'")]
    InvalidInteger { attribute: String, value: String },
}

impl ValidationError {
    pub fn invalid_integer(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidInteger {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn attribute(&self) -> &str {
        match self {
            ValidationError::InvalidInteger { attribute, .. } => attribute,
        }
    }
}
