//! Validation error types

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationErrorKind {
    Required,
    TooLong { max: usize },
    InvalidFormat,
    ReservedPrefix { prefix: String },
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationErrorKind::Required => write!(f, "is required"),
            ValidationErrorKind::TooLong { max } => write!(f, "must be at most {} characters", max),
            ValidationErrorKind::InvalidFormat => write!(f, "has an invalid format"),
            ValidationErrorKind::ReservedPrefix { prefix } => {
                write!(f, "must not start with reserved prefix {:?}", prefix)
            }
        }
    }
}

/// One failed rule, located by form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{location} {kind}")]
pub struct ValidationError {
    pub location: String,
    #[serde(flatten)]
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(location: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            location: location.into(),
            kind,
        }
    }
}
