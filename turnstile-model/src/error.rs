use std::fmt::{self, Display};

/// Errors produced by model parsing and conversion routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    UnknownSubscriptionType(String),
    UnknownStatusFilter(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::UnknownSubscriptionType(raw) => {
                write!(f, "unknown subscription type: {raw}")
            }
            ModelError::UnknownStatusFilter(raw) => {
                write!(f, "unknown status filter: {raw}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
