use thiserror::Error;

use crate::dimension::Dimension;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Dimension mismatch for {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        context: String,
        expected: Dimension,
        found: Dimension,
    },

    #[error("Missing required input '{input}' for property '{property}'")]
    MissingInput { property: String, input: String },

    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },
}

impl CoreError {
    pub(crate) fn mismatch(context: impl Into<String>, expected: Dimension, found: Dimension) -> Self {
        CoreError::DimensionMismatch {
            context: context.into(),
            expected,
            found,
        }
    }
}
