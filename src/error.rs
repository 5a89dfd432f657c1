//! Error types shared by every stage of the analysis.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Failures raised by the table model, the preprocessor, the reducer and the
/// density estimator. Every error aborts the running pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Referenced column(s) absent, or a column of the wrong kind.
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    /// An operation that needs a fitted model ran before the fit.
    #[error("Not fitted: {0}")]
    NotFitted(String),

    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("Non-finite value in column '{column}' at row {row}")]
    NonFiniteValue { column: String, row: usize },

    #[error("Linear algebra error: {0}")]
    Linalg(String),
}

impl AnalysisError {
    pub(crate) fn invalid_parameter(
        name: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        AnalysisError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn dimension_mismatch(
        context: impl Into<String>,
        expected: usize,
        actual: usize,
    ) -> Self {
        AnalysisError::DimensionMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }
}
