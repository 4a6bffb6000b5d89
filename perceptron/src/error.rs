//! Errors raised while validating input, training and reading a trained model.

use thiserror::Error;

use crate::model::Float;

pub type Result<T> = std::result::Result<T, PerceptronError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PerceptronError {
    /// A training parameter is out of range or the sample set is empty.
    #[error("invalid configuration for '{parameter}': {reason}")]
    InvalidConfiguration {
        parameter: &'static str,
        reason: String,
    },

    #[error("sample {index} has label {label}, expected +1 or -1")]
    InvalidLabel { index: usize, label: i8 },

    #[error("sample {index} has a non-finite feature ({value})")]
    NonFiniteFeature { index: usize, value: Float },

    /// An update step left the model with a NaN or infinite parameter.
    #[error(
        "parameters diverged at epoch {epoch}, sample {sample} (m = {slope}, b = {intercept})"
    )]
    NumericDivergence {
        epoch: usize,
        sample: usize,
        slope: Float,
        intercept: Float,
    },

    #[error("no well-defined decision boundary: slope is zero")]
    DegenerateBoundary,
}

impl PerceptronError {
    pub(crate) fn invalid_config(parameter: &'static str, reason: impl Into<String>) -> Self {
        PerceptronError::InvalidConfiguration {
            parameter,
            reason: reason.into(),
        }
    }
}
