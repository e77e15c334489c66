//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Experiment name cannot be empty")]
    EmptyName,

    #[error("Prompt cannot be empty")]
    EmptyPrompt,

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}

impl DomainError {
    pub(crate) fn out_of_range(name: &'static str, value: impl std::fmt::Display, range: &str) -> Self {
        DomainError::InvalidParameter {
            name,
            reason: format!("{} is outside {}", value, range),
        }
    }

    /// Check if this error concerns a generation parameter
    pub fn is_parameter_error(&self) -> bool {
        matches!(self, DomainError::InvalidParameter { .. })
    }
}
