//! Generation request payloads and server-returned responses

use super::parameters::GenerationParameters;
use crate::core::error::DomainError;
use crate::experiment::entities::ExperimentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_RESPONSES_PER_REQUEST: u32 = 10;

/// Identifier of one generated response, assigned by the server
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseId(String);

impl ResponseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResponseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResponseId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// How many responses to generate, optionally with a one-off parameter override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub num_responses: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<GenerationParameters>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            num_responses: 1,
            parameters: None,
        }
    }
}

impl GenerationConfig {
    pub fn new(num_responses: u32) -> Self {
        Self {
            num_responses,
            parameters: None,
        }
    }

    pub fn with_parameters(mut self, parameters: GenerationParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.num_responses == 0 || self.num_responses > MAX_RESPONSES_PER_REQUEST {
            return Err(DomainError::out_of_range(
                "num_responses",
                self.num_responses,
                &format!("1..={}", MAX_RESPONSES_PER_REQUEST),
            ));
        }
        match &self.parameters {
            Some(params) => params.validate(),
            None => Ok(()),
        }
    }
}

/// Payload for `responses.generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub experiment_id: ExperimentId,
    #[serde(flatten)]
    pub config: GenerationConfig,
}

impl GenerationRequest {
    pub fn new(experiment_id: ExperimentId, config: GenerationConfig) -> Self {
        Self {
            experiment_id,
            config,
        }
    }
}

/// One generated text attached to an experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedResponse {
    pub id: ResponseId,
    pub experiment_id: ExperimentId,
    pub text: String,
    #[serde(default)]
    pub parameters: Option<GenerationParameters>,
    #[serde(default)]
    pub token_count: Option<u32>,
    #[serde(default)]
    pub latency_ms: Option<u64>,
    pub created_at: DateTime<Utc>,
}

/// Result of a `responses.generate` call.
///
/// The core only uses it to decide whether to reload the owning experiment;
/// callers may inspect the generated texts directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub experiment_id: ExperimentId,
    #[serde(default)]
    pub responses: Vec<GeneratedResponse>,
}
