//! Experiment entities

use crate::core::error::DomainError;
use crate::core::model::Model;
use crate::generation::parameters::GenerationParameters;
use crate::generation::request::GeneratedResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned experiment identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperimentId(String);

impl ExperimentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExperimentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ExperimentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A prompt plus parameter configuration and the responses generated for it (Entity)
///
/// Identity is the `id`; two experiments with the same id are the same
/// experiment even if their contents differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub id: ExperimentId,
    pub name: String,
    pub prompt: String,
    pub parameters: GenerationParameters,
    pub model: Model,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub responses: Vec<GeneratedResponse>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Experiment {
    pub fn response_ids(&self) -> Vec<crate::generation::request::ResponseId> {
        self.responses.iter().map(|r| r.id.clone()).collect()
    }

    pub fn has_responses(&self) -> bool {
        !self.responses.is_empty()
    }
}

/// Payload for `experiments.create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExperiment {
    pub name: String,
    pub prompt: String,
    pub parameters: GenerationParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewExperiment {
    pub fn new(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            parameters: GenerationParameters::default(),
            description: None,
        }
    }

    pub fn with_parameters(mut self, parameters: GenerationParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::EmptyName);
        }
        if self.prompt.trim().is_empty() {
            return Err(DomainError::EmptyPrompt);
        }
        self.parameters.validate()
    }
}

/// Partial update for `experiments.update`. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<GenerationParameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExperimentPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_parameters(mut self, parameters: GenerationParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.prompt.is_none()
            && self.parameters.is_none()
            && self.description.is_none()
    }

    /// Apply the patch to an experiment, keeping `model` in sync with `parameters`.
    pub fn apply_to(&self, experiment: &mut Experiment) {
        if let Some(name) = &self.name {
            experiment.name = name.clone();
        }
        if let Some(prompt) = &self.prompt {
            experiment.prompt = prompt.clone();
        }
        if let Some(parameters) = &self.parameters {
            experiment.model = parameters.model.clone();
            experiment.parameters = parameters.clone();
        }
        if let Some(description) = &self.description {
            experiment.description = Some(description.clone());
        }
    }
}
