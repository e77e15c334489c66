//! Model value object representing a generation model

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Models that can be targeted by a generation experiment (Value Object)
///
/// Unknown identifiers are preserved as [`Model::Custom`] so that a server
/// offering models this build does not know about still round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    Gpt4o,
    Gpt4oMini,
    Gpt41,
    ClaudeSonnet45,
    ClaudeHaiku45,
    Llama3_70b,
    MistralLarge,
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gpt4o => "gpt-4o",
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Gpt41 => "gpt-4.1",
            Model::ClaudeSonnet45 => "claude-sonnet-4.5",
            Model::ClaudeHaiku45 => "claude-haiku-4.5",
            Model::Llama3_70b => "llama-3-70b",
            Model::MistralLarge => "mistral-large",
            Model::Custom(s) => s,
        }
    }

    /// Models offered in the parameter workbench model picker
    pub fn known_models() -> Vec<Model> {
        vec![
            Model::Gpt4o,
            Model::Gpt4oMini,
            Model::Gpt41,
            Model::ClaudeSonnet45,
            Model::ClaudeHaiku45,
            Model::Llama3_70b,
            Model::MistralLarge,
        ]
    }

    /// Whether the model accepts a `top_k` sampling parameter
    pub fn supports_top_k(&self) -> bool {
        matches!(
            self,
            Model::ClaudeSonnet45 | Model::ClaudeHaiku45 | Model::Llama3_70b | Model::MistralLarge
        )
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Gpt4oMini
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "gpt-4o" => Model::Gpt4o,
            "gpt-4o-mini" => Model::Gpt4oMini,
            "gpt-4.1" => Model::Gpt41,
            "claude-sonnet-4.5" => Model::ClaudeSonnet45,
            "claude-haiku-4.5" => Model::ClaudeHaiku45,
            "llama-3-70b" => Model::Llama3_70b,
            "mistral-large" => Model::MistralLarge,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(model) => model,
            Err(never) => match never {},
        }
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Model::from(s.as_str()))
    }
}
