//! Named parameter presets offered next to the manual sliders

use super::parameters::GenerationParameters;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A named starting point for [`GenerationParameters`].
///
/// Applying a preset keeps the currently selected model; only the sampling
/// settings are replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterPreset {
    /// High temperature, wide nucleus. Brainstorming and fiction.
    Creative,
    /// General purpose default.
    #[default]
    Balanced,
    /// Low temperature for factual answers.
    Precise,
    /// Greedy decoding with a fixed seed; repeated runs should match.
    Deterministic,
}

impl ParameterPreset {
    pub fn all() -> &'static [ParameterPreset] {
        &[
            ParameterPreset::Creative,
            ParameterPreset::Balanced,
            ParameterPreset::Precise,
            ParameterPreset::Deterministic,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterPreset::Creative => "creative",
            ParameterPreset::Balanced => "balanced",
            ParameterPreset::Precise => "precise",
            ParameterPreset::Deterministic => "deterministic",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ParameterPreset::Creative => "High variety for brainstorming and storytelling",
            ParameterPreset::Balanced => "Sensible defaults for most prompts",
            ParameterPreset::Precise => "Focused, low-variance answers",
            ParameterPreset::Deterministic => "Greedy decoding, reproducible output",
        }
    }

    /// Sampling settings of this preset, applied on top of `base`.
    pub fn apply(&self, base: &GenerationParameters) -> GenerationParameters {
        let params = GenerationParameters {
            model: base.model.clone(),
            top_k: None,
            seed: None,
            ..GenerationParameters::default()
        };

        match self {
            ParameterPreset::Creative => params
                .with_temperature(1.2)
                .with_top_p(0.95)
                .with_max_tokens(1024)
                .with_presence_penalty(0.6),
            ParameterPreset::Balanced => params
                .with_temperature(0.7)
                .with_top_p(0.9)
                .with_max_tokens(512),
            ParameterPreset::Precise => params
                .with_temperature(0.2)
                .with_top_p(0.5)
                .with_max_tokens(512)
                .with_frequency_penalty(0.2),
            ParameterPreset::Deterministic => params
                .with_temperature(0.0)
                .with_top_p(1.0)
                .with_max_tokens(512)
                .with_seed(42),
        }
    }

    pub fn parameters(&self) -> GenerationParameters {
        self.apply(&GenerationParameters::default())
    }
}

impl std::fmt::Display for ParameterPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ParameterPreset {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "creative" => Ok(ParameterPreset::Creative),
            "balanced" | "default" => Ok(ParameterPreset::Balanced),
            "precise" => Ok(ParameterPreset::Precise),
            "deterministic" | "greedy" => Ok(ParameterPreset::Deterministic),
            _ => Err(DomainError::UnknownPreset(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Model;

    #[test]
    fn test_all_presets_are_valid() {
        for preset in ParameterPreset::all() {
            assert!(
                preset.parameters().validate().is_ok(),
                "{} should validate",
                preset
            );
        }
    }

    #[test]
    fn test_apply_keeps_model() {
        let base = GenerationParameters::default()
            .with_model(Model::ClaudeSonnet45)
            .with_top_k(10);
        let params = ParameterPreset::Creative.apply(&base);
        assert_eq!(params.model, Model::ClaudeSonnet45);
        assert_eq!(params.top_k, None);
        assert!(params.temperature > 1.0);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(
            "PRECISE".parse::<ParameterPreset>().unwrap(),
            ParameterPreset::Precise
        );
        assert_eq!(
            " greedy ".parse::<ParameterPreset>().unwrap(),
            ParameterPreset::Deterministic
        );
        assert!(matches!(
            "wild".parse::<ParameterPreset>(),
            Err(DomainError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_deterministic_has_seed() {
        let params = ParameterPreset::Deterministic.parameters();
        assert_eq!(params.temperature, 0.0);
        assert_eq!(params.seed, Some(42));
    }
}
