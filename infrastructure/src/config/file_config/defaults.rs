//! Generation defaults from TOML (`[defaults]` section)

use paramlab_domain::{
    ConfigIssue, ConfigIssueCode, GenerationParameters, Model, ParameterPreset, Severity,
};
use serde::{Deserialize, Serialize};

/// Raw generation defaults from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDefaultsConfig {
    /// Preset applied to new experiments
    pub preset: String,
    /// Model override; the preset's default model when unset
    pub model: Option<String>,
}

impl Default for FileDefaultsConfig {
    fn default() -> Self {
        Self {
            preset: ParameterPreset::default().as_str().to_string(),
            model: None,
        }
    }
}

impl FileDefaultsConfig {
    /// Parse the configured preset, falling back to the default one.
    pub fn parse_preset(&self) -> (ParameterPreset, Option<ConfigIssue>) {
        match self.preset.parse::<ParameterPreset>() {
            Ok(preset) => (preset, None),
            Err(_) => {
                let fallback = ParameterPreset::default();
                let issue = ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::InvalidEnumValue {
                        field: "defaults.preset".to_string(),
                        value: self.preset.clone(),
                        valid_values: ParameterPreset::all()
                            .iter()
                            .map(|p| p.as_str().to_string())
                            .collect(),
                    },
                    message: format!(
                        "defaults.preset: unknown value '{}', falling back to '{}'",
                        self.preset, fallback
                    ),
                };
                (fallback, Some(issue))
            }
        }
    }

    /// Parse the model override. Blank names count as unset.
    pub fn parse_model(&self) -> Option<Model> {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Model::from)
    }

    /// Starting parameters for new experiments.
    pub fn parameters(&self) -> GenerationParameters {
        let params = self.parse_preset().0.parameters();
        match self.parse_model() {
            Some(model) => params.with_model(model),
            None => params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_balanced() {
        let config = FileDefaultsConfig::default();
        let (preset, issue) = config.parse_preset();
        assert_eq!(preset, ParameterPreset::Balanced);
        assert!(issue.is_none());
        assert_eq!(config.parameters(), ParameterPreset::Balanced.parameters());
    }

    #[test]
    fn test_unknown_preset_falls_back() {
        let config = FileDefaultsConfig {
            preset: "wild".to_string(),
            model: None,
        };
        let (preset, issue) = config.parse_preset();
        assert_eq!(preset, ParameterPreset::Balanced);
        assert!(matches!(
            issue.map(|i| i.code),
            Some(ConfigIssueCode::InvalidEnumValue { ref field, .. }) if field == "defaults.preset"
        ));
    }

    #[test]
    fn test_model_override() {
        let config = FileDefaultsConfig {
            preset: "precise".to_string(),
            model: Some("gpt-4o".to_string()),
        };
        let params = config.parameters();
        assert_eq!(params.model, Model::Gpt4o);
        assert_eq!(
            params.temperature,
            ParameterPreset::Precise.parameters().temperature
        );
    }

    #[test]
    fn test_blank_model_is_ignored() {
        let config = FileDefaultsConfig {
            model: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(config.parse_model().is_none());
    }
}
