//! Sampling parameters sent with a generation request

use crate::core::error::DomainError;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

pub const TEMPERATURE_RANGE: (f64, f64) = (0.0, 2.0);
pub const TOP_P_RANGE: (f64, f64) = (0.0, 1.0);
pub const PENALTY_RANGE: (f64, f64) = (-2.0, 2.0);
pub const MAX_TOKENS_LIMIT: u32 = 32_768;

/// Model plus sampling settings for one experiment (Value Object)
///
/// Every field corresponds to one control in the parameter panel.
/// Values are not clamped on assignment; call [`validate`](Self::validate)
/// before sending them anywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub model: Model,
    pub temperature: f64,
    pub top_p: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    pub max_tokens: u32,
    #[serde(default)]
    pub frequency_penalty: f64,
    #[serde(default)]
    pub presence_penalty: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            model: Model::default(),
            temperature: 0.7,
            top_p: 0.9,
            top_k: None,
            max_tokens: 512,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            seed: None,
        }
    }
}

impl GenerationParameters {
    pub fn with_model(mut self, model: impl Into<Model>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_frequency_penalty(mut self, penalty: f64) -> Self {
        self.frequency_penalty = penalty;
        self
    }

    pub fn with_presence_penalty(mut self, penalty: f64) -> Self {
        self.presence_penalty = penalty;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every field against its allowed range.
    ///
    /// Returns the first violation found, in field declaration order.
    pub fn validate(&self) -> Result<(), DomainError> {
        check_range("temperature", self.temperature, TEMPERATURE_RANGE)?;
        check_range("top_p", self.top_p, TOP_P_RANGE)?;

        if let Some(top_k) = self.top_k {
            if top_k == 0 {
                return Err(DomainError::out_of_range("top_k", top_k, "1.."));
            }
        }

        if self.max_tokens == 0 || self.max_tokens > MAX_TOKENS_LIMIT {
            return Err(DomainError::out_of_range(
                "max_tokens",
                self.max_tokens,
                &format!("1..={}", MAX_TOKENS_LIMIT),
            ));
        }

        check_range("frequency_penalty", self.frequency_penalty, PENALTY_RANGE)?;
        check_range("presence_penalty", self.presence_penalty, PENALTY_RANGE)?;
        Ok(())
    }
}

fn check_range(name: &'static str, value: f64, (lo, hi): (f64, f64)) -> Result<(), DomainError> {
    // NaN fails both comparisons, so test for containment rather than exclusion
    if value >= lo && value <= hi {
        Ok(())
    } else {
        Err(DomainError::out_of_range(
            name,
            value,
            &format!("{:.1}..={:.1}", lo, hi),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(GenerationParameters::default().validate().is_ok());
    }

    #[test]
    fn test_temperature_out_of_range() {
        let params = GenerationParameters::default().with_temperature(2.5);
        let err = params.validate().unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidParameter {
                name: "temperature",
                ..
            }
        ));
    }

    #[test]
    fn test_nan_is_rejected() {
        let params = GenerationParameters::default().with_top_p(f64::NAN);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let params = GenerationParameters::default().with_top_k(0);
        assert!(params.validate().is_err());
        assert!(
            GenerationParameters::default()
                .with_top_k(40)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_max_tokens_bounds() {
        assert!(
            GenerationParameters::default()
                .with_max_tokens(0)
                .validate()
                .is_err()
        );
        assert!(
            GenerationParameters::default()
                .with_max_tokens(MAX_TOKENS_LIMIT + 1)
                .validate()
                .is_err()
        );
        assert!(
            GenerationParameters::default()
                .with_max_tokens(MAX_TOKENS_LIMIT)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_penalty_bounds_inclusive() {
        let params = GenerationParameters::default()
            .with_frequency_penalty(-2.0)
            .with_presence_penalty(2.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_optional_fields_omitted_from_json() {
        let json = serde_json::to_value(GenerationParameters::default()).unwrap();
        assert!(json.get("top_k").is_none());
        assert!(json.get("seed").is_none());
        assert_eq!(json["model"], "gpt-4o-mini");
    }
}
