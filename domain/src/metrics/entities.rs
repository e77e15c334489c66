//! Quality metric results returned by the scoring service

use crate::generation::request::ResponseId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scores computed for a single response.
///
/// Metric names are server-defined; the ones the local scorer emits are
/// listed in [`metric_names`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    pub response_id: ResponseId,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
    pub overall_score: f64,
}

impl MetricsResult {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

/// Metric names produced by the bundled scorer
pub mod metric_names {
    pub const LENGTH: &str = "length";
    pub const LEXICAL_DIVERSITY: &str = "lexical_diversity";
    pub const REPETITION: &str = "repetition";
    pub const AVG_SENTENCE_LENGTH: &str = "avg_sentence_length";
    pub const PROMPT_OVERLAP: &str = "prompt_overlap";
}

/// One entry of a comparison ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResponse {
    pub response_id: ResponseId,
    pub score: f64,
}

/// Side-by-side comparison of several responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub response_ids: Vec<ResponseId>,
    #[serde(default)]
    pub rankings: Vec<RankedResponse>,
    #[serde(default)]
    pub best_response_id: Option<ResponseId>,
    #[serde(default)]
    pub summary: String,
}

impl Comparison {
    /// Build a comparison from per-response scores, best first.
    pub fn from_scores(results: &[MetricsResult]) -> Self {
        let mut rankings: Vec<RankedResponse> = results
            .iter()
            .map(|r| RankedResponse {
                response_id: r.response_id.clone(),
                score: r.overall_score,
            })
            .collect();
        rankings.sort_by(|a, b| b.score.total_cmp(&a.score));

        let best_response_id = rankings.first().map(|r| r.response_id.clone());
        let summary = match (rankings.first(), rankings.last()) {
            (Some(best), Some(worst)) if rankings.len() > 1 => format!(
                "{} scored highest ({:.2}); spread {:.2}",
                best.response_id,
                best.score,
                best.score - worst.score
            ),
            (Some(only), _) => format!("{} scored {:.2}", only.response_id, only.score),
            _ => "No responses to compare".to_string(),
        };

        Self {
            response_ids: results.iter().map(|r| r.response_id.clone()).collect(),
            rankings,
            best_response_id,
            summary,
        }
    }
}
