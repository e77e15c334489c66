//! Aggregate statistics for an experiment

use super::entities::ExperimentId;
use serde::{Deserialize, Serialize};

/// Summary numbers shown on the experiment card. Non-critical; may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentStats {
    pub experiment_id: ExperimentId,
    pub response_count: usize,
    pub avg_response_length: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_quality_score: Option<f64>,
}
