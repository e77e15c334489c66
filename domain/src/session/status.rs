//! Status of a stateful resource session

use std::fmt;

/// Operations a session can have in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    LoadExperiments,
    LoadExperiment,
    CreateExperiment,
    UpdateExperiment,
    DeleteExperiment,
    GenerateResponses,
    ExperimentStats,
    CalculateMetrics,
    CalculateBatchMetrics,
    CompareResponses,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::LoadExperiments => "load_experiments",
            Operation::LoadExperiment => "load_experiment",
            Operation::CreateExperiment => "create_experiment",
            Operation::UpdateExperiment => "update_experiment",
            Operation::DeleteExperiment => "delete_experiment",
            Operation::GenerateResponses => "generate_responses",
            Operation::ExperimentStats => "experiment_stats",
            Operation::CalculateMetrics => "calculate_metrics",
            Operation::CalculateBatchMetrics => "calculate_batch_metrics",
            Operation::CompareResponses => "compare_responses",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-session request token, strictly increasing in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

/// What a session is doing right now, as shown by the view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Pending(Operation),
    Failed(Operation, String),
}

impl SessionStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionStatus::Pending(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SessionStatus::Failed(_, message) => Some(message),
            _ => None,
        }
    }
}
