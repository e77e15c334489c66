//! Resource client port
//!
//! Defines the remote calls the sessions depend on, grouped by resource
//! family. Implementations (HTTP, in-memory) live in the infrastructure layer.

use async_trait::async_trait;
use paramlab_domain::{
    Comparison, Experiment, ExperimentId, ExperimentPatch, ExperimentStats, GenerationOutcome,
    GenerationRequest, MetricsResult, NewExperiment, ResponseId,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A remote call did not succeed.
///
/// This is the only failure kind the sessions recognise. `message` is ready
/// to show to a user; `status` is kept for logging and never branched on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteCallFailure {
    message: String,
    status: Option<u16>,
}

impl RemoteCallFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

/// Wire shape of `experiments.get_all`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentList {
    pub experiments: Vec<Experiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

/// Experiment CRUD
#[async_trait]
pub trait ExperimentsApi: Send + Sync {
    async fn get_all(&self) -> Result<ExperimentList, RemoteCallFailure>;

    async fn get_by_id(&self, id: &ExperimentId) -> Result<Experiment, RemoteCallFailure>;

    async fn create(&self, data: &NewExperiment) -> Result<Experiment, RemoteCallFailure>;

    async fn update(
        &self,
        id: &ExperimentId,
        patch: &ExperimentPatch,
    ) -> Result<Experiment, RemoteCallFailure>;

    async fn delete(&self, id: &ExperimentId) -> Result<(), RemoteCallFailure>;

    async fn stats(&self, id: &ExperimentId) -> Result<ExperimentStats, RemoteCallFailure>;
}

/// Response generation
#[async_trait]
pub trait ResponsesApi: Send + Sync {
    async fn generate(
        &self,
        payload: &GenerationRequest,
    ) -> Result<GenerationOutcome, RemoteCallFailure>;
}

/// Quality scoring
#[async_trait]
pub trait MetricsApi: Send + Sync {
    async fn calculate(&self, response_id: &ResponseId) -> Result<MetricsResult, RemoteCallFailure>;

    async fn calculate_batch(
        &self,
        responses: &[ResponseId],
    ) -> Result<Vec<MetricsResult>, RemoteCallFailure>;

    async fn compare(&self, response_ids: &[ResponseId]) -> Result<Comparison, RemoteCallFailure>;
}

/// Everything the sessions need from the remote service.
///
/// Implemented automatically for any type providing all three groups.
pub trait ResourceClient: ExperimentsApi + ResponsesApi + MetricsApi {}

impl<T> ResourceClient for T where T: ExperimentsApi + ResponsesApi + MetricsApi {}
