//! Quality metrics session
//!
//! Scores responses through the remote metrics service. Only the most
//! recent batch result is retained; single scores and comparisons belong to
//! the caller.

use super::core::SessionCore;
use crate::config::BehaviorConfig;
use crate::ports::resource_client::{RemoteCallFailure, ResourceClient};
use paramlab_domain::{Comparison, MetricsResult, Operation, ResponseId, SessionStatus};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Default)]
pub(crate) struct MetricsState {
    metrics: Vec<MetricsResult>,
}

/// Stateful manager for quality metric calls.
///
/// Independent of [`ExperimentSession`](super::ExperimentSession); the two
/// share no status. Every call records failures and also returns them.
#[derive(Clone)]
pub struct QualityMetricsSession {
    core: Arc<SessionCore<MetricsState>>,
    client: Arc<dyn ResourceClient>,
}

impl QualityMetricsSession {
    pub fn new(client: Arc<dyn ResourceClient>, config: &BehaviorConfig) -> Self {
        Self {
            core: SessionCore::new("metrics", MetricsState::default(), config.error_auto_clear),
            client,
        }
    }

    /// Most recent batch result, in server order
    pub fn metrics(&self) -> Vec<MetricsResult> {
        self.core.read(|s| s.metrics.clone())
    }

    pub fn loading(&self) -> bool {
        self.core.loading()
    }

    pub fn error(&self) -> Option<String> {
        self.core.error()
    }

    pub fn status(&self) -> SessionStatus {
        self.core.status()
    }

    pub fn clear_error(&self) {
        self.core.clear_error();
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.core.subscribe()
    }

    pub fn close(&self) {
        self.core.close();
    }

    /// Score one response. The result is not retained.
    pub async fn calculate_metrics(
        &self,
        response_id: &ResponseId,
    ) -> Result<MetricsResult, RemoteCallFailure> {
        let token = self.core.begin(Operation::CalculateMetrics);
        match self.client.calculate(response_id).await {
            Ok(result) => {
                self.core.succeed(token, |_| {});
                Ok(result)
            }
            Err(e) => {
                self.core.fail(token, &e);
                Err(e)
            }
        }
    }

    /// Score a batch and replace the retained metrics with the result.
    pub async fn calculate_batch_metrics(
        &self,
        responses: &[ResponseId],
    ) -> Result<Vec<MetricsResult>, RemoteCallFailure> {
        let token = self.core.begin(Operation::CalculateBatchMetrics);
        match self.client.calculate_batch(responses).await {
            Ok(results) => {
                info!("Scored {} responses", results.len());
                let snapshot = results.clone();
                self.core.succeed(token, |s| s.metrics = results);
                Ok(snapshot)
            }
            Err(e) => {
                self.core.fail(token, &e);
                Err(e)
            }
        }
    }

    pub async fn compare_responses(
        &self,
        response_ids: &[ResponseId],
    ) -> Result<Comparison, RemoteCallFailure> {
        let token = self.core.begin(Operation::CompareResponses);
        match self.client.compare(response_ids).await {
            Ok(comparison) => {
                self.core.succeed(token, |_| {});
                Ok(comparison)
            }
            Err(e) => {
                self.core.fail(token, &e);
                Err(e)
            }
        }
    }
}
