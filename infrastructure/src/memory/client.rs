//! In-memory backend
//!
//! Keeps experiments and responses in process and answers every resource
//! call the HTTP service would. Used by `--offline` and by tests that want
//! a consistent backing store instead of a scripted mock.

use super::scoring::{generate_text, score_text, words};
use async_trait::async_trait;
use chrono::Utc;
use paramlab_application::{
    ExperimentList, ExperimentsApi, MetricsApi, RemoteCallFailure, ResponsesApi,
};
use paramlab_domain::{
    Comparison, Experiment, ExperimentId, ExperimentPatch, ExperimentStats, GeneratedResponse,
    GenerationOutcome, GenerationRequest, MetricsResult, NewExperiment, ResponseId,
};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct MemoryState {
    experiments: Vec<Experiment>,
    next_experiment: u64,
    next_response: u64,
}

impl MemoryState {
    fn experiment(&self, id: &ExperimentId) -> Result<&Experiment, RemoteCallFailure> {
        self.experiments
            .iter()
            .find(|e| &e.id == id)
            .ok_or_else(|| not_found("Experiment", id))
    }

    fn experiment_mut(&mut self, id: &ExperimentId) -> Result<&mut Experiment, RemoteCallFailure> {
        self.experiments
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| not_found("Experiment", id))
    }

    fn score(&self, response_id: &ResponseId) -> Result<MetricsResult, RemoteCallFailure> {
        self.experiments
            .iter()
            .find_map(|e| {
                e.responses
                    .iter()
                    .find(|r| &r.id == response_id)
                    .map(|r| score_text(&r.id, &e.prompt, &r.text))
            })
            .ok_or_else(|| not_found("Response", response_id))
    }
}

fn not_found(kind: &str, id: impl std::fmt::Display) -> RemoteCallFailure {
    RemoteCallFailure::with_status(format!("{} {} not found", kind, id), 404)
}

fn unprocessable(message: impl Into<String>) -> RemoteCallFailure {
    RemoteCallFailure::with_status(message, 422)
}

/// [`ResourceClient`](paramlab_application::ResourceClient) keeping
/// everything in memory.
#[derive(Debug, Default)]
pub struct InMemoryResourceClient {
    state: Mutex<MemoryState>,
    scripted_failures: Mutex<VecDeque<String>>,
    latency: Option<Duration>,
}

impl InMemoryResourceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next call fail with `message`. Calls queue up in order.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.scripted_failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(message.into());
    }

    /// Number of stored experiments
    pub fn experiment_count(&self) -> usize {
        self.lock().experiments.len()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply latency, then any scripted failure.
    async fn enter(&self, call: &str) -> Result<(), RemoteCallFailure> {
        trace!("in-memory call: {}", call);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let scripted = self
            .scripted_failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match scripted {
            Some(message) => {
                debug!("in-memory call {} failing as scripted", call);
                Err(RemoteCallFailure::with_status(message, 500))
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ExperimentsApi for InMemoryResourceClient {
    async fn get_all(&self) -> Result<ExperimentList, RemoteCallFailure> {
        self.enter("experiments.get_all").await?;
        let experiments = self.lock().experiments.clone();
        Ok(ExperimentList {
            total: Some(experiments.len()),
            experiments,
        })
    }

    async fn get_by_id(&self, id: &ExperimentId) -> Result<Experiment, RemoteCallFailure> {
        self.enter("experiments.get_by_id").await?;
        self.lock().experiment(id).cloned()
    }

    async fn create(&self, data: &NewExperiment) -> Result<Experiment, RemoteCallFailure> {
        self.enter("experiments.create").await?;
        data.validate().map_err(|e| unprocessable(e.to_string()))?;

        let mut state = self.lock();
        state.next_experiment += 1;
        let experiment = Experiment {
            id: ExperimentId::new(format!("exp-{:04}", state.next_experiment)),
            name: data.name.trim().to_string(),
            prompt: data.prompt.clone(),
            model: data.parameters.model.clone(),
            parameters: data.parameters.clone(),
            description: data.description.clone(),
            responses: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
        };
        state.experiments.push(experiment.clone());
        Ok(experiment)
    }

    async fn update(
        &self,
        id: &ExperimentId,
        patch: &ExperimentPatch,
    ) -> Result<Experiment, RemoteCallFailure> {
        self.enter("experiments.update").await?;
        if let Some(params) = &patch.parameters {
            params.validate().map_err(|e| unprocessable(e.to_string()))?;
        }

        let mut state = self.lock();
        let experiment = state.experiment_mut(id)?;
        patch.apply_to(experiment);
        experiment.updated_at = Some(Utc::now());
        Ok(experiment.clone())
    }

    async fn delete(&self, id: &ExperimentId) -> Result<(), RemoteCallFailure> {
        self.enter("experiments.delete").await?;
        let mut state = self.lock();
        let before = state.experiments.len();
        state.experiments.retain(|e| &e.id != id);
        if state.experiments.len() == before {
            return Err(not_found("Experiment", id));
        }
        Ok(())
    }

    async fn stats(&self, id: &ExperimentId) -> Result<ExperimentStats, RemoteCallFailure> {
        self.enter("experiments.stats").await?;
        let state = self.lock();
        let experiment = state.experiment(id)?;

        let count = experiment.responses.len();
        let avg_response_length = if count == 0 {
            0.0
        } else {
            experiment
                .responses
                .iter()
                .map(|r| r.text.chars().count() as f64)
                .sum::<f64>()
                / count as f64
        };
        let avg_quality_score = (count > 0).then(|| {
            experiment
                .responses
                .iter()
                .map(|r| score_text(&r.id, &experiment.prompt, &r.text).overall_score)
                .sum::<f64>()
                / count as f64
        });

        Ok(ExperimentStats {
            experiment_id: id.clone(),
            response_count: count,
            avg_response_length,
            avg_quality_score,
        })
    }
}

#[async_trait]
impl ResponsesApi for InMemoryResourceClient {
    async fn generate(
        &self,
        payload: &GenerationRequest,
    ) -> Result<GenerationOutcome, RemoteCallFailure> {
        self.enter("responses.generate").await?;
        payload
            .config
            .validate()
            .map_err(|e| unprocessable(e.to_string()))?;

        let mut state = self.lock();
        let first_response = state.next_response;
        let experiment = state.experiment_mut(&payload.experiment_id)?;
        let params = payload
            .config
            .parameters
            .clone()
            .unwrap_or_else(|| experiment.parameters.clone());

        let responses: Vec<GeneratedResponse> = (0..payload.config.num_responses)
            .map(|i| {
                let text = generate_text(&experiment.prompt, &params, i);
                let token_count = words(&text).len() as u32;
                GeneratedResponse {
                    id: ResponseId::new(format!("resp-{:05}", first_response + u64::from(i) + 1)),
                    experiment_id: experiment.id.clone(),
                    token_count: Some(token_count),
                    latency_ms: Some(u64::from(token_count) * 4),
                    text,
                    parameters: Some(params.clone()),
                    created_at: Utc::now(),
                }
            })
            .collect();

        experiment.responses.extend(responses.iter().cloned());
        let experiment_id = experiment.id.clone();
        state.next_response += u64::from(payload.config.num_responses);

        Ok(GenerationOutcome {
            experiment_id,
            responses,
        })
    }
}

#[async_trait]
impl MetricsApi for InMemoryResourceClient {
    async fn calculate(&self, response_id: &ResponseId) -> Result<MetricsResult, RemoteCallFailure> {
        self.enter("metrics.calculate").await?;
        self.lock().score(response_id)
    }

    async fn calculate_batch(
        &self,
        responses: &[ResponseId],
    ) -> Result<Vec<MetricsResult>, RemoteCallFailure> {
        self.enter("metrics.calculate_batch").await?;
        let state = self.lock();
        responses.iter().map(|id| state.score(id)).collect()
    }

    async fn compare(&self, response_ids: &[ResponseId]) -> Result<Comparison, RemoteCallFailure> {
        self.enter("metrics.compare").await?;
        if response_ids.len() < 2 {
            return Err(RemoteCallFailure::with_status(
                "At least two responses are required for comparison",
                400,
            ));
        }
        let state = self.lock();
        let scores = response_ids
            .iter()
            .map(|id| state.score(id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Comparison::from_scores(&scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramlab_domain::{GenerationConfig, ParameterPreset};

    async fn seeded(client: &InMemoryResourceClient) -> Experiment {
        client
            .create(&NewExperiment::new("Tides", "Explain ocean tides to a child"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let client = InMemoryResourceClient::new();
        let created = seeded(&client).await;
        assert_eq!(created.id, ExperimentId::new("exp-0001"));

        let fetched = client.get_by_id(&created.id).await.unwrap();
        assert_eq!(fetched, created);

        let list = client.get_all().await.unwrap();
        assert_eq!(list.total, Some(1));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let client = InMemoryResourceClient::new();
        let err = client
            .create(&NewExperiment::new(" ", "prompt"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert_eq!(client.experiment_count(), 0);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let client = InMemoryResourceClient::new();
        let created = seeded(&client).await;

        let updated = client
            .update(&created.id, &ExperimentPatch::name("Tides v2"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Tides v2");
        assert!(updated.updated_at.is_some());

        client.delete(&created.id).await.unwrap();
        let err = client.delete(&created.id).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_generate_attaches_responses() {
        let client = InMemoryResourceClient::new();
        let created = seeded(&client).await;

        let outcome = client
            .generate(&GenerationRequest::new(
                created.id.clone(),
                GenerationConfig::new(3),
            ))
            .await
            .unwrap();
        assert_eq!(outcome.responses.len(), 3);
        assert!(outcome.responses.iter().all(|r| !r.text.is_empty()));

        let reloaded = client.get_by_id(&created.id).await.unwrap();
        assert_eq!(reloaded.response_ids(), outcome.responses.iter().map(|r| r.id.clone()).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_generate_uses_override_parameters() {
        let client = InMemoryResourceClient::new();
        let created = seeded(&client).await;
        let precise = ParameterPreset::Precise.parameters();

        let outcome = client
            .generate(&GenerationRequest::new(
                created.id,
                GenerationConfig::new(1).with_parameters(precise.clone()),
            ))
            .await
            .unwrap();
        assert_eq!(outcome.responses[0].parameters, Some(precise));
    }

    #[tokio::test]
    async fn test_generate_rejects_too_many() {
        let client = InMemoryResourceClient::new();
        let created = seeded(&client).await;
        let err = client
            .generate(&GenerationRequest::new(created.id, GenerationConfig::new(50)))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(422));
    }

    #[tokio::test]
    async fn test_metrics_and_stats() {
        let client = InMemoryResourceClient::new();
        let created = seeded(&client).await;
        let outcome = client
            .generate(&GenerationRequest::new(
                created.id.clone(),
                GenerationConfig::new(2),
            ))
            .await
            .unwrap();
        let ids: Vec<_> = outcome.responses.iter().map(|r| r.id.clone()).collect();

        let batch = client.calculate_batch(&ids).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(|m| (0.0..=1.0).contains(&m.overall_score)));

        let comparison = client.compare(&ids).await.unwrap();
        assert!(comparison.best_response_id.is_some());

        let stats = client.stats(&created.id).await.unwrap();
        assert_eq!(stats.response_count, 2);
        assert!(stats.avg_response_length > 0.0);
        assert!(stats.avg_quality_score.is_some());
    }

    #[tokio::test]
    async fn test_compare_needs_two() {
        let client = InMemoryResourceClient::new();
        let err = client.compare(&[ResponseId::new("x")]).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn test_unknown_response_is_not_found() {
        let client = InMemoryResourceClient::new();
        let err = client.calculate(&ResponseId::new("ghost")).await.unwrap_err();
        assert_eq!(err.message(), "Response ghost not found");
    }

    #[tokio::test]
    async fn test_scripted_failures_in_order() {
        let client = InMemoryResourceClient::new();
        client.fail_next("first");
        client.fail_next("second");

        assert_eq!(client.get_all().await.unwrap_err().message(), "first");
        assert_eq!(client.get_all().await.unwrap_err().message(), "second");
        assert!(client.get_all().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_delays_calls() {
        let client = InMemoryResourceClient::new().with_latency(Duration::from_millis(250));
        let start = tokio::time::Instant::now();
        client.get_all().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(250));
    }
}
