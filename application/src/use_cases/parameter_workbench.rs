//! Parameter workbench use case.
//!
//! Ties the notification store and both resource sessions together into the
//! flows the dashboard offers: tune parameters, run an experiment end to
//! end, analyze an existing one and compare responses. Every failure is
//! surfaced to the user as a notification and also returned to the caller.

use crate::config::BehaviorConfig;
use crate::notifications::NotificationStore;
use crate::ports::resource_client::{RemoteCallFailure, ResourceClient};
use crate::session::{ExperimentSession, QualityMetricsSession};
use paramlab_domain::{
    Comparison, DomainError, Experiment, ExperimentId, GeneratedResponse, GenerationConfig,
    GenerationParameters, MetricsResult, NewExperiment, NotificationOptions, ParameterPreset,
    ResponseId,
};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during workbench flows.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkbenchError {
    #[error("Invalid input: {0}")]
    Validation(#[from] DomainError),

    #[error("{0}")]
    Remote(#[from] RemoteCallFailure),

    #[error("Experiment {0} could not be loaded")]
    NoExperiment(ExperimentId),

    #[error("Experiment {0} has no responses to analyze")]
    NoResponses(ExperimentId),
}

/// Result of a full [`ParameterWorkbench::run`].
#[derive(Debug, Clone)]
pub struct WorkbenchRun {
    /// The experiment as reloaded after generation
    pub experiment: Experiment,
    /// Responses produced by this run
    pub responses: Vec<GeneratedResponse>,
    /// Scores for every response on the experiment
    pub metrics: Vec<MetricsResult>,
}

/// Orchestrates notifications and the two resource sessions.
///
/// Holds the parameter set the next experiment will be created with.
/// Sessions and store are shared handles, so views built on top of the
/// workbench observe the same state.
pub struct ParameterWorkbench {
    notifications: NotificationStore,
    experiments: ExperimentSession,
    metrics: QualityMetricsSession,
    parameters: Mutex<GenerationParameters>,
}

impl ParameterWorkbench {
    pub fn new(
        client: Arc<dyn ResourceClient>,
        notifications: NotificationStore,
        config: &BehaviorConfig,
    ) -> Self {
        Self::from_parts(
            notifications,
            ExperimentSession::new(client.clone(), config),
            QualityMetricsSession::new(client, config),
        )
    }

    /// Assemble from existing sessions.
    pub fn from_parts(
        notifications: NotificationStore,
        experiments: ExperimentSession,
        metrics: QualityMetricsSession,
    ) -> Self {
        Self {
            notifications,
            experiments,
            metrics,
            parameters: Mutex::new(GenerationParameters::default()),
        }
    }

    pub fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    pub fn experiments(&self) -> &ExperimentSession {
        &self.experiments
    }

    pub fn metrics(&self) -> &QualityMetricsSession {
        &self.metrics
    }

    /// Parameters the next experiment will use
    pub fn parameters(&self) -> GenerationParameters {
        self.parameters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ==================== Configure ====================

    /// Apply a preset by name, keeping the current model.
    pub fn apply_preset(&self, name: &str) -> Result<GenerationParameters, WorkbenchError> {
        let preset: ParameterPreset = name.parse().map_err(|e| self.reject(e))?;
        let mut current = self.parameters.lock().unwrap_or_else(PoisonError::into_inner);
        *current = preset.apply(&current);
        debug!("Applied preset {}", preset);
        Ok(current.clone())
    }

    /// Replace the parameter set. Invalid sets are rejected and the current
    /// one is kept.
    pub fn set_parameters(&self, parameters: GenerationParameters) -> Result<(), WorkbenchError> {
        parameters.validate().map_err(|e| self.reject(e))?;
        *self.parameters.lock().unwrap_or_else(PoisonError::into_inner) = parameters;
        Ok(())
    }

    // ==================== Flows ====================

    /// Create an experiment with the current parameters, generate
    /// responses for it and score them.
    pub async fn run(
        &self,
        name: &str,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<WorkbenchRun, WorkbenchError> {
        let draft = NewExperiment::new(name, prompt).with_parameters(self.parameters());
        draft.validate().map_err(|e| self.reject(e))?;
        config.validate().map_err(|e| self.reject(e))?;

        let created = self
            .experiments
            .create_experiment(&draft)
            .await
            .map_err(|e| self.remote_error("Failed to create experiment", e))?;
        self.notifications.success(
            format!("Experiment \"{}\" created", created.name),
            NotificationOptions::default(),
        );
        self.experiments.select(&created.id);

        let outcome = self
            .experiments
            .generate_responses(&created.id, config)
            .await
            .map_err(|e| self.remote_error("Failed to generate responses", e))?;
        info!(
            "Run for experiment {} produced {} responses",
            created.id,
            outcome.responses.len()
        );

        // generation reloads the selection; fall back to what we know
        let experiment = self
            .experiments
            .experiment(&created.id)
            .filter(|e| e.has_responses())
            .unwrap_or_else(|| {
                let mut fallback = created.clone();
                fallback.responses = outcome.responses.clone();
                fallback
            });

        let metrics = self.score(&experiment).await?;
        self.notifications.success(
            format!(
                "Generated and scored {} responses",
                outcome.responses.len()
            ),
            NotificationOptions::titled(experiment.name.clone()),
        );

        Ok(WorkbenchRun {
            experiment,
            responses: outcome.responses,
            metrics,
        })
    }

    /// Score every response of an existing experiment.
    pub async fn analyze(
        &self,
        experiment_id: &ExperimentId,
    ) -> Result<Vec<MetricsResult>, WorkbenchError> {
        let Some(experiment) = self.experiments.load_experiment(experiment_id).await else {
            let reason = self
                .experiments
                .error()
                .unwrap_or_else(|| "request was cancelled".to_string());
            self.notifications.error(
                format!("Could not load experiment: {}", reason),
                NotificationOptions::default(),
            );
            return Err(WorkbenchError::NoExperiment(experiment_id.clone()));
        };

        if !experiment.has_responses() {
            self.notifications.warning(
                format!("\"{}\" has no responses yet", experiment.name),
                NotificationOptions::default(),
            );
            return Err(WorkbenchError::NoResponses(experiment_id.clone()));
        }

        self.score(&experiment).await
    }

    /// Compare responses and announce the best one.
    pub async fn compare(&self, response_ids: &[ResponseId]) -> Result<Comparison, WorkbenchError> {
        let comparison = self
            .metrics
            .compare_responses(response_ids)
            .await
            .map_err(|e| self.remote_error("Comparison failed", e))?;

        let message = match &comparison.best_response_id {
            Some(best) => format!("Best response: {}", best),
            None => "No response stood out".to_string(),
        };
        self.notifications
            .info(message, NotificationOptions::titled("Comparison"));
        Ok(comparison)
    }

    // ==================== Helpers ====================

    async fn score(&self, experiment: &Experiment) -> Result<Vec<MetricsResult>, WorkbenchError> {
        self.metrics
            .calculate_batch_metrics(&experiment.response_ids())
            .await
            .map_err(|e| self.remote_error("Failed to calculate metrics", e))
    }

    fn reject(&self, error: DomainError) -> WorkbenchError {
        warn!("Rejected input: {}", error);
        self.notifications
            .warning(error.to_string(), NotificationOptions::default());
        WorkbenchError::Validation(error)
    }

    fn remote_error(&self, context: &str, failure: RemoteCallFailure) -> WorkbenchError {
        self.notifications.error(
            format!("{}: {}", context, failure.message()),
            NotificationOptions::default(),
        );
        WorkbenchError::Remote(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::resource_client::{ExperimentList, ExperimentsApi, MetricsApi, ResponsesApi};
    use async_trait::async_trait;
    use chrono::Utc;
    use paramlab_domain::{
        ExperimentPatch, ExperimentStats, GenerationOutcome, GenerationRequest, NotificationKind,
    };
    use std::collections::BTreeMap;

    /// Backend keeping experiments in memory, with one scripted failure.
    #[derive(Default)]
    struct FakeBackend {
        experiments: Mutex<Vec<Experiment>>,
        next_id: Mutex<u32>,
        fail_on: Mutex<Option<(&'static str, String)>>,
    }

    impl FakeBackend {
        fn failing_on(call: &'static str, message: &str) -> Self {
            let backend = Self::default();
            *backend.fail_on.lock().unwrap() = Some((call, message.to_string()));
            backend
        }

        fn check(&self, call: &'static str) -> Result<(), RemoteCallFailure> {
            let mut fail_on = self.fail_on.lock().unwrap();
            match fail_on.take() {
                Some((target, message)) if target == call => Err(RemoteCallFailure::new(message)),
                other => {
                    *fail_on = other;
                    Ok(())
                }
            }
        }

        fn find(&self, id: &ExperimentId) -> Result<Experiment, RemoteCallFailure> {
            self.experiments
                .lock()
                .unwrap()
                .iter()
                .find(|e| &e.id == id)
                .cloned()
                .ok_or_else(|| RemoteCallFailure::with_status("Experiment not found", 404))
        }
    }

    #[async_trait]
    impl ExperimentsApi for FakeBackend {
        async fn get_all(&self) -> Result<ExperimentList, RemoteCallFailure> {
            self.check("get_all")?;
            let experiments = self.experiments.lock().unwrap().clone();
            Ok(ExperimentList {
                total: Some(experiments.len()),
                experiments,
            })
        }

        async fn get_by_id(&self, id: &ExperimentId) -> Result<Experiment, RemoteCallFailure> {
            self.check("get_by_id")?;
            self.find(id)
        }

        async fn create(&self, data: &NewExperiment) -> Result<Experiment, RemoteCallFailure> {
            self.check("create")?;
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let experiment = Experiment {
                id: ExperimentId::new(format!("exp-{}", next_id)),
                name: data.name.clone(),
                prompt: data.prompt.clone(),
                model: data.parameters.model.clone(),
                parameters: data.parameters.clone(),
                description: data.description.clone(),
                responses: Vec::new(),
                created_at: Utc::now(),
                updated_at: None,
            };
            self.experiments.lock().unwrap().push(experiment.clone());
            Ok(experiment)
        }

        async fn update(
            &self,
            id: &ExperimentId,
            patch: &ExperimentPatch,
        ) -> Result<Experiment, RemoteCallFailure> {
            self.check("update")?;
            let mut experiment = self.find(id)?;
            patch.apply_to(&mut experiment);
            Ok(experiment)
        }

        async fn delete(&self, id: &ExperimentId) -> Result<(), RemoteCallFailure> {
            self.check("delete")?;
            self.experiments.lock().unwrap().retain(|e| &e.id != id);
            Ok(())
        }

        async fn stats(&self, id: &ExperimentId) -> Result<ExperimentStats, RemoteCallFailure> {
            self.check("stats")?;
            let experiment = self.find(id)?;
            Ok(ExperimentStats {
                experiment_id: id.clone(),
                response_count: experiment.responses.len(),
                avg_response_length: 0.0,
                avg_quality_score: None,
            })
        }
    }

    #[async_trait]
    impl ResponsesApi for FakeBackend {
        async fn generate(
            &self,
            payload: &GenerationRequest,
        ) -> Result<GenerationOutcome, RemoteCallFailure> {
            self.check("generate")?;
            let mut experiments = self.experiments.lock().unwrap();
            let experiment = experiments
                .iter_mut()
                .find(|e| e.id == payload.experiment_id)
                .ok_or_else(|| RemoteCallFailure::with_status("Experiment not found", 404))?;

            let offset = experiment.responses.len();
            let responses: Vec<_> = (0..payload.config.num_responses as usize)
                .map(|i| GeneratedResponse {
                    id: ResponseId::new(format!("{}-r{}", experiment.id, offset + i)),
                    experiment_id: experiment.id.clone(),
                    text: format!("response {}", offset + i),
                    parameters: None,
                    token_count: None,
                    latency_ms: None,
                    created_at: Utc::now(),
                })
                .collect();
            experiment.responses.extend(responses.iter().cloned());
            Ok(GenerationOutcome {
                experiment_id: experiment.id.clone(),
                responses,
            })
        }
    }

    fn score(id: &ResponseId) -> MetricsResult {
        let rank = id.as_str().chars().last().and_then(|c| c.to_digit(10)).unwrap_or(0);
        MetricsResult {
            response_id: id.clone(),
            metrics: BTreeMap::new(),
            overall_score: f64::from(rank),
        }
    }

    #[async_trait]
    impl MetricsApi for FakeBackend {
        async fn calculate(&self, id: &ResponseId) -> Result<MetricsResult, RemoteCallFailure> {
            self.check("calculate")?;
            Ok(score(id))
        }

        async fn calculate_batch(
            &self,
            responses: &[ResponseId],
        ) -> Result<Vec<MetricsResult>, RemoteCallFailure> {
            self.check("calculate_batch")?;
            Ok(responses.iter().map(score).collect())
        }

        async fn compare(&self, ids: &[ResponseId]) -> Result<Comparison, RemoteCallFailure> {
            self.check("compare")?;
            let scores: Vec<_> = ids.iter().map(score).collect();
            Ok(Comparison::from_scores(&scores))
        }
    }

    fn workbench(backend: FakeBackend) -> ParameterWorkbench {
        ParameterWorkbench::new(
            Arc::new(backend),
            NotificationStore::default(),
            &BehaviorConfig::default(),
        )
    }

    fn kinds(workbench: &ParameterWorkbench) -> Vec<NotificationKind> {
        workbench
            .notifications()
            .notifications()
            .iter()
            .map(|n| n.kind)
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_preset_keeps_model() {
        let wb = workbench(FakeBackend::default());
        wb.set_parameters(GenerationParameters::default().with_model("gpt-4o"))
            .unwrap();

        let params = wb.apply_preset("creative").unwrap();
        assert_eq!(params.model.as_str(), "gpt-4o");
        assert_eq!(params, wb.parameters());
        assert!(wb.notifications().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_preset_warns() {
        let wb = workbench(FakeBackend::default());
        let before = wb.parameters();

        let err = wb.apply_preset("spicy").unwrap_err();
        assert!(matches!(
            err,
            WorkbenchError::Validation(DomainError::UnknownPreset(_))
        ));
        assert_eq!(wb.parameters(), before);
        assert_eq!(kinds(&wb), vec![NotificationKind::Warning]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_parameters_rejected() {
        let wb = workbench(FakeBackend::default());
        let err = wb
            .set_parameters(GenerationParameters::default().with_temperature(5.0))
            .unwrap_err();
        assert!(matches!(err, WorkbenchError::Validation(ref e) if e.is_parameter_error()));
        assert_eq!(wb.parameters().temperature, GenerationParameters::default().temperature);
        assert_eq!(kinds(&wb), vec![NotificationKind::Warning]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_end_to_end() {
        let wb = workbench(FakeBackend::default());
        let run = wb
            .run("Haiku", "Write a haiku", &GenerationConfig::new(3))
            .await
            .unwrap();

        assert_eq!(run.responses.len(), 3);
        assert_eq!(run.experiment.responses.len(), 3);
        assert_eq!(run.metrics.len(), 3);
        assert_eq!(wb.metrics().metrics().len(), 3);
        assert_eq!(wb.experiments().selected_id(), Some(run.experiment.id.clone()));
        assert_eq!(
            kinds(&wb),
            vec![NotificationKind::Success, NotificationKind::Success]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_rejects_empty_prompt_without_calling_backend() {
        let wb = workbench(FakeBackend::default());
        let err = wb
            .run("Haiku", "   ", &GenerationConfig::new(1))
            .await
            .unwrap_err();
        assert_eq!(err, WorkbenchError::Validation(DomainError::EmptyPrompt));
        assert!(wb.experiments().experiments().is_empty());
        assert_eq!(kinds(&wb), vec![NotificationKind::Warning]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_generation_failure() {
        let wb = workbench(FakeBackend::failing_on("generate", "model overloaded"));
        let err = wb
            .run("Haiku", "Write a haiku", &GenerationConfig::new(2))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "model overloaded");
        // the experiment was still created
        assert_eq!(wb.experiments().experiments().len(), 1);
        assert_eq!(wb.experiments().error().as_deref(), Some("model overloaded"));

        let notes = wb.notifications().notifications();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[1].kind, NotificationKind::Error);
        assert!(!notes[1].auto_hide);
        assert!(notes[1].message.contains("model overloaded"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyze_missing_experiment() {
        let wb = workbench(FakeBackend::default());
        let err = wb.analyze(&ExperimentId::new("nope")).await.unwrap_err();
        assert_eq!(err, WorkbenchError::NoExperiment(ExperimentId::new("nope")));

        let notes = wb.notifications().notifications();
        assert_eq!(notes[0].kind, NotificationKind::Error);
        assert!(notes[0].message.contains("Experiment not found"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyze_without_responses() {
        let wb = workbench(FakeBackend::default());
        let created = wb
            .experiments()
            .create_experiment(&NewExperiment::new("Empty", "Say nothing"))
            .await
            .unwrap();

        let err = wb.analyze(&created.id).await.unwrap_err();
        assert_eq!(err, WorkbenchError::NoResponses(created.id));
        assert_eq!(kinds(&wb), vec![NotificationKind::Warning]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyze_scores_existing_responses() {
        let wb = workbench(FakeBackend::default());
        let run = wb
            .run("Haiku", "Write a haiku", &GenerationConfig::new(2))
            .await
            .unwrap();
        wb.notifications().clear_all();

        let metrics = wb.analyze(&run.experiment.id).await.unwrap();
        assert_eq!(metrics.len(), 2);
        assert!(wb.notifications().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_compare_names_best_response() {
        let wb = workbench(FakeBackend::default());
        let ids = vec![ResponseId::new("exp-1-r0"), ResponseId::new("exp-1-r4")];

        let comparison = wb.compare(&ids).await.unwrap();
        assert_eq!(comparison.best_response_id, Some(ResponseId::new("exp-1-r4")));

        let notes = wb.notifications().notifications();
        assert_eq!(notes[0].kind, NotificationKind::Info);
        assert_eq!(notes[0].message, "Best response: exp-1-r4");
    }

    #[tokio::test(start_paused = true)]
    async fn test_compare_failure_posts_error() {
        let wb = workbench(FakeBackend::failing_on("compare", "need two responses"));
        let err = wb.compare(&[ResponseId::new("a")]).await.unwrap_err();
        assert!(matches!(err, WorkbenchError::Remote(_)));
        assert_eq!(kinds(&wb), vec![NotificationKind::Error]);
        assert_eq!(wb.metrics().error().as_deref(), Some("need two responses"));
    }
}
