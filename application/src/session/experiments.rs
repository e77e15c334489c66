//! Experiment session
//!
//! Owns the experiment collection and the current selection, and exposes
//! the CRUD and generation calls against the remote service.
//!
//! # Failure policy
//!
//! | Call | On failure |
//! |------|-----------|
//! | `load_experiments`, `load_experiment` | record error, return `None` |
//! | `get_experiment_stats` | return `None`, record nothing |
//! | create / update / delete / generate | record error **and** return it |

use super::core::SessionCore;
use crate::config::BehaviorConfig;
use crate::ports::resource_client::{RemoteCallFailure, ResourceClient};
use paramlab_domain::{
    Experiment, ExperimentId, ExperimentPatch, ExperimentStats, GenerationConfig,
    GenerationOutcome, GenerationRequest, NewExperiment, Operation, SessionStatus,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub(crate) struct ExperimentState {
    experiments: Vec<Experiment>,
    selected: Option<ExperimentId>,
}

impl ExperimentState {
    fn selected_experiment(&self) -> Option<&Experiment> {
        let id = self.selected.as_ref()?;
        self.experiments.iter().find(|e| &e.id == id)
    }

    fn position(&self, id: &ExperimentId) -> Option<usize> {
        self.experiments.iter().position(|e| &e.id == id)
    }

    /// Replace the entry with the same id in place, or append it.
    fn upsert(&mut self, experiment: Experiment) {
        match self.position(&experiment.id) {
            Some(pos) => self.experiments[pos] = experiment,
            None => self.experiments.push(experiment),
        }
    }
}

/// Stateful manager of the experiment collection.
///
/// The selection is stored as an id into the collection, so updates and
/// deletes are reflected in [`selected_experiment`](Self::selected_experiment)
/// without separate bookkeeping.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct ExperimentSession {
    core: Arc<SessionCore<ExperimentState>>,
    client: Arc<dyn ResourceClient>,
}

impl ExperimentSession {
    pub fn new(client: Arc<dyn ResourceClient>, config: &BehaviorConfig) -> Self {
        Self {
            core: SessionCore::new(
                "experiments",
                ExperimentState::default(),
                config.error_auto_clear,
            ),
            client,
        }
    }

    // ==================== State ====================

    /// Snapshot of the collection in display order
    pub fn experiments(&self) -> Vec<Experiment> {
        self.core.read(|s| s.experiments.clone())
    }

    pub fn experiment(&self, id: &ExperimentId) -> Option<Experiment> {
        self.core
            .read(|s| s.experiments.iter().find(|e| &e.id == id).cloned())
    }

    pub fn selected_experiment(&self) -> Option<Experiment> {
        self.core.read(|s| s.selected_experiment().cloned())
    }

    pub fn selected_id(&self) -> Option<ExperimentId> {
        self.core.read(|s| s.selected.clone())
    }

    /// Select an experiment already in the collection. Returns `false` if it is
    /// absent or the session is closed.
    pub fn select(&self, id: &ExperimentId) -> bool {
        let mut found = false;
        self.core.mutate(|s| {
            if s.position(id).is_some() {
                s.selected = Some(id.clone());
                found = true;
            }
        });
        found
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

    /// Revision counter bumped on every state change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.core.subscribe()
    }

    /// Tear the session down. Calls still in flight complete for their
    /// callers, but no longer touch session state.
    pub fn close(&self) {
        self.core.close();
    }

    // ==================== Reads ====================

    /// Fetch the full collection and replace the local one.
    ///
    /// Returns `None` on failure; the previous collection is kept.
    pub async fn load_experiments(&self) -> Option<Vec<Experiment>> {
        let token = self.core.begin(Operation::LoadExperiments);
        match self.client.get_all().await {
            Ok(list) => {
                info!("Loaded {} experiments", list.experiments.len());
                let experiments = list.experiments;
                let snapshot = experiments.clone();
                self.core.succeed(token, |s| {
                    s.experiments = experiments;
                    if let Some(id) = &s.selected {
                        if s.position(id).is_none() {
                            s.selected = None;
                        }
                    }
                });
                Some(snapshot)
            }
            Err(e) => {
                self.core.fail(token, &e);
                None
            }
        }
    }

    /// Fetch one experiment and make it the selection.
    ///
    /// Returns `None` on failure, with the selection left unchanged.
    pub async fn load_experiment(&self, id: &ExperimentId) -> Option<Experiment> {
        let token = self.core.begin(Operation::LoadExperiment);
        match self.client.get_by_id(id).await {
            Ok(experiment) => {
                let snapshot = experiment.clone();
                self.core.succeed(token, |s| {
                    s.selected = Some(experiment.id.clone());
                    s.upsert(experiment);
                });
                Some(snapshot)
            }
            Err(e) => {
                self.core.fail(token, &e);
                None
            }
        }
    }

    /// Best-effort statistics; failures are logged and swallowed.
    pub async fn get_experiment_stats(&self, id: &ExperimentId) -> Option<ExperimentStats> {
        match self.client.stats(id).await {
            Ok(stats) => Some(stats),
            Err(e) => {
                debug!("Stats for experiment {} unavailable: {}", id, e);
                None
            }
        }
    }

    // ==================== Writes ====================

    /// Create an experiment and put it at the front of the collection.
    pub async fn create_experiment(
        &self,
        data: &NewExperiment,
    ) -> Result<Experiment, RemoteCallFailure> {
        let token = self.core.begin(Operation::CreateExperiment);
        match self.client.create(data).await {
            Ok(experiment) => {
                info!("Created experiment {} ({})", experiment.id, experiment.name);
                let created = experiment.clone();
                self.core.succeed(token, |s| {
                    s.experiments.retain(|e| e.id != experiment.id);
                    s.experiments.insert(0, experiment);
                });
                Ok(created)
            }
            Err(e) => {
                self.core.fail(token, &e);
                Err(e)
            }
        }
    }

    /// Update an experiment in place, keeping its position.
    pub async fn update_experiment(
        &self,
        id: &ExperimentId,
        patch: &ExperimentPatch,
    ) -> Result<Experiment, RemoteCallFailure> {
        let token = self.core.begin(Operation::UpdateExperiment);
        match self.client.update(id, patch).await {
            Ok(experiment) => {
                info!("Updated experiment {}", id);
                let updated = experiment.clone();
                let id = id.clone();
                self.core.succeed(token, |s| {
                    if let Some(pos) = s.position(&id) {
                        s.experiments[pos] = experiment;
                    }
                });
                Ok(updated)
            }
            Err(e) => {
                self.core.fail(token, &e);
                Err(e)
            }
        }
    }

    /// Delete an experiment, clearing the selection if it pointed at it.
    pub async fn delete_experiment(&self, id: &ExperimentId) -> Result<(), RemoteCallFailure> {
        let token = self.core.begin(Operation::DeleteExperiment);
        match self.client.delete(id).await {
            Ok(()) => {
                info!("Deleted experiment {}", id);
                let id = id.clone();
                self.core.succeed(token, |s| {
                    s.experiments.retain(|e| e.id != id);
                    if s.selected.as_ref() == Some(&id) {
                        s.selected = None;
                    }
                });
                Ok(())
            }
            Err(e) => {
                self.core.fail(token, &e);
                Err(e)
            }
        }
    }

    /// Generate responses for an experiment.
    ///
    /// When the target is the selected experiment it is reloaded afterwards
    /// so the new responses show up on it.
    pub async fn generate_responses(
        &self,
        experiment_id: &ExperimentId,
        config: &GenerationConfig,
    ) -> Result<GenerationOutcome, RemoteCallFailure> {
        let token = self.core.begin(Operation::GenerateResponses);
        let request = GenerationRequest::new(experiment_id.clone(), config.clone());
        match self.client.generate(&request).await {
            Ok(outcome) => {
                info!(
                    "Generated {} responses for experiment {}",
                    outcome.responses.len(),
                    experiment_id
                );
                self.core.succeed(token, |_| {});
                if self.selected_id().as_ref() == Some(experiment_id) && !self.core.is_closed() {
                    self.load_experiment(experiment_id).await;
                }
                Ok(outcome)
            }
            Err(e) => {
                self.core.fail(token, &e);
                Err(e)
            }
        }
    }
}
