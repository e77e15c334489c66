//! Command dispatch
//!
//! Each command drives the shared workbench and prints its result. Failures
//! are posted to the notification store before being returned, so the
//! caller only has to render notifications.

use anyhow::{Result, anyhow};
use paramlab_application::{NotificationStore, ParameterWorkbench};
use paramlab_domain::{
    ExperimentId, ExperimentPatch, GenerationConfig, GenerationParameters, NewExperiment,
    Notification, NotificationId, NotificationOptions, ParameterPreset, ResponseId,
};
use paramlab_infrastructure::{ConfigLoader, FileConfig};
use paramlab_presentation::{
    Command, ConsoleFormatter, OutputConfig, OutputFormat, ParameterArgs, Spinner,
};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

pub struct App {
    workbench: ParameterWorkbench,
    output: OutputConfig,
    file_config: FileConfig,
    config_path: Option<PathBuf>,
}

impl App {
    pub fn new(
        workbench: ParameterWorkbench,
        output: OutputConfig,
        file_config: FileConfig,
        config_path: Option<PathBuf>,
    ) -> Self {
        Self {
            workbench,
            output,
            file_config,
            config_path,
        }
    }

    pub fn workbench(&self) -> &ParameterWorkbench {
        &self.workbench
    }

    fn notifications(&self) -> &NotificationStore {
        self.workbench.notifications()
    }

    fn print<T: Serialize + ?Sized>(&self, value: &T, text: impl FnOnce(&T) -> String) {
        match self.output.format {
            OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(value)),
            OutputFormat::Text => print!("{}", text(value)),
        }
    }

    async fn spin<F: std::future::Future>(&self, message: &str, future: F) -> F::Output {
        Spinner::wrap(message, self.output.show_progress, future).await
    }

    /// Most recent session error, for calls that report failure as `None`
    fn experiments_error(&self) -> String {
        self.workbench
            .experiments()
            .error()
            .unwrap_or_else(|| "unknown error".to_string())
    }

    /// Apply preset and flags to the workbench parameters.
    fn configure(&self, params: &ParameterArgs) -> Result<GenerationParameters> {
        if let Some(preset) = &params.preset {
            self.workbench.apply_preset(preset)?;
        }
        if params.has_overrides() {
            self.workbench
                .set_parameters(params.apply(self.workbench.parameters()))?;
        }
        Ok(self.workbench.parameters())
    }

    pub async fn execute(&self, command: Command) -> Result<()> {
        match command {
            Command::Presets => {
                self.presets();
                Ok(())
            }
            Command::Config => {
                self.config();
                Ok(())
            }
            Command::List => self.list().await,
            Command::Show { id } => self.show(ExperimentId::new(id)).await,
            Command::Create {
                name,
                prompt,
                description,
                params,
            } => self.create(name, prompt, description, &params).await,
            Command::Update {
                id,
                name,
                prompt,
                description,
            } => {
                let patch = ExperimentPatch {
                    name,
                    prompt,
                    description,
                    parameters: None,
                };
                self.update(ExperimentId::new(id), patch).await
            }
            Command::Delete { id } => self.delete(ExperimentId::new(id)).await,
            Command::Generate { id, count, params } => {
                self.generate(ExperimentId::new(id), count, &params).await
            }
            Command::Stats { id } => self.stats(ExperimentId::new(id)).await,
            Command::Analyze { id } => self.analyze(ExperimentId::new(id)).await,
            Command::Compare { response_ids } => {
                let ids: Vec<ResponseId> = response_ids.into_iter().map(ResponseId::new).collect();
                self.compare(&ids).await
            }
            Command::Run {
                name,
                prompt,
                count,
                params,
            } => self.run(name, prompt, count, &params).await,
        }
    }

    fn presets(&self) {
        match self.output.format {
            OutputFormat::Json => {
                let presets: Vec<_> = ParameterPreset::all()
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "name": p.as_str(),
                            "description": p.description(),
                            "parameters": p.parameters(),
                        })
                    })
                    .collect();
                println!("{}", ConsoleFormatter::format_json(&presets));
            }
            OutputFormat::Text => print!("{}", ConsoleFormatter::format_presets()),
        }
    }

    fn config(&self) {
        ConfigLoader::print_config_sources(self.config_path.as_ref());

        let issues = self.file_config.validate();
        if issues.is_empty() {
            println!("\nNo configuration issues.");
        } else {
            println!("\nIssues:");
            for issue in &issues {
                let level = if issue.is_error() { "error" } else { "warning" };
                println!("  [{}] {}", level, issue.message);
            }
        }

        println!("\nEffective settings:");
        println!("  api.base_url = {}", self.file_config.api.base_url);
        println!("  api.timeout_secs = {}", self.file_config.api.timeout_secs);
        let behavior = self.file_config.to_behavior_config();
        println!(
            "  notifications.default_duration_ms = {}",
            behavior.notification_duration.as_millis()
        );
        println!(
            "  session.error_auto_clear_ms = {}",
            behavior.error_auto_clear.as_millis()
        );
        println!(
            "  defaults = {}",
            ConsoleFormatter::parameter_summary(&self.workbench.parameters())
        );
    }

    async fn list(&self) -> Result<()> {
        let loaded = self
            .spin("Loading experiments", self.workbench.experiments().load_experiments())
            .await;
        let Some(experiments) = loaded else {
            let reason = self.experiments_error();
            self.notifications().error(
                format!("Failed to load experiments: {}", reason),
                NotificationOptions::default(),
            );
            return Err(anyhow!(reason));
        };
        self.print(&experiments, |e| ConsoleFormatter::format_experiment_list(e));
        Ok(())
    }

    async fn show(&self, id: ExperimentId) -> Result<()> {
        let loaded = self
            .spin("Loading experiment", self.workbench.experiments().load_experiment(&id))
            .await;
        let Some(experiment) = loaded else {
            let reason = self.experiments_error();
            self.notifications().error(
                format!("Could not load experiment {}: {}", id, reason),
                NotificationOptions::default(),
            );
            return Err(anyhow!(reason));
        };
        self.print(&experiment, ConsoleFormatter::format_experiment);
        Ok(())
    }

    async fn create(
        &self,
        name: String,
        prompt: String,
        description: Option<String>,
        params: &ParameterArgs,
    ) -> Result<()> {
        let parameters = self.configure(params)?;
        let mut draft = NewExperiment::new(name, prompt).with_parameters(parameters);
        if let Some(description) = description {
            draft = draft.with_description(description);
        }
        if let Err(e) = draft.validate() {
            self.notifications()
                .warning(e.to_string(), NotificationOptions::default());
            return Err(e.into());
        }

        let created = self
            .spin(
                "Creating experiment",
                self.workbench.experiments().create_experiment(&draft),
            )
            .await
            .inspect_err(|e| {
                self.notifications().error(
                    format!("Failed to create experiment: {}", e),
                    NotificationOptions::default(),
                );
            })?;

        self.notifications().success(
            format!("Experiment \"{}\" created", created.name),
            NotificationOptions::default(),
        );
        self.print(&created, ConsoleFormatter::format_experiment);
        Ok(())
    }

    async fn update(&self, id: ExperimentId, patch: ExperimentPatch) -> Result<()> {
        if patch.is_empty() {
            self.notifications().warning(
                "Nothing to update: pass --name, --prompt or --description",
                NotificationOptions::default(),
            );
            return Err(anyhow!("empty update"));
        }

        let updated = self
            .spin(
                "Updating experiment",
                self.workbench.experiments().update_experiment(&id, &patch),
            )
            .await
            .inspect_err(|e| {
                self.notifications().error(
                    format!("Failed to update experiment: {}", e),
                    NotificationOptions::default(),
                );
            })?;

        self.notifications().success(
            format!("Experiment \"{}\" updated", updated.name),
            NotificationOptions::default(),
        );
        self.print(&updated, ConsoleFormatter::format_experiment);
        Ok(())
    }

    async fn delete(&self, id: ExperimentId) -> Result<()> {
        self.spin(
            "Deleting experiment",
            self.workbench.experiments().delete_experiment(&id),
        )
        .await
        .inspect_err(|e| {
            self.notifications().error(
                format!("Failed to delete experiment: {}", e),
                NotificationOptions::default(),
            );
        })?;

        self.notifications().success(
            format!("Experiment {} deleted", id),
            NotificationOptions::default(),
        );
        if self.output.format == OutputFormat::Json {
            println!("{}", ConsoleFormatter::format_json(&id));
        }
        Ok(())
    }

    async fn generate(&self, id: ExperimentId, count: u32, params: &ParameterArgs) -> Result<()> {
        let mut config = GenerationConfig::new(count);
        if !params.is_empty() {
            config = config.with_parameters(self.configure(params)?);
        }
        if let Err(e) = config.validate() {
            self.notifications()
                .warning(e.to_string(), NotificationOptions::default());
            return Err(e.into());
        }

        let outcome = self
            .spin(
                &format!("Generating {} responses", count),
                self.workbench.experiments().generate_responses(&id, &config),
            )
            .await
            .inspect_err(|e| {
                self.notifications().error(
                    format!("Failed to generate responses: {}", e),
                    NotificationOptions::default(),
                );
            })?;

        self.notifications().success(
            format!("Generated {} responses", outcome.responses.len()),
            NotificationOptions::default(),
        );
        self.print(&outcome, ConsoleFormatter::format_outcome);
        Ok(())
    }

    async fn stats(&self, id: ExperimentId) -> Result<()> {
        let stats = self
            .spin(
                "Loading statistics",
                self.workbench.experiments().get_experiment_stats(&id),
            )
            .await;
        match stats {
            Some(stats) => {
                self.print(&stats, ConsoleFormatter::format_stats);
                Ok(())
            }
            None => {
                self.notifications().warning(
                    format!("Statistics for {} are unavailable", id),
                    NotificationOptions::default(),
                );
                Err(anyhow!("statistics unavailable"))
            }
        }
    }

    async fn analyze(&self, id: ExperimentId) -> Result<()> {
        let metrics = self
            .spin("Scoring responses", self.workbench.analyze(&id))
            .await?;
        self.print(&metrics, |m| ConsoleFormatter::format_metrics(m));
        Ok(())
    }

    async fn compare(&self, ids: &[ResponseId]) -> Result<()> {
        let comparison = self
            .spin("Comparing responses", self.workbench.compare(ids))
            .await?;
        self.print(&comparison, ConsoleFormatter::format_comparison);
        Ok(())
    }

    async fn run(&self, name: String, prompt: String, count: u32, params: &ParameterArgs) -> Result<()> {
        self.configure(params)?;
        let config = GenerationConfig::new(count);
        let run = self
            .spin(
                &format!("Running \"{}\"", name),
                self.workbench.run(&name, &prompt, &config),
            )
            .await?;

        match self.output.format {
            OutputFormat::Json => println!(
                "{}",
                ConsoleFormatter::format_json(&serde_json::json!({
                    "experiment": run.experiment,
                    "metrics": run.metrics,
                }))
            ),
            OutputFormat::Text => {
                print!("{}", ConsoleFormatter::format_experiment(&run.experiment));
                print!("{}", ConsoleFormatter::format_metrics(&run.metrics));
            }
        }
        Ok(())
    }
}

/// Records every notification posted while a command runs, including
/// ones that auto-hide before the command finishes.
pub struct NotificationLog {
    store: NotificationStore,
    log: Arc<Mutex<Vec<Notification>>>,
    task: JoinHandle<()>,
}

impl NotificationLog {
    pub fn start(store: &NotificationStore) -> Self {
        let log: Arc<Mutex<Vec<Notification>>> = Arc::default();
        let mut rx = store.subscribe();
        let sink = log.clone();
        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let snapshot = rx.borrow_and_update().clone();
                record(&sink, snapshot);
            }
        });
        Self {
            store: store.clone(),
            log,
            task,
        }
    }

    /// Stop recording and return everything seen, in posting order.
    pub fn finish(self) -> Vec<Notification> {
        self.task.abort();
        record(&self.log, self.store.notifications());
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *log)
    }
}

fn record(log: &Mutex<Vec<Notification>>, snapshot: Vec<Notification>) {
    let mut log = log.lock().unwrap_or_else(PoisonError::into_inner);
    let seen: HashSet<NotificationId> = log.iter().map(|n| n.id).collect();
    log.extend(snapshot.into_iter().filter(|n| !seen.contains(&n.id)));
}
