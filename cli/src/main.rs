//! CLI entrypoint for paramlab
//!
//! This is the main binary that wires together all layers using
//! dependency injection. The notification store and both sessions are
//! constructed once here and shared by every command.

mod app;

use anyhow::{Result, bail};
use app::{App, NotificationLog};
use clap::Parser;
use paramlab_application::{NotificationStore, ParameterWorkbench, ResourceClient};
use paramlab_domain::Severity;
use paramlab_infrastructure::{ConfigLoader, HttpResourceClient, InMemoryResourceClient};
use paramlab_presentation::{Cli, Command, NotificationRenderer, OutputConfig};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level; RUST_LOG wins when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting paramlab");

    // === Configuration ===
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };

    let issues = file_config.validate();
    for issue in &issues {
        match issue.severity {
            Severity::Error => warn!("config error: {}", issue.message),
            Severity::Warning => warn!("config: {}", issue.message),
        }
    }
    let is_config_command = matches!(cli.command, Command::Config);
    if !cli.offline && !is_config_command {
        if let Some(issue) = issues.iter().find(|i| i.is_error()) {
            bail!("Invalid configuration: {}", issue.message);
        }
    }

    let output = OutputConfig::resolve(cli.output, file_config.output.color, cli.no_color, cli.quiet);
    output.apply_color();

    // === Dependency Injection ===
    let client: Arc<dyn ResourceClient> = if cli.offline {
        info!("Using in-memory backend");
        Arc::new(InMemoryResourceClient::new())
    } else {
        info!("Using API at {}", file_config.api.normalized_base_url());
        Arc::new(HttpResourceClient::from_config(&file_config.api)?)
    };

    let behavior = file_config.to_behavior_config();
    let notifications = NotificationStore::new(behavior.notification_duration);
    let workbench = ParameterWorkbench::new(client, notifications.clone(), &behavior);
    if let Err(e) = workbench.set_parameters(file_config.defaults.parameters()) {
        warn!("Ignoring configured defaults: {}", e);
        notifications.clear_all();
    }

    let app = App::new(workbench, output, file_config, cli.config.clone());

    // === Execute ===
    let log = NotificationLog::start(&notifications);
    let result = app.execute(cli.command).await;
    let posted = log.finish();

    if !posted.is_empty() {
        eprintln!("{}", NotificationRenderer::render_all(&posted));
    }

    app.workbench().experiments().close();
    app.workbench().metrics().close();
    notifications.clear_all();

    match result {
        // the failure was already shown as a notification
        Err(e) if !posted.is_empty() => {
            debug!("Command failed: {:#}", e);
            std::process::exit(1);
        }
        other => other,
    }
}
