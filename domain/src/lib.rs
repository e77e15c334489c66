//! Domain layer for paramlab
//!
//! This crate contains the entities and value objects of the parameter
//! testing dashboard. It has no dependencies on infrastructure or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! ## Experiment
//!
//! An experiment pairs a prompt with [`GenerationParameters`] (model plus
//! sampling settings). Generating against an experiment attaches
//! [`GeneratedResponse`]s to it, which can then be scored into
//! [`MetricsResult`]s and ranked in a [`Comparison`].
//!
//! ## Notification
//!
//! Short-lived user feedback ("Experiment created", "Generation failed").
//! Errors stay until dismissed; everything else hides itself.
//!
//! ## Session status
//!
//! Stateful sessions report [`SessionStatus`]: `Idle`, `Pending(op)` or
//! `Failed(op, message)`.

pub mod config;
pub mod core;
pub mod experiment;
pub mod generation;
pub mod metrics;
pub mod notification;
pub mod session;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use core::{error::DomainError, model::Model};
pub use experiment::{
    entities::{Experiment, ExperimentId, ExperimentPatch, NewExperiment},
    stats::ExperimentStats,
};
pub use generation::{
    parameters::GenerationParameters,
    preset::ParameterPreset,
    request::{
        GeneratedResponse, GenerationConfig, GenerationOutcome, GenerationRequest, ResponseId,
    },
};
pub use metrics::entities::{Comparison, MetricsResult, RankedResponse, metric_names};
pub use notification::entities::{
    DEFAULT_NOTIFICATION_DURATION, Notification, NotificationAction, NotificationDraft,
    NotificationId, NotificationKind, NotificationOptions,
};
pub use session::status::{Operation, RequestToken, SessionStatus};
