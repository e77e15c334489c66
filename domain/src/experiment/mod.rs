//! Experiment domain.
//!
//! - [`entities::Experiment`] — a prompt, its parameters and generated responses
//! - [`entities::NewExperiment`] / [`entities::ExperimentPatch`] — write payloads
//! - [`stats::ExperimentStats`] — aggregate numbers for one experiment

pub mod entities;
pub mod stats;
