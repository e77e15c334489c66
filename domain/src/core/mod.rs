//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`] — generation models an experiment can target
//! - [`error::DomainError`] — domain-level errors

pub mod error;
pub mod model;
