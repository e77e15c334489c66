//! Stateful resource sessions.
//!
//! - [`ExperimentSession`] — experiment collection, selection and generation
//! - [`QualityMetricsSession`] — response scoring and comparison
//!
//! Both report `{loading, error}` through a shared core that tracks calls
//! by request token.

mod core;
pub mod experiments;
pub mod metrics;

pub use experiments::ExperimentSession;
pub use metrics::QualityMetricsSession;
