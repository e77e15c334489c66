//! Application layer for paramlab
//!
//! This crate contains the stateful sessions, the notification store, the
//! resource client port and the workbench use case. It depends only on the
//! domain layer.

pub mod config;
pub mod notifications;
pub mod ports;
pub mod session;
pub mod use_cases;

// Re-export commonly used types
pub use config::BehaviorConfig;
pub use notifications::NotificationStore;
pub use ports::resource_client::{
    ExperimentList, ExperimentsApi, MetricsApi, RemoteCallFailure, ResourceClient, ResponsesApi,
};
pub use session::{ExperimentSession, QualityMetricsSession};
pub use use_cases::{ParameterWorkbench, WorkbenchError, WorkbenchRun};
