//! Use cases for the application layer

pub mod parameter_workbench;

pub use parameter_workbench::{ParameterWorkbench, WorkbenchError, WorkbenchRun};
