//! Presentation layer for paramlab
//!
//! This crate contains CLI definitions, output formatters,
//! notification rendering and progress indicators.

pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, OutputFormat, ParameterArgs};
pub use config::OutputConfig;
pub use output::console::ConsoleFormatter;
pub use output::notifications::NotificationRenderer;
pub use progress::spinner::Spinner;
