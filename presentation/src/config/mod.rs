//! Presentation-level configuration
//!
//! How command results are written to the terminal.

use crate::cli::commands::OutputFormat;

/// Output configuration for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Output format for command results
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Show spinners while calls are in flight
    pub show_progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
            show_progress: true,
        }
    }
}

impl OutputConfig {
    /// Combine the file setting for color with command-line flags.
    ///
    /// JSON output implies no color and no spinner.
    pub fn resolve(format: OutputFormat, file_color: bool, no_color: bool, quiet: bool) -> Self {
        let json = format == OutputFormat::Json;
        Self {
            format,
            color: file_color && !no_color && !json,
            show_progress: !quiet && !json,
        }
    }

    /// Apply the color choice process-wide.
    pub fn apply_color(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }
}
