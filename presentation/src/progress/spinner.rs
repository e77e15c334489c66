//! Spinner shown while a remote call is in flight

use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

/// An indicatif spinner that can be disabled (quiet mode, JSON output).
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    pub fn start(message: impl Into<String>, enabled: bool) -> Self {
        if !enabled {
            return Self { bar: None };
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(Self::style());
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar: Some(bar) }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    pub fn is_active(&self) -> bool {
        self.bar.is_some()
    }

    pub fn set_message(&self, message: impl Into<String>) {
        if let Some(bar) = &self.bar {
            bar.set_message(message.into());
        }
    }

    /// Remove the spinner from the terminal
    pub fn finish(self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    /// Show a spinner for the duration of `future`.
    pub async fn wrap<F: Future>(message: impl Into<String>, enabled: bool, future: F) -> F::Output {
        let spinner = Self::start(message, enabled);
        let output = future.await;
        spinner.finish();
        output
    }
}
