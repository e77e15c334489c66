//! Application-level configuration.
//!
//! [`BehaviorConfig`] holds the timing knobs of the stateful components:
//! how long auto-hiding notifications stay visible, and how long a session
//! keeps a recorded error before clearing it.

use paramlab_domain::DEFAULT_NOTIFICATION_DURATION;
use std::time::Duration;

/// Delay after which a session error clears itself unless superseded
pub const DEFAULT_ERROR_AUTO_CLEAR: Duration = Duration::from_millis(5000);

/// Timing behaviour of the notification store and resource sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BehaviorConfig {
    /// Lifetime of an auto-hiding notification that sets no duration.
    pub notification_duration: Duration,
    /// Delay before a recorded session error is cleared.
    pub error_auto_clear: Duration,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            notification_duration: DEFAULT_NOTIFICATION_DURATION,
            error_auto_clear: DEFAULT_ERROR_AUTO_CLEAR,
        }
    }
}

impl BehaviorConfig {
    pub fn with_notification_duration(mut self, duration: Duration) -> Self {
        self.notification_duration = duration;
        self
    }

    pub fn with_error_auto_clear(mut self, delay: Duration) -> Self {
        self.error_auto_clear = delay;
        self
    }
}
