//! Timing configuration from TOML (`[notifications]` and `[session]` sections)

use paramlab_domain::{ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_MS: u64 = 5000;

/// Raw notification configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNotificationsConfig {
    /// Lifetime of auto-hiding notifications in milliseconds
    pub default_duration_ms: u64,
}

impl Default for FileNotificationsConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: DEFAULT_MS,
        }
    }
}

/// Raw session configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// Delay before a session error clears itself, in milliseconds
    pub error_auto_clear_ms: u64,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            error_auto_clear_ms: DEFAULT_MS,
        }
    }
}

/// Convert a millisecond field, reporting zero as an issue.
pub(super) fn to_duration(field: &str, ms: u64) -> (Duration, Option<ConfigIssue>) {
    if ms > 0 {
        return (Duration::from_millis(ms), None);
    }
    let issue = ConfigIssue {
        severity: Severity::Warning,
        code: ConfigIssueCode::ZeroDuration {
            field: field.to_string(),
        },
        message: format!("{} cannot be 0, using {}ms", field, DEFAULT_MS),
    };
    (Duration::from_millis(DEFAULT_MS), Some(issue))
}

impl FileNotificationsConfig {
    pub fn default_duration(&self) -> (Duration, Option<ConfigIssue>) {
        to_duration("notifications.default_duration_ms", self.default_duration_ms)
    }
}

impl FileSessionConfig {
    pub fn error_auto_clear(&self) -> (Duration, Option<ConfigIssue>) {
        to_duration("session.error_auto_clear_ms", self.error_auto_clear_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonzero_passes_through() {
        let config = FileSessionConfig {
            error_auto_clear_ms: 1500,
        };
        let (delay, issue) = config.error_auto_clear();
        assert_eq!(delay, Duration::from_millis(1500));
        assert!(issue.is_none());
    }

    #[test]
    fn test_zero_duration_reports_field() {
        let config = FileNotificationsConfig {
            default_duration_ms: 0,
        };
        let (duration, issue) = config.default_duration();
        assert_eq!(duration, Duration::from_millis(5000));
        let issue = issue.unwrap();
        assert_eq!(
            issue.code,
            ConfigIssueCode::ZeroDuration {
                field: "notifications.default_duration_ms".to_string()
            }
        );
    }
}
