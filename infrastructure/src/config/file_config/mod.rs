//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application types on
//! demand.

mod api;
mod defaults;
mod output;
mod timing;

pub use api::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, FileApiConfig};
pub use defaults::FileDefaultsConfig;
pub use output::FileOutputConfig;
pub use timing::{FileNotificationsConfig, FileSessionConfig};

use paramlab_application::BehaviorConfig;
use paramlab_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Remote service settings
    pub api: FileApiConfig,
    /// Notification settings
    pub notifications: FileNotificationsConfig,
    /// Session settings
    pub session: FileSessionConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Defaults for new experiments
    pub defaults: FileDefaultsConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks:
    /// 1. Base URL shape and request timeout
    /// 2. Zero durations for notifications and session errors
    /// 3. Unknown preset names
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.api.issues();
        issues.extend(self.notifications.default_duration().1);
        issues.extend(self.session.error_auto_clear().1);
        issues.extend(self.defaults.parse_preset().1);
        issues
    }

    /// Timing knobs for the notification store and sessions.
    ///
    /// Invalid values fall back to defaults; [`validate`](Self::validate)
    /// reports them.
    pub fn to_behavior_config(&self) -> BehaviorConfig {
        BehaviorConfig::default()
            .with_notification_duration(self.notifications.default_duration().0)
            .with_error_auto_clear(self.session.error_auto_clear().0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramlab_domain::{ConfigIssueCode, Severity};
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[api]
base_url = "https://lab.example.com/api"
timeout_secs = 10

[notifications]
default_duration_ms = 3000

[session]
error_auto_clear_ms = 8000

[output]
color = false

[defaults]
preset = "creative"
model = "claude-haiku-4.5"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "https://lab.example.com/api");
        assert_eq!(config.api.timeout_secs, 10);
        assert!(!config.output.color);
        assert_eq!(config.defaults.preset, "creative");
        assert!(config.validate().is_empty());

        let behavior = config.to_behavior_config();
        assert_eq!(behavior.notification_duration, Duration::from_millis(3000));
        assert_eq!(behavior.error_auto_clear, Duration::from_millis(8000));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[session]
error_auto_clear_ms = 2000
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.error_auto_clear_ms, 2000);
        // Defaults should apply
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.notifications.default_duration_ms, 5000);
        assert!(config.output.color);
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.to_behavior_config(), BehaviorConfig::default());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_collects_every_issue() {
        let toml_str = r#"
[api]
base_url = "localhost:8000"

[notifications]
default_duration_ms = 0

[defaults]
preset = "chaotic"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().any(|i| i.severity == Severity::Error));
        assert!(issues.iter().any(|i| matches!(
            i.code,
            ConfigIssueCode::ZeroDuration { ref field } if field == "notifications.default_duration_ms"
        )));

        // zero duration falls back instead of disabling auto-hide
        assert_eq!(
            config.to_behavior_config().notification_duration,
            Duration::from_millis(5000)
        );
    }
}
