//! Remote service configuration from TOML (`[api]` section)

use paramlab_domain::{ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default base URL of the dashboard API
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Raw API configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApiConfig {
    /// Base URL every resource path is appended to
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FileApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl FileApiConfig {
    /// Request timeout, falling back to the default when zero.
    pub fn timeout(&self) -> Duration {
        match self.timeout_secs {
            0 => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    /// Base URL without a trailing slash
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub(super) fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let url = self.base_url.trim();
        let has_scheme = url.starts_with("http://") || url.starts_with("https://");
        let has_host = url
            .split_once("://")
            .is_some_and(|(_, rest)| !rest.is_empty() && !rest.starts_with('/'));
        if !has_scheme || !has_host {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::InvalidBaseUrl {
                    value: self.base_url.clone(),
                },
                message: format!(
                    "api.base_url: '{}' is not an http(s) URL",
                    self.base_url
                ),
            });
        }

        if self.timeout_secs == 0 {
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::ZeroDuration {
                    field: "api.timeout_secs".to_string(),
                },
                message: format!(
                    "api.timeout_secs cannot be 0, using {}",
                    DEFAULT_TIMEOUT_SECS
                ),
            });
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(FileApiConfig::default().issues().is_empty());
    }

    #[test]
    fn test_rejects_non_http_url() {
        let config = FileApiConfig {
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        let issues = config.issues();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
    }

    #[test]
    fn test_rejects_missing_host() {
        let config = FileApiConfig {
            base_url: "http:///api".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.issues()[0].code,
            ConfigIssueCode::InvalidBaseUrl { .. }
        ));
    }

    #[test]
    fn test_zero_timeout_falls_back() {
        let config = FileApiConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.issues()[0].severity, Severity::Warning);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = FileApiConfig {
            base_url: "https://lab.example.com/api/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.normalized_base_url(), "https://lab.example.com/api");
    }
}
