//! Structured configuration issues.
//!
//! Configuration loading never fails on a questionable value. Instead each
//! problem is reported as a [`ConfigIssue`] and the caller decides whether
//! to print, abort, or fall back to defaults.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: a default is used instead.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A duration field is zero.
    ZeroDuration { field: String },
    /// The API base URL is not an http(s) URL.
    InvalidBaseUrl { value: String },
    /// A string field did not match any known value.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
