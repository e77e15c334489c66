//! Notification entities

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Lifetime of an auto-hiding notification unless the caller says otherwise
pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(5000);

/// Unique notification identifier.
///
/// Backed by a UUIDv7: the leading bits are a millisecond timestamp and the
/// rest is random, so ids generated in the same millisecond still differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(Uuid);

impl NotificationId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visual category of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Button attached to a notification (e.g. "Retry", "Undo")
#[derive(Clone)]
pub struct NotificationAction {
    pub label: String,
    handler: Arc<dyn Fn() + Send + Sync>,
}

impl NotificationAction {
    pub fn new(label: impl Into<String>, handler: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            handler: Arc::new(handler),
        }
    }

    /// Run the action's handler
    pub fn invoke(&self) {
        (self.handler)()
    }
}

impl fmt::Debug for NotificationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationAction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Optional fields a producer may set. Unset fields fall back to store defaults.
#[derive(Debug, Clone, Default)]
pub struct NotificationOptions {
    pub title: Option<String>,
    pub action: Option<NotificationAction>,
    pub auto_hide: Option<bool>,
    pub duration: Option<Duration>,
}

impl NotificationOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_action(mut self, action: NotificationAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_auto_hide(mut self, auto_hide: bool) -> Self {
        self.auto_hide = Some(auto_hide);
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// A notification as submitted by a producer, before the store assigns an id
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub kind: NotificationKind,
    pub message: String,
    pub options: NotificationOptions,
}

impl NotificationDraft {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            options: NotificationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: NotificationOptions) -> Self {
        self.options = options;
        self
    }
}

/// A live notification (Entity). Immutable once created.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub message: String,
    pub title: Option<String>,
    pub action: Option<NotificationAction>,
    pub auto_hide: bool,
    pub duration: Duration,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Materialise a draft, filling unset options from the given defaults.
    pub fn from_draft(draft: NotificationDraft, default_duration: Duration) -> Self {
        let NotificationDraft {
            kind,
            message,
            options,
        } = draft;

        Self {
            id: NotificationId::generate(),
            kind,
            message,
            title: options.title,
            action: options.action,
            auto_hide: options.auto_hide.unwrap_or(true),
            duration: options.duration.unwrap_or(default_duration),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_ids_are_unique_in_a_tight_loop() {
        let ids: HashSet<_> = (0..10_000).map(|_| NotificationId::generate()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_from_draft_applies_defaults() {
        let draft = NotificationDraft::new(NotificationKind::Info, "hello");
        let n = Notification::from_draft(draft, DEFAULT_NOTIFICATION_DURATION);
        assert!(n.auto_hide);
        assert_eq!(n.duration, Duration::from_millis(5000));
        assert!(n.title.is_none());
    }

    #[test]
    fn test_from_draft_keeps_caller_fields() {
        let draft = NotificationDraft::new(NotificationKind::Warning, "careful").with_options(
            NotificationOptions::titled("Heads up")
                .with_auto_hide(false)
                .with_duration(Duration::from_secs(1)),
        );
        let n = Notification::from_draft(draft, DEFAULT_NOTIFICATION_DURATION);
        assert_eq!(n.title.as_deref(), Some("Heads up"));
        assert!(!n.auto_hide);
        assert_eq!(n.duration, Duration::from_secs(1));
    }

    #[test]
    fn test_action_invokes_handler() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let action = NotificationAction::new("Retry", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        action.invoke();
        action.clone().invoke();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(format!("{:?}", action).contains("Retry"));
    }
}
