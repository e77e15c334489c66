//! Notification store
//!
//! Holds the live list of user-facing notifications and expires the
//! auto-hiding ones. One store is created at startup and its handle is
//! cloned into every producer.

use paramlab_domain::{
    Notification, NotificationDraft, NotificationId, NotificationKind, NotificationOptions,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, trace, warn};

struct Entry {
    notification: Notification,
    expiry: Option<AbortHandle>,
}

impl Entry {
    fn cancel_expiry(&mut self) {
        if let Some(handle) = self.expiry.take() {
            handle.abort();
        }
    }
}

struct StoreInner {
    entries: Mutex<Vec<Entry>>,
    default_duration: Duration,
    published: watch::Sender<Vec<Notification>>,
}

impl StoreInner {
    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, entries: &[Entry]) {
        let snapshot = entries.iter().map(|e| e.notification.clone()).collect();
        self.published.send_replace(snapshot);
    }

    fn remove(&self, id: NotificationId) -> bool {
        let mut entries = self.lock();
        let Some(pos) = entries.iter().position(|e| e.notification.id == id) else {
            return false;
        };
        let mut entry = entries.remove(pos);
        entry.cancel_expiry();
        self.publish(&entries);
        true
    }
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        let entries = self
            .entries
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for entry in entries.iter_mut() {
            entry.cancel_expiry();
        }
    }
}

/// Process-wide queue of ephemeral notifications.
///
/// Cloning the store yields another handle to the same queue.
///
/// Auto-hiding notifications need a Tokio runtime to expire; added outside
/// one they stay until removed.
#[derive(Clone)]
pub struct NotificationStore {
    inner: Arc<StoreInner>,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new(paramlab_domain::DEFAULT_NOTIFICATION_DURATION)
    }
}

impl NotificationStore {
    pub fn new(default_duration: Duration) -> Self {
        let (published, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(StoreInner {
                entries: Mutex::new(Vec::new()),
                default_duration,
                published,
            }),
        }
    }

    /// Add a notification and return its id.
    ///
    /// Unset options default to `auto_hide = true` and the store's duration.
    pub fn add(&self, draft: NotificationDraft) -> NotificationId {
        let notification = Notification::from_draft(draft, self.inner.default_duration);
        let id = notification.id;
        let auto_hide = notification.auto_hide.then_some(notification.duration);

        debug!(
            "Notification {} added ({}): {}",
            id, notification.kind, notification.message
        );

        let mut entries = self.inner.lock();
        entries.push(Entry {
            notification,
            expiry: None,
        });
        // Scheduled under the lock so the expiry can never run before the push.
        if let Some(duration) = auto_hide {
            let expiry = self.schedule_expiry(id, duration);
            if let Some(entry) = entries.last_mut() {
                entry.expiry = expiry;
            }
        }
        self.inner.publish(&entries);
        id
    }

    /// Remove a notification. Removing an absent id is a no-op.
    pub fn remove(&self, id: NotificationId) {
        if self.inner.remove(id) {
            debug!("Notification {} dismissed", id);
        } else {
            trace!("Notification {} already gone", id);
        }
    }

    /// Remove every notification and cancel their pending expiries.
    pub fn clear_all(&self) {
        let mut entries = self.inner.lock();
        for entry in entries.iter_mut() {
            entry.cancel_expiry();
        }
        let cleared = entries.len();
        entries.clear();
        self.inner.publish(&entries);
        debug!("Cleared {} notifications", cleared);
    }

    pub fn success(&self, message: impl Into<String>, options: NotificationOptions) -> NotificationId {
        self.add(NotificationDraft::new(NotificationKind::Success, message).with_options(options))
    }

    /// Errors stay until dismissed unless `options.auto_hide` says otherwise.
    pub fn error(&self, message: impl Into<String>, mut options: NotificationOptions) -> NotificationId {
        options.auto_hide.get_or_insert(false);
        self.add(NotificationDraft::new(NotificationKind::Error, message).with_options(options))
    }

    pub fn warning(&self, message: impl Into<String>, options: NotificationOptions) -> NotificationId {
        self.add(NotificationDraft::new(NotificationKind::Warning, message).with_options(options))
    }

    pub fn info(&self, message: impl Into<String>, options: NotificationOptions) -> NotificationId {
        self.add(NotificationDraft::new(NotificationKind::Info, message).with_options(options))
    }

    /// Live notifications in insertion order
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner
            .lock()
            .iter()
            .map(|e| e.notification.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Watch the notification list; a new snapshot is published on every change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.inner.published.subscribe()
    }

    fn schedule_expiry(&self, id: NotificationId, duration: Duration) -> Option<AbortHandle> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime; notification {} will not auto-hide", id);
            return None;
        };

        let store: Weak<StoreInner> = Arc::downgrade(&self.inner);
        let task = runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(store) = store.upgrade() {
                if store.remove(id) {
                    debug!("Notification {} expired", id);
                }
            }
        });
        Some(task.abort_handle())
    }
}
