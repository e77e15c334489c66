//! User-facing notification domain.
//!
//! - [`entities::Notification`] — a live, immutable toast message
//! - [`entities::NotificationDraft`] — what producers submit
//! - [`entities::NotificationId`] — process-unique identifier

pub mod entities;
