//! User-facing notifications

pub mod store;

pub use store::NotificationStore;
