//! Resource session domain.
//!
//! - [`status::SessionStatus`] — `Idle | Pending(op) | Failed(op, message)`
//! - [`status::RequestToken`] — identifies one issued session call

pub mod status;
