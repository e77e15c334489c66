//! Quality metrics domain.

pub mod entities;
