//! Generation domain.
//!
//! - [`parameters::GenerationParameters`] — model and sampling settings
//! - [`preset::ParameterPreset`] — named parameter starting points
//! - [`request::GenerationRequest`] — payload for a generation call

pub mod parameters;
pub mod preset;
pub mod request;
