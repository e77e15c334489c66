//! Offline backend with stand-in generation and scoring

mod client;
pub mod scoring;

pub use client::InMemoryResourceClient;
