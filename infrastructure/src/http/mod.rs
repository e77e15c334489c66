//! REST adapter for the remote dashboard service

mod client;

pub use client::HttpResourceClient;
