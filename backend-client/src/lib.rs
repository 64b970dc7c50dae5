//! HTTP implementations of the document repository collaborators.

mod client;
mod config;

pub use client::BackendClient;
pub use config::BackendConfig;
pub use config::DEFAULT_BASE_URL;
