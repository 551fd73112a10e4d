//! # Scholar Core
//!
//! Core library for the Scholar research assistant.
//! Provides the Gemini provider, response normalization, notebook
//! serialization, configuration, and the remote research client.

pub mod client;
pub mod config;
pub mod error;
pub mod normalize;
pub mod notebook;
pub mod provider;
pub mod types;

// Re-export commonly used types at the crate root.
pub use client::{ResearchClient, clean_error_message};
pub use config::{AppConfig, ClientConfig, ProviderConfig, ServerConfig, load_config};
pub use error::{
    ClientError, ConfigError, NormalizeError, ProviderError, Result, ScholarError,
};
pub use normalize::{extract_json, normalize};
pub use notebook::{Notebook, notebook_filename};
pub use provider::{GeminiProvider, MockResearchProvider, ResearchProvider};
pub use types::{ComparisonRow, NA, ResearchResult};
