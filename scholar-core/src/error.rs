//! Error types for the Scholar core.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering the provider, normalization, client, and configuration domains.

/// Top-level error type for the Scholar core library.
#[derive(Debug, thiserror::Error)]
pub enum ScholarError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Normalization error: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the generative AI provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API request failed: {message}")]
    ApiRequest { message: String },

    #[error("API response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Provider connection failed: {message}")]
    Connection { message: String },
}

/// Errors from normalizing a raw AI payload into a `ResearchResult`.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("The model returned an invalid JSON response, please try again.")]
    Malformed { detail: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Field '{field}' must be a string")]
    NotAString { field: String },

    #[error("Unrecognized comparison table shape: {message}")]
    UnknownTableShape { message: String },
}

/// Errors from the remote research client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{message}")]
    Service { status: u16, message: String },

    #[error("Request to research service failed: {message}")]
    Transport { message: String },

    #[error("Invalid response from research service: {message}")]
    ResponseParse { message: String },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not set: {var}")]
    EnvVarMissing { var: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// A type alias for results using the top-level `ScholarError`.
pub type Result<T> = std::result::Result<T, ScholarError>;
