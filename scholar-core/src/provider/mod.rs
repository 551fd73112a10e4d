//! Generative AI provider interface.
//!
//! One trait seam between the HTTP service and the hosted model API, so the
//! request handler is testable without network access.

pub mod gemini;
pub mod prompt;

use crate::error::ProviderError;
use async_trait::async_trait;
use std::sync::Mutex;

pub use gemini::GeminiProvider;

/// A provider capable of generating raw structured research output
/// for a topic. The returned string is the model's text, which may or
/// may not be clean JSON; normalization happens downstream.
#[async_trait]
pub trait ResearchProvider: Send + Sync {
    /// Perform exactly one generation call for the topic.
    async fn generate_raw(&self, topic: &str) -> Result<String, ProviderError>;

    /// Return the model name.
    fn model_name(&self) -> &str;
}

/// Mock provider for testing. Returns queued responses in order, or a
/// configured error.
pub struct MockResearchProvider {
    responses: Mutex<Vec<String>>,
    error_message: Option<String>,
}

impl MockResearchProvider {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            error_message: None,
        }
    }

    /// Create a mock that always returns the given raw text.
    ///
    /// Queues multiple copies of the response so it can handle multiple calls.
    pub fn with_response(raw: &str) -> Self {
        let provider = Self::new();
        for _ in 0..20 {
            provider.queue_response(raw);
        }
        provider
    }

    /// Create a mock whose every call fails with an API request error.
    pub fn with_error(message: &str) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            error_message: Some(message.to_string()),
        }
    }

    /// Queue a raw response to be returned by the next `generate_raw` call.
    pub fn queue_response(&self, raw: &str) {
        self.responses.lock().unwrap().push(raw.to_string());
    }
}

impl Default for MockResearchProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResearchProvider for MockResearchProvider {
    async fn generate_raw(&self, _topic: &str) -> Result<String, ProviderError> {
        if let Some(message) = &self.error_message {
            return Err(ProviderError::ApiRequest {
                message: message.clone(),
            });
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok("{}".to_string());
        }
        Ok(responses.remove(0))
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
