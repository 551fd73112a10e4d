//! Google Gemini API provider implementation.
//!
//! Calls the native Gemini `generateContent` endpoint with a strict JSON
//! response schema and returns the model's text for normalization.
//!
//! Gemini specifics:
//! - Auth via `?key=API_KEY` query parameter (not header-based)
//! - Response text lives in `candidates[0].content.parts[].text`
//! - `generationConfig.responseMimeType = "application/json"` plus a
//!   `responseSchema` asks the model for schema-constrained JSON

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::provider::prompt::{research_prompt, response_schema};
use crate::provider::ResearchProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// The default Google Gemini API base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini API provider.
#[derive(Debug)]
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiProvider {
    /// Create a new Gemini provider from configuration.
    ///
    /// Reads the API key from `config.api_key`, falling back to the
    /// environment variable named in `config.api_key_env`. Returns
    /// `ProviderError::AuthFailed` if neither yields a key.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(&config.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ProviderError::AuthFailed {
                provider: format!("Gemini (env var '{}' not set)", config.api_key_env),
            })?;
        Self::new_with_key(config, api_key)
    }

    /// Create a new Gemini provider with an explicitly provided API key.
    pub fn new_with_key(config: &ProviderConfig, api_key: String) -> Result<Self, ProviderError> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| ProviderError::Connection {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.trim().to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Build the JSON request body for a schema-constrained generation.
    fn build_request_body(&self, topic: &str) -> Value {
        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": research_prompt(topic)}],
            }],
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_output_tokens,
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
            },
        })
    }

    /// Build the endpoint URL for a Gemini API call. The key is appended
    /// as a `?key=` query parameter.
    fn endpoint_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.base_url, self.model, method, self.api_key
        )
    }

    /// Extract the generated text from a Gemini response body.
    ///
    /// Concatenates every text part of the first candidate; multiple parts
    /// occur when the model splits long JSON output.
    fn parse_response(body: &Value) -> Result<String, ProviderError> {
        let candidates = body["candidates"]
            .as_array()
            .ok_or_else(|| ProviderError::ResponseParse {
                message: "Missing 'candidates' array in response".to_string(),
            })?;

        if candidates.is_empty() {
            return Err(ProviderError::ResponseParse {
                message: "Empty 'candidates' array in response".to_string(),
            });
        }

        let parts = candidates[0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| ProviderError::ResponseParse {
                message: "Missing 'parts' array in candidate content".to_string(),
            })?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect();

        if text.is_empty() {
            return Err(ProviderError::ResponseParse {
                message: "Candidate contained no text parts".to_string(),
            });
        }

        Ok(text)
    }

    /// Map an HTTP status code to the appropriate `ProviderError`.
    fn map_http_error(status: reqwest::StatusCode, body_text: &str) -> ProviderError {
        match status.as_u16() {
            401 | 403 => ProviderError::AuthFailed {
                provider: "Gemini".to_string(),
            },
            429 => ProviderError::RateLimited {
                retry_after_secs: 30,
            },
            _ => ProviderError::ApiRequest {
                message: format!("HTTP {} from Gemini API: {}", status, body_text),
            },
        }
    }
}

#[async_trait]
impl ResearchProvider for GeminiProvider {
    /// Perform a single generation call. No retry is attempted.
    async fn generate_raw(&self, topic: &str) -> Result<String, ProviderError> {
        let body = self.build_request_body(topic);
        let url = self.endpoint_url("generateContent");

        debug!(
            model = self.model.as_str(),
            "Sending Gemini research generation request"
        );

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::ApiRequest {
                message: format!("Request to Gemini API failed: {}", e),
            })?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| ProviderError::ResponseParse {
                message: format!("Failed to read response body: {}", e),
            })?;

        if !status.is_success() {
            return Err(Self::map_http_error(status, &body_text));
        }

        let response_json: Value =
            serde_json::from_str(&body_text).map_err(|e| ProviderError::ResponseParse {
                message: format!("Invalid JSON in response: {}", e),
            })?;

        Self::parse_response(&response_json)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
