//! HTTP client for the Scholar research service.
//!
//! Posts a topic to `/api/generate` and decodes the canonical
//! `ResearchResult`, turning non-success responses into `ClientError`
//! values carrying the service's own error message where one exists.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::types::ResearchResult;
use regex::Regex;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Client for one Scholar service endpoint.
pub struct ResearchClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ResearchClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ClientError::Transport {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Run one research generation for the given topic.
    pub async fn generate(&self, topic: &str) -> Result<ResearchResult, ClientError> {
        let url = format!("{}/api/generate", self.endpoint);
        debug!(%url, topic, "requesting research generation");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "topic": topic }))
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<Value>().await {
                Ok(body) => body
                    .get("error")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        "Failed to fetch research from the server.".to_string()
                    }),
                Err(_) => "An unknown server error occurred.".to_string(),
            };
            return Err(ClientError::Service {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<ResearchResult>()
            .await
            .map_err(|e| ClientError::ResponseParse {
                message: e.to_string(),
            })
    }
}

/// Reduce a raw error string to something fit for display.
///
/// Upstream API errors often arrive as prose wrapping a JSON blob. When
/// the string contains a JSON object with a nested `error.message` or
/// top-level `message`, that inner message is returned. Otherwise the
/// text before the first `{` is kept, with any `got status: NNN ... .`
/// fragment stripped. Falls back to the input when cleanup empties it.
pub fn clean_error_message(raw: &str) -> String {
    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}'))
        && start < end
        && let Ok(value) = serde_json::from_str::<Value>(&raw[start..=end])
    {
        if let Some(message) = value
            .pointer("/error/message")
            .or_else(|| value.get("message"))
            .and_then(Value::as_str)
        {
            return message.to_string();
        }
    }

    let prefix = raw.split('{').next().unwrap_or(raw);
    let cleaned = match Regex::new(r"(?i)got status: \d+.*?\. ") {
        Ok(re) => re.replace(prefix, "").trim().to_string(),
        Err(_) => prefix.trim().to_string(),
    };
    if cleaned.is_empty() {
        raw.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clean_extracts_nested_error_message() {
        let raw = r#"Request failed: {"error": {"code": 429, "message": "Quota exceeded for model.", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(clean_error_message(raw), "Quota exceeded for model.");
    }

    #[test]
    fn test_clean_extracts_top_level_message() {
        let raw = r#"{"message": "Upstream timed out."}"#;
        assert_eq!(clean_error_message(raw), "Upstream timed out.");
    }

    #[test]
    fn test_clean_strips_status_fragment() {
        let raw = "got status: 500 Internal Server Error. The model is overloaded";
        assert_eq!(clean_error_message(raw), "The model is overloaded");
    }

    #[test]
    fn test_clean_keeps_plain_messages() {
        let raw = "Research topic is required.";
        assert_eq!(clean_error_message(raw), raw);
    }

    #[test]
    fn test_clean_falls_back_when_cleanup_empties() {
        let raw = "{not valid json";
        assert_eq!(clean_error_message(raw), raw);
    }

    #[test]
    fn test_clean_truncates_at_unparseable_json() {
        let raw = "Something went wrong {\"partial\": ";
        assert_eq!(clean_error_message(raw), "Something went wrong");
    }

    #[test]
    fn test_endpoint_trailing_slash_is_trimmed() {
        let config = ClientConfig {
            endpoint: "http://localhost:8787/".to_string(),
            timeout_secs: 5,
        };
        let client = ResearchClient::new(&config).unwrap();
        assert_eq!(client.endpoint, "http://localhost:8787");
    }
}
