//! Configuration system for Scholar.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> overrides.
//! Configuration is loaded from `~/.config/scholar/config.toml` and/or `.scholar/config.toml`
//! in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration for the Scholar service and client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub server: ServerConfig,
    pub client: ClientConfig,
}

/// Configuration for the outbound generative AI provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Model identifier (e.g., "gemini-2.5-flash").
    pub model: String,
    /// Environment variable name containing the API key.
    pub api_key_env: String,
    /// Explicit API key; takes precedence over `api_key_env` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Optional base URL override for the API endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Sampling temperature. Low by default for factual output.
    pub temperature: f32,
    /// Maximum tokens to generate in a response.
    pub max_output_tokens: u32,
    /// HTTP client timeout for the single outbound call, in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.2,
            max_output_tokens: 8192,
            timeout_secs: 120,
        }
    }
}

/// Configuration for the HTTP service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Optional directory of static frontend assets to serve as fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontend_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
            frontend_dir: None,
        }
    }
}

/// Configuration for the remote research client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the research service.
    pub endpoint: String,
    /// HTTP client timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8787".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `SCHOLAR_`)
/// 3. Workspace-local config (`.scholar/config.toml`)
/// 4. User config (`~/.config/scholar/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&AppConfig>,
) -> Result<AppConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    // User-level config
    if let Some(config_dir) = directories::ProjectDirs::from("dev", "scholar", "scholar") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // Workspace-level config
    if let Some(ws) = workspace {
        let ws_config = ws.join(".scholar").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // Environment variables (SCHOLAR_PROVIDER__MODEL, SCHOLAR_SERVER__PORT, etc.)
    figment = figment.merge(Env::prefixed("SCHOLAR_").split("__"));

    // Explicit overrides
    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(Box::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.provider.model, "gemini-2.5-flash");
        assert_eq!(config.provider.api_key_env, "GEMINI_API_KEY");
        assert!((config.provider.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.client.endpoint, "http://127.0.0.1:8787");
    }

    #[test]
    fn test_load_config_defaults_without_files() {
        let tmp = tempfile::tempdir().unwrap();
        let config = load_config(Some(tmp.path()), None).unwrap();
        assert_eq!(config.provider.model, "gemini-2.5-flash");
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_workspace_config_overrides_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".scholar");
        std::fs::create_dir_all(&dir).unwrap();
        let mut f = std::fs::File::create(dir.join("config.toml")).unwrap();
        writeln!(f, "[server]\nport = 9001\nhost = \"0.0.0.0\"").unwrap();

        let config = load_config(Some(tmp.path()), None).unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.host, "0.0.0.0");
        // Untouched sections keep their defaults.
        assert_eq!(config.provider.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_explicit_overrides_win() {
        let tmp = tempfile::tempdir().unwrap();
        let overrides = AppConfig {
            provider: ProviderConfig {
                model: "gemini-2.0-flash".into(),
                ..ProviderConfig::default()
            },
            ..AppConfig::default()
        };
        let config = load_config(Some(tmp.path()), Some(&overrides)).unwrap();
        assert_eq!(config.provider.model, "gemini-2.0-flash");
    }
}
