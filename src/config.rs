use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Provider answering recipe requests
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Per-call upstream timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Credentials and endpoint overrides for one upstream
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProviderConfig {
    /// API key or app key
    pub api_key: Option<String>,
    /// Application id (Edamam specific)
    pub app_id: Option<String>,
    /// Base URL override, mostly for proxies and tests
    pub base_url: Option<String>,
    /// Model identifier (chat completion specific)
    pub model: Option<String>,
    /// Temperature for generation (0.0-1.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

/// Address the HTTP server binds to
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            providers: HashMap::new(),
            timeout: default_timeout(),
            server: ServerConfig::default(),
        }
    }
}

// Default value functions
fn default_provider() -> String {
    "spoonacular".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Plain environment variables honoured when the structured config leaves a gap.
/// Entries are (variable, provider, field).
const LEGACY_ENV_VARS: &[(&str, &str, ProviderField)] = &[
    ("SPOONACULAR_API_KEY", "spoonacular", ProviderField::ApiKey),
    ("EDAMAM_APP_ID", "edamam", ProviderField::AppId),
    ("EDAMAM_APP_KEY", "edamam", ProviderField::ApiKey),
    ("OPENAI_API_KEY", "openai", ProviderField::ApiKey),
    ("OPENAI_BASE_URL", "openai", ProviderField::BaseUrl),
    ("OPENAI_MODEL", "openai", ProviderField::Model),
    ("MEALDB_API_KEY", "themealdb", ProviderField::ApiKey),
    ("USDA_API_KEY", "usda", ProviderField::ApiKey),
];

#[derive(Debug, Clone, Copy)]
enum ProviderField {
    ApiKey,
    AppId,
    BaseUrl,
    Model,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with PANTRY__ prefix
    /// 2. config.toml file in current directory
    /// 3. Plain provider variables such as SPOONACULAR_API_KEY
    /// 4. Default values
    ///
    /// Environment variable format: PANTRY__PROVIDERS__SPOONACULAR__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// Settings for `name`, or an empty entry when it is not configured
    pub fn provider_config(&self, name: &str) -> ProviderConfig {
        self.providers.get(name).cloned().unwrap_or_default()
    }

    /// Fill unset provider fields from plain variables resolved by `lookup`
    pub fn apply_env_fallbacks<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (var, provider, field) in LEGACY_ENV_VARS {
            let Some(value) = lookup(*var).filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            let entry = self.providers.entry(provider.to_string()).or_default();
            let slot = match field {
                ProviderField::ApiKey => &mut entry.api_key,
                ProviderField::AppId => &mut entry.app_id,
                ProviderField::BaseUrl => &mut entry.base_url,
                ProviderField::Model => &mut entry.model,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
    }
}

/// Load configuration from file and environment variables
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: PANTRY__PROVIDERS__EDAMAM__APP_ID
        .add_source(
            Environment::with_prefix("PANTRY")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;
    config.apply_env_fallbacks(|var| std::env::var(var).ok());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "spoonacular");
        assert_eq!(config.timeout, 30);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_deserialize_from_toml() {
        let toml = r#"
            provider = "edamam"
            timeout = 5

            [server]
            port = 9000

            [providers.edamam]
            app_id = "abc"
            api_key = "secret"
        "#;

        let config: AppConfig = Config::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.provider, "edamam");
        assert_eq!(config.timeout, 5);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        let edamam = config.provider_config("edamam");
        assert_eq!(edamam.app_id.as_deref(), Some("abc"));
        assert_eq!(edamam.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_env_fallbacks_fill_only_gaps() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "spoonacular".to_string(),
            ProviderConfig {
                api_key: Some("from-file".to_string()),
                ..Default::default()
            },
        );

        config.apply_env_fallbacks(|var| match var {
            "SPOONACULAR_API_KEY" => Some("from-env".to_string()),
            "USDA_API_KEY" => Some("usda-key".to_string()),
            "OPENAI_API_KEY" => Some("   ".to_string()),
            _ => None,
        });

        assert_eq!(
            config.provider_config("spoonacular").api_key.as_deref(),
            Some("from-file")
        );
        assert_eq!(
            config.provider_config("usda").api_key.as_deref(),
            Some("usda-key")
        );
        assert!(!config.providers.contains_key("openai"));
    }

    #[test]
    fn test_provider_config_missing_is_empty() {
        let config = AppConfig::default();
        let missing = config.provider_config("edamam");
        assert!(missing.api_key.is_none());
        assert!(missing.base_url.is_none());
    }
}
