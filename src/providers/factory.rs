use crate::config::AppConfig;
use crate::error::RecipeError;
use crate::providers::{
    EdamamProvider, FoodDataCentral, MealDbProvider, OpenAIProvider, RecipeProvider,
    SpoonacularProvider,
};
use reqwest::Client;
use std::time::Duration;

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration.
    ///
    /// Credentials are not validated here; a provider with a missing key
    /// reports `MissingCredential` on each request without calling upstream.
    pub fn create(
        provider_name: &str,
        config: &AppConfig,
    ) -> Result<Box<dyn RecipeProvider>, RecipeError> {
        let client = Self::http_client(config.timeout)?;
        let provider_config = config.provider_config(provider_name);

        match provider_name {
            "spoonacular" => Ok(Box::new(SpoonacularProvider::new(client, &provider_config))),
            "edamam" => Ok(Box::new(EdamamProvider::new(client, &provider_config))),
            "openai" => Ok(Box::new(OpenAIProvider::new(client, &provider_config))),
            "themealdb" => {
                let nutrition =
                    FoodDataCentral::from_config(client.clone(), &config.provider_config("usda"));
                Ok(Box::new(MealDbProvider::new(
                    client,
                    &provider_config,
                    nutrition,
                )))
            }
            _ => Err(RecipeError::Config(format!(
                "Unknown provider: {}",
                provider_name
            ))),
        }
    }

    /// Create the provider selected by `config.provider`
    pub fn get_default_provider(config: &AppConfig) -> Result<Box<dyn RecipeProvider>, RecipeError> {
        Self::create(&config.provider, config)
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["spoonacular", "themealdb", "openai", "edamam"]
    }

    /// Shared client; every upstream call is bounded by `timeout_secs`
    fn http_client(timeout_secs: u64) -> Result<Client, RecipeError> {
        Ok(Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    fn create_test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.providers.insert(
            "spoonacular".to_string(),
            ProviderConfig {
                api_key: Some("test-key".to_string()),
                ..Default::default()
            },
        );
        config
    }

    #[test]
    fn test_create_each_provider() {
        let config = create_test_config();
        for name in ProviderFactory::available_providers() {
            let provider = ProviderFactory::create(name, &config).unwrap();
            assert_eq!(provider.provider_name(), name);
        }
    }

    #[test]
    fn test_only_llm_provides_own_availability() {
        let config = create_test_config();
        for name in ProviderFactory::available_providers() {
            let provider = ProviderFactory::create(name, &config).unwrap();
            assert_eq!(provider.provides_own_availability(), name == "openai");
        }
    }

    #[test]
    fn test_create_unknown_provider() {
        let config = create_test_config();
        let result = ProviderFactory::create("unknown", &config);
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("Unknown provider"));
        }
    }

    #[test]
    fn test_get_default_provider() {
        let mut config = create_test_config();
        let provider = ProviderFactory::get_default_provider(&config).unwrap();
        assert_eq!(provider.provider_name(), "spoonacular");

        config.provider = "edamam".to_string();
        let provider = ProviderFactory::get_default_provider(&config).unwrap();
        assert_eq!(provider.provider_name(), "edamam");
    }

    #[test]
    fn test_available_providers() {
        let providers = ProviderFactory::available_providers();
        assert_eq!(providers.len(), 4);
        assert!(providers.contains(&"spoonacular"));
        assert!(providers.contains(&"themealdb"));
        assert!(providers.contains(&"openai"));
        assert!(providers.contains(&"edamam"));
    }
}
