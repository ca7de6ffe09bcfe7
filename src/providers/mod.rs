mod edamam;
mod factory;
mod open_ai;
mod prompt;
mod spoonacular;
mod themealdb;
mod usda;

pub use edamam::EdamamProvider;
pub use factory::ProviderFactory;
pub use open_ai::OpenAIProvider;
pub use prompt::{build_generation_prompt, RECIPE_GENERATOR_PROMPT};
pub use spoonacular::SpoonacularProvider;
pub use themealdb::MealDbProvider;
pub use usda::FoodDataCentral;

use crate::error::RecipeError;
use crate::matcher::Pantry;
use crate::model::ProviderRecipe;
use async_trait::async_trait;
use log::error;
use reqwest::{Response, StatusCode};

/// Unified trait for all recipe providers
#[async_trait]
pub trait RecipeProvider: Send + Sync {
    /// Get the provider name (e.g., "spoonacular", "edamam")
    fn provider_name(&self) -> &str;

    /// Whether records already carry per-ingredient availability flags,
    /// in which case the pantry matcher is skipped
    fn provides_own_availability(&self) -> bool {
        false
    }

    /// Look up recipes for the user's pantry
    async fn fetch_recipes(&self, pantry: &Pantry) -> Result<Vec<ProviderRecipe>, RecipeError>;
}

/// Pass a successful response through, classify anything else
pub(crate) async fn check_status(
    provider: &str,
    response: Response,
) -> Result<Response, RecipeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!("{} API error: {} {}", provider, status, body);

    Err(match status {
        StatusCode::TOO_MANY_REQUESTS => RecipeError::RateLimited {
            provider: provider.to_string(),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RecipeError::AuthFailed {
            provider: provider.to_string(),
            status: status.as_u16(),
        },
        _ => RecipeError::Upstream {
            provider: provider.to_string(),
            status: status.as_u16(),
            body,
        },
    })
}

/// Require a configured, non-blank credential
pub(crate) fn require_credential<'a>(
    value: Option<&'a str>,
    variable: &'static str,
) -> Result<&'a str, RecipeError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(RecipeError::MissingCredential(variable))
}

pub(crate) fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
