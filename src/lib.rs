pub mod config;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod providers;
pub mod server;

pub use crate::config::{AppConfig, ProviderConfig};
pub use crate::error::RecipeError;
pub use crate::matcher::{is_available, tokenize, Pantry};
pub use crate::model::{IngredientAvailability, NutritionSummary, Recipe, RecipeResponse, MAX_RECIPES};
pub use crate::providers::{ProviderFactory, RecipeProvider};

use log::info;

/// Suggest up to four recipes for a free-text ingredient list.
///
/// Ingredients are separated by commas or newlines. Blank input is rejected
/// before any provider is called.
///
/// # Example
/// ```no_run
/// use pantry_recipes::{suggest_recipes, AppConfig, ProviderFactory};
///
/// # async fn run() -> Result<(), pantry_recipes::RecipeError> {
/// let config = AppConfig::load()?;
/// let provider = ProviderFactory::get_default_provider(&config)?;
/// let recipes = suggest_recipes(provider.as_ref(), "domates, soğan, biber").await?;
/// println!("{} recipes", recipes.len());
/// # Ok(())
/// # }
/// ```
pub async fn suggest_recipes(
    provider: &dyn RecipeProvider,
    raw_ingredients: &str,
) -> Result<Vec<Recipe>, RecipeError> {
    if raw_ingredients.trim().is_empty() {
        return Err(RecipeError::InvalidInput("ingredients are blank".to_string()));
    }

    let pantry = Pantry::parse(raw_ingredients);
    if pantry.is_empty() {
        return Err(RecipeError::InvalidInput(
            "no ingredients left after splitting".to_string(),
        ));
    }

    let records = provider.fetch_recipes(&pantry).await?;
    let own_availability = provider.provides_own_availability();

    let recipes: Vec<Recipe> = records
        .into_iter()
        .take(MAX_RECIPES)
        .map(|record| normalize::normalize(record, &pantry, own_availability))
        .collect();

    if recipes.is_empty() {
        return Err(RecipeError::NoMatch);
    }

    info!(
        "Returning {} recipes from {}",
        recipes.len(),
        provider.provider_name()
    );
    Ok(recipes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IngredientLine, ProviderRecipe};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        records: usize,
        own_availability: bool,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(records: usize) -> Self {
            StubProvider {
                records,
                own_availability: false,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RecipeProvider for StubProvider {
        fn provider_name(&self) -> &str {
            "stub"
        }

        fn provides_own_availability(&self) -> bool {
            self.own_availability
        }

        async fn fetch_recipes(
            &self,
            _pantry: &Pantry,
        ) -> Result<Vec<ProviderRecipe>, RecipeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((0..self.records)
                .map(|i| ProviderRecipe {
                    title: Some(format!("Tarif {}", i)),
                    ingredients: vec![
                        IngredientLine {
                            name: "1 adet domates".to_string(),
                            available: Some(false),
                        },
                        IngredientLine {
                            name: "kıyma".to_string(),
                            available: Some(true),
                        },
                    ],
                    ..Default::default()
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_caps_at_four_recipes() {
        let provider = StubProvider::new(7);
        let recipes = suggest_recipes(&provider, "domates").await.unwrap();
        assert_eq!(recipes.len(), MAX_RECIPES);
    }

    #[tokio::test]
    async fn test_runs_matcher_unless_provider_supplies_flags() {
        let provider = StubProvider::new(1);
        let recipes = suggest_recipes(&provider, "Domates").await.unwrap();
        assert!(recipes[0].ingredients[0].available);
        assert!(!recipes[0].ingredients[1].available);

        let provider = StubProvider {
            own_availability: true,
            ..StubProvider::new(1)
        };
        let recipes = suggest_recipes(&provider, "Domates").await.unwrap();
        assert!(!recipes[0].ingredients[0].available);
        assert!(recipes[0].ingredients[1].available);
    }

    #[tokio::test]
    async fn test_blank_input_never_reaches_provider() {
        let provider = StubProvider::new(1);
        for input in ["", "   ", " ,\n, "] {
            let result = suggest_recipes(&provider, input).await;
            assert!(matches!(result, Err(RecipeError::InvalidInput(_))));
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_provider_result_is_no_match() {
        let provider = StubProvider::new(0);
        let result = suggest_recipes(&provider, "domates").await;
        assert!(matches!(result, Err(RecipeError::NoMatch)));
    }
}
