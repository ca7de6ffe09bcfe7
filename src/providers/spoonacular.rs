use crate::config::ProviderConfig;
use crate::error::RecipeError;
use crate::matcher::Pantry;
use crate::model::{CuisineTag, IngredientLine, Nutrient, NutritionSource, ProviderRecipe, MAX_RECIPES};
use crate::providers::{check_status, require_credential, trim_base_url, RecipeProvider};
use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, info, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

const NAME: &str = "spoonacular";
const DEFAULT_BASE_URL: &str = "https://api.spoonacular.com";

/// Recipe search by ingredients, followed by one detail+nutrition call per hit
pub struct SpoonacularProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl SpoonacularProvider {
    /// Create a new Spoonacular provider from configuration
    pub fn new(client: Client, config: &ProviderConfig) -> Self {
        SpoonacularProvider {
            client,
            api_key: config.api_key.clone(),
            base_url: trim_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)),
        }
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        SpoonacularProvider {
            client: Client::new(),
            api_key: Some(api_key),
            base_url: trim_base_url(&base_url),
        }
    }

    async fn find_by_ingredients(
        &self,
        api_key: &str,
        pantry: &Pantry,
    ) -> Result<Vec<SearchHit>, RecipeError> {
        let number = MAX_RECIPES.to_string();
        let response = self
            .client
            .get(format!("{}/recipes/findByIngredients", self.base_url))
            .query(&[
                ("apiKey", api_key),
                ("ingredients", pantry.joined(",").as_str()),
                ("number", number.as_str()),
                ("ranking", "1"),
                ("ignorePantry", "true"),
            ])
            .send()
            .await?;

        let response = check_status(NAME, response).await?;
        let body: Value = response.json().await?;
        // Error envelopes such as {"status": "failure"} carry no result set
        match body {
            Value::Array(_) => Ok(serde_json::from_value(body)?),
            other => {
                debug!("Search returned no result list: {:?}", other);
                Ok(Vec::new())
            }
        }
    }

    async fn information(&self, api_key: &str, id: u64) -> Result<RecipeInformation, RecipeError> {
        let response = self
            .client
            .get(format!("{}/recipes/{}/information", self.base_url, id))
            .query(&[("includeNutrition", "true"), ("apiKey", api_key)])
            .send()
            .await?;

        let response = check_status(NAME, response).await?;
        let body: Value = response.json().await?;
        debug!("{:?}", body);
        Ok(serde_json::from_value(body)?)
    }
}

#[async_trait]
impl RecipeProvider for SpoonacularProvider {
    fn provider_name(&self) -> &str {
        NAME
    }

    async fn fetch_recipes(&self, pantry: &Pantry) -> Result<Vec<ProviderRecipe>, RecipeError> {
        let api_key = require_credential(self.api_key.as_deref(), "SPOONACULAR_API_KEY")?;

        info!("Calling Spoonacular with ingredients: {}", pantry.joined(", "));
        let hits = self.find_by_ingredients(api_key, pantry).await?;
        if hits.is_empty() {
            return Err(RecipeError::NoMatch);
        }

        let details = join_all(
            hits.iter()
                .take(MAX_RECIPES)
                .map(|hit| self.information(api_key, hit.id)),
        )
        .await;

        let mut recipes = Vec::new();
        let mut first_error = None;
        for (hit, detail) in hits.iter().zip(details) {
            match detail {
                Ok(detail) => recipes.push(detail.into_provider_recipe()),
                Err(e) => {
                    warn!("Skipping Spoonacular recipe {}: {}", hit.id, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if recipes.is_empty() => Err(e),
            _ => Ok(recipes),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RecipeInformation {
    title: Option<String>,
    cuisines: Vec<String>,
    dish_types: Vec<String>,
    extended_ingredients: Vec<ExtendedIngredient>,
    analyzed_instructions: Vec<AnalyzedInstruction>,
    nutrition: Option<Nutrition>,
    source_url: Option<String>,
    spoonacular_source_url: Option<String>,
    image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ExtendedIngredient {
    original_string: Option<String>,
    original: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AnalyzedInstruction {
    steps: Vec<InstructionStep>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InstructionStep {
    step: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Nutrition {
    nutrients: Vec<SpoonacularNutrient>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SpoonacularNutrient {
    name: String,
    amount: Value,
    unit: Option<String>,
}

impl RecipeInformation {
    fn into_provider_recipe(self) -> ProviderRecipe {
        let ingredients = self
            .extended_ingredients
            .into_iter()
            .map(|ing| {
                IngredientLine::new(
                    ing.original_string
                        .or(ing.original)
                        .or(ing.name)
                        .unwrap_or_default(),
                )
            })
            .collect();

        let steps = self
            .analyzed_instructions
            .into_iter()
            .next()
            .map(|instruction| {
                instruction
                    .steps
                    .into_iter()
                    .filter_map(|s| s.step)
                    .collect()
            })
            .unwrap_or_default();

        let nutrients = self
            .nutrition
            .map(|n| {
                n.nutrients
                    .into_iter()
                    .map(|n| Nutrient {
                        name: n.name,
                        amount: n.amount.as_f64(),
                        unit: n.unit,
                    })
                    .collect()
            })
            .unwrap_or_default();

        ProviderRecipe {
            title: self.title,
            cuisine: self
                .cuisines
                .into_iter()
                .next()
                .map(CuisineTag::Cuisine)
                .unwrap_or_default(),
            ingredients,
            steps,
            nutrition: NutritionSource::Nutrients(nutrients),
            dish_type: self.dish_types.into_iter().next(),
            pairing: None,
            source_url: self.source_url.or(self.spoonacular_source_url),
            image: self.image,
        }
    }
}
