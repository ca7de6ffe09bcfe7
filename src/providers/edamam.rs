use crate::config::ProviderConfig;
use crate::error::RecipeError;
use crate::matcher::Pantry;
use crate::model::{CuisineTag, IngredientLine, Nutrient, NutritionSource, ProviderRecipe, MAX_RECIPES};
use crate::providers::{check_status, require_credential, trim_base_url, RecipeProvider};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

const NAME: &str = "edamam";
const DEFAULT_BASE_URL: &str = "https://api.edamam.com";
const MAX_HITS: &str = "20";

/// Edamam nutrient codes and the names the normalizer looks for
const NUTRIENT_CODES: [(&str, &str); 3] = [
    ("PROCNT", "Protein"),
    ("CHOCDF", "Carbohydrates"),
    ("FAT", "Fat"),
];

/// Recipe aggregator: a single query returns complete recipes
pub struct EdamamProvider {
    client: Client,
    app_id: Option<String>,
    app_key: Option<String>,
    base_url: String,
}

impl EdamamProvider {
    /// Create a new Edamam provider from configuration
    pub fn new(client: Client, config: &ProviderConfig) -> Self {
        EdamamProvider {
            client,
            app_id: config.app_id.clone(),
            app_key: config.api_key.clone(),
            base_url: trim_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)),
        }
    }

    #[doc(hidden)]
    pub fn with_base_url(app_id: String, app_key: String, base_url: String) -> Self {
        EdamamProvider {
            client: Client::new(),
            app_id: Some(app_id),
            app_key: Some(app_key),
            base_url: trim_base_url(&base_url),
        }
    }
}

#[async_trait]
impl RecipeProvider for EdamamProvider {
    fn provider_name(&self) -> &str {
        NAME
    }

    async fn fetch_recipes(&self, pantry: &Pantry) -> Result<Vec<ProviderRecipe>, RecipeError> {
        let app_id = require_credential(self.app_id.as_deref(), "EDAMAM_APP_ID")?;
        let app_key = require_credential(self.app_key.as_deref(), "EDAMAM_APP_KEY")?;

        let query = pantry.joined(",");
        info!("Calling Edamam with ingredients: {}", query);

        let response = self
            .client
            .get(format!("{}/api/recipes/v2", self.base_url))
            .query(&[
                ("type", "public"),
                ("q", query.as_str()),
                ("app_id", app_id),
                ("app_key", app_key),
                ("to", MAX_HITS),
            ])
            .send()
            .await?;

        let response = check_status(NAME, response).await?;
        let body: Value = response.json().await?;
        debug!("{:?}", body);
        let hits: Vec<Hit> = match body.get("hits") {
            Some(hits @ Value::Array(_)) => serde_json::from_value(hits.clone())?,
            _ => Vec::new(),
        };

        if hits.is_empty() {
            return Err(RecipeError::NoMatch);
        }

        Ok(hits
            .into_iter()
            .take(MAX_RECIPES)
            .map(|hit| hit.recipe.into_provider_recipe())
            .collect())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Hit {
    recipe: EdamamRecipe,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EdamamRecipe {
    label: Option<String>,
    cuisine_type: Vec<String>,
    meal_type: Vec<String>,
    dish_type: Vec<String>,
    ingredient_lines: Vec<String>,
    total_nutrients: HashMap<String, TotalNutrient>,
    url: Option<String>,
    image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TotalNutrient {
    quantity: Value,
    unit: Option<String>,
}

impl EdamamRecipe {
    fn into_provider_recipe(mut self) -> ProviderRecipe {
        let cuisine = match (self.cuisine_type.first(), self.meal_type.first()) {
            (Some(cuisine), _) => CuisineTag::Cuisine(cuisine.clone()),
            (None, Some(meal_type)) => CuisineTag::MealType(meal_type.clone()),
            (None, None) => CuisineTag::Unknown,
        };

        let nutrients = NUTRIENT_CODES
            .iter()
            .filter_map(|(code, name)| {
                self.total_nutrients.remove(*code).map(|n| Nutrient {
                    name: name.to_string(),
                    amount: n.quantity.as_f64(),
                    unit: n.unit,
                })
            })
            .collect();

        ProviderRecipe {
            title: self.label,
            cuisine,
            ingredients: self
                .ingredient_lines
                .into_iter()
                .map(IngredientLine::new)
                .collect(),
            // Edamam links out to the source for instructions
            steps: Vec::new(),
            nutrition: NutritionSource::Nutrients(nutrients),
            dish_type: self.dish_type.into_iter().next(),
            pairing: None,
            source_url: self.url,
            image: self.image,
        }
    }
}
