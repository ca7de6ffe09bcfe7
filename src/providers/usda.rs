use crate::config::ProviderConfig;
use crate::error::RecipeError;
use crate::model::{Nutrient, NutritionSource};
use crate::providers::{check_status, trim_base_url};
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

const NAME: &str = "usda";
const DEFAULT_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";

/// Keyed nutrition search against USDA FoodData Central
pub struct FoodDataCentral {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FoodDataCentral {
    /// Build a client when an API key is configured
    pub fn from_config(client: Client, config: &ProviderConfig) -> Option<Self> {
        let api_key = config.api_key.clone().filter(|k| !k.trim().is_empty())?;
        Some(FoodDataCentral {
            client,
            api_key,
            base_url: trim_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        FoodDataCentral {
            client: Client::new(),
            api_key,
            base_url: trim_base_url(&base_url),
        }
    }

    /// Nutrients of the best match for `query`; empty when nothing matched
    pub async fn search(&self, query: &str) -> Result<Vec<Nutrient>, RecipeError> {
        let response = self
            .client
            .get(format!("{}/foods/search", self.base_url))
            .query(&[("query", query), ("pageSize", "1"), ("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let response = check_status(NAME, response).await?;
        let body: Value = response.json().await?;
        debug!("{:?}", body);
        let result: SearchResult = serde_json::from_value(body)?;

        Ok(result
            .foods
            .into_iter()
            .next()
            .map(|food| {
                food.food_nutrients
                    .into_iter()
                    .map(|n| Nutrient {
                        name: n.nutrient_name,
                        amount: n.value.as_f64(),
                        unit: n.unit_name,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Like [`search`](Self::search), degrading any failure to unavailable figures
    pub async fn nutrition_for(&self, dish: &str) -> NutritionSource {
        match self.search(dish).await {
            Ok(nutrients) if !nutrients.is_empty() => NutritionSource::Nutrients(nutrients),
            Ok(_) => NutritionSource::Unavailable,
            Err(e) => {
                warn!("Nutrition lookup for '{}' failed: {}", dish, e);
                NutritionSource::Unavailable
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResult {
    foods: Vec<Food>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Food {
    food_nutrients: Vec<FoodNutrient>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FoodNutrient {
    nutrient_name: String,
    value: Value,
    unit_name: Option<String>,
}
