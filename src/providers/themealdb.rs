use crate::config::ProviderConfig;
use crate::error::RecipeError;
use crate::matcher::Pantry;
use crate::model::{CuisineTag, IngredientLine, NutritionSource, ProviderRecipe, MAX_RECIPES};
use crate::providers::{check_status, trim_base_url, FoodDataCentral, RecipeProvider};
use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, info, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

const NAME: &str = "themealdb";
const DEFAULT_BASE_URL: &str = "https://www.themealdb.com/api/json/v1";
/// Public test key accepted by the free tier
const DEFAULT_API_KEY: &str = "1";
/// TheMealDB numbers ingredient/measure pairs strIngredient1..strIngredient20
const MAX_INGREDIENT_SLOTS: usize = 20;

/// Free meal database. Only the first pantry entry is used for filtering,
/// the upstream cannot filter by several ingredients at once.
pub struct MealDbProvider {
    client: Client,
    api_key: String,
    base_url: String,
    nutrition: Option<FoodDataCentral>,
}

impl MealDbProvider {
    /// Create a new TheMealDB provider; `nutrition` is optional
    pub fn new(client: Client, config: &ProviderConfig, nutrition: Option<FoodDataCentral>) -> Self {
        if nutrition.is_none() {
            warn!("USDA_API_KEY not configured, nutrition figures will be N/A");
        }
        MealDbProvider {
            client,
            api_key: config
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_KEY.to_string()),
            base_url: trim_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)),
            nutrition,
        }
    }

    #[doc(hidden)]
    pub fn with_base_url(base_url: String, nutrition: Option<FoodDataCentral>) -> Self {
        MealDbProvider {
            client: Client::new(),
            api_key: DEFAULT_API_KEY.to_string(),
            base_url: trim_base_url(&base_url),
            nutrition,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.api_key, path)
    }

    async fn filter_by_ingredient(&self, ingredient: &str) -> Result<Vec<String>, RecipeError> {
        let response = self
            .client
            .get(self.endpoint("filter.php"))
            .query(&[("i", ingredient)])
            .send()
            .await?;

        let response = check_status(NAME, response).await?;
        let body: MealsEnvelope = response.json().await?;
        Ok(body
            .meals
            .unwrap_or_default()
            .iter()
            .filter_map(|meal| text_field(meal, "idMeal"))
            .collect())
    }

    async fn lookup(&self, id: &str) -> Result<Option<Map<String, Value>>, RecipeError> {
        let response = self
            .client
            .get(self.endpoint("lookup.php"))
            .query(&[("i", id)])
            .send()
            .await?;

        let response = check_status(NAME, response).await?;
        let body: Value = response.json().await?;
        debug!("{:?}", body);
        let envelope: MealsEnvelope = serde_json::from_value(body)?;
        Ok(envelope.meals.and_then(|meals| meals.into_iter().next()))
    }

    async fn recipe(&self, id: &str) -> Result<Option<ProviderRecipe>, RecipeError> {
        let Some(meal) = self.lookup(id).await? else {
            return Ok(None);
        };

        let nutrition = match (&self.nutrition, text_field(&meal, "strMeal")) {
            (Some(usda), Some(title)) => usda.nutrition_for(&title).await,
            _ => NutritionSource::Unavailable,
        };

        Ok(Some(meal_to_recipe(&meal, nutrition)))
    }
}

#[async_trait]
impl RecipeProvider for MealDbProvider {
    fn provider_name(&self) -> &str {
        NAME
    }

    async fn fetch_recipes(&self, pantry: &Pantry) -> Result<Vec<ProviderRecipe>, RecipeError> {
        let first = pantry
            .first()
            .ok_or_else(|| RecipeError::InvalidInput("empty pantry".to_string()))?;

        info!("Calling TheMealDB with ingredient: {}", first);
        let ids = self.filter_by_ingredient(first).await?;
        if ids.is_empty() {
            return Err(RecipeError::NoMatch);
        }

        let results = join_all(ids.iter().take(MAX_RECIPES).map(|id| self.recipe(id))).await;

        let mut recipes = Vec::new();
        let mut first_error = None;
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(Some(recipe)) => recipes.push(recipe),
                Ok(None) => warn!("TheMealDB returned no details for meal {}", id),
                Err(e) => {
                    warn!("Skipping TheMealDB meal {}: {}", id, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if recipes.is_empty() => Err(e),
            _ if recipes.is_empty() => Err(RecipeError::NoMatch),
            _ => Ok(recipes),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MealsEnvelope {
    meals: Option<Vec<Map<String, Value>>>,
}

/// Trimmed, non-empty string field
fn text_field(meal: &Map<String, Value>, key: &str) -> Option<String> {
    meal.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn meal_to_recipe(meal: &Map<String, Value>, nutrition: NutritionSource) -> ProviderRecipe {
    let ingredients = (1..=MAX_INGREDIENT_SLOTS)
        .filter_map(|slot| {
            let ingredient = text_field(meal, &format!("strIngredient{}", slot))?;
            let line = match text_field(meal, &format!("strMeasure{}", slot)) {
                Some(measure) => format!("{} {}", measure, ingredient),
                None => ingredient,
            };
            Some(IngredientLine::new(line))
        })
        .collect();

    let steps = text_field(meal, "strInstructions")
        .map(|instructions| split_instructions(&instructions))
        .unwrap_or_default();

    ProviderRecipe {
        title: text_field(meal, "strMeal"),
        cuisine: text_field(meal, "strArea")
            .filter(|area| !area.eq_ignore_ascii_case("unknown"))
            .map(CuisineTag::Cuisine)
            .unwrap_or_default(),
        ingredients,
        steps,
        nutrition,
        dish_type: text_field(meal, "strCategory"),
        pairing: None,
        source_url: text_field(meal, "strSource").or_else(|| text_field(meal, "strYoutube")),
        image: text_field(meal, "strMealThumb"),
    }
}

/// One step per non-empty line, dropping bare "STEP 3" style headings
fn split_instructions(instructions: &str) -> Vec<String> {
    instructions
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_step_heading(line))
        .map(str::to_string)
        .collect()
}

fn is_step_heading(line: &str) -> bool {
    let lower = line.to_lowercase();
    match lower.strip_prefix("step") {
        Some(rest) => {
            let rest = rest.trim();
            !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const LOOKUP: &str = r#"{"meals": [{
        "idMeal": "52772",
        "strMeal": "Teriyaki Chicken Casserole",
        "strCategory": "Chicken",
        "strArea": "Japanese",
        "strInstructions": "STEP 1\r\nPreheat oven to 350.\r\n\r\nSTEP 2\r\nCombine soy sauce and water.",
        "strMealThumb": "https://www.themealdb.com/images/media/meals/wvpsxx1468256321.jpg",
        "strYoutube": "https://www.youtube.com/watch?v=4aZr5hZXP_s",
        "strSource": "",
        "strIngredient1": "soy sauce",
        "strMeasure1": "3/4 cup",
        "strIngredient2": "chicken breasts",
        "strMeasure2": " ",
        "strIngredient3": "",
        "strMeasure3": "",
        "strIngredient4": null
    }]}"#;

    #[test]
    fn test_meal_mapping() {
        let envelope: MealsEnvelope = serde_json::from_str(LOOKUP).unwrap();
        let meal = envelope.meals.unwrap().remove(0);
        let recipe = meal_to_recipe(&meal, NutritionSource::Unavailable);

        assert_eq!(recipe.title.as_deref(), Some("Teriyaki Chicken Casserole"));
        assert_eq!(recipe.cuisine, CuisineTag::Cuisine("Japanese".to_string()));
        assert_eq!(
            recipe.ingredients,
            vec![
                IngredientLine::new("3/4 cup soy sauce"),
                IngredientLine::new("chicken breasts"),
            ]
        );
        assert_eq!(
            recipe.steps,
            vec!["Preheat oven to 350.", "Combine soy sauce and water."]
        );
        assert_eq!(recipe.dish_type.as_deref(), Some("Chicken"));
        assert_eq!(
            recipe.source_url.as_deref(),
            Some("https://www.youtube.com/watch?v=4aZr5hZXP_s")
        );
    }

    #[test]
    fn test_unknown_area_has_no_cuisine() {
        let mut meal = Map::new();
        meal.insert("strArea".to_string(), Value::String("Unknown".to_string()));
        let recipe = meal_to_recipe(&meal, NutritionSource::Unavailable);
        assert_eq!(recipe.cuisine, CuisineTag::Unknown);
    }

    #[test]
    fn test_step_heading_detection() {
        assert!(is_step_heading("STEP 12"));
        assert!(is_step_heading("step 1"));
        assert!(!is_step_heading("Step into the kitchen"));
        assert!(!is_step_heading("Stew the beans"));
    }

    #[tokio::test]
    async fn test_fetch_recipes_filters_by_first_ingredient() {
        let mut server = Server::new_async().await;
        let filter = server
            .mock("GET", "/1/filter.php")
            .match_query(Matcher::UrlEncoded("i".into(), "chicken".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"meals": [{"idMeal": "52772", "strMeal": "Teriyaki Chicken Casserole"}]}"#)
            .create_async()
            .await;
        let lookup = server
            .mock("GET", "/1/lookup.php")
            .match_query(Matcher::UrlEncoded("i".into(), "52772".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(LOOKUP)
            .create_async()
            .await;

        let provider = MealDbProvider::with_base_url(server.url(), None);
        let recipes = provider
            .fetch_recipes(&Pantry::parse("chicken, soy sauce"))
            .await
            .unwrap();

        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].nutrition, NutritionSource::Unavailable);
        filter.assert_async().await;
        lookup.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_recipes_with_nutrition_lookup() {
        let mut server = Server::new_async().await;
        let _filter = server
            .mock("GET", "/1/filter.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"meals": [{"idMeal": "52772"}]}"#)
            .create_async()
            .await;
        let _lookup = server
            .mock("GET", "/1/lookup.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(LOOKUP)
            .create_async()
            .await;
        let usda_mock = server
            .mock("GET", "/fdc/foods/search")
            .match_query(Matcher::UrlEncoded(
                "query".into(),
                "Teriyaki Chicken Casserole".into(),
            ))
            .with_status(200)
            .with_body(
                r#"{"foods": [{"foodNutrients": [
                    {"nutrientName": "Protein", "value": 21.3, "unitName": "G"}
                ]}]}"#,
            )
            .create_async()
            .await;

        let usda = FoodDataCentral::with_base_url("usda-key".to_string(), format!("{}/fdc", server.url()));
        let provider = MealDbProvider::with_base_url(server.url(), Some(usda));
        let recipes = provider
            .fetch_recipes(&Pantry::parse("chicken"))
            .await
            .unwrap();

        match &recipes[0].nutrition {
            NutritionSource::Nutrients(nutrients) => assert_eq!(nutrients[0].amount, Some(21.3)),
            other => panic!("unexpected nutrition {:?}", other),
        }
        usda_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_null_meals_is_no_match() {
        let mut server = Server::new_async().await;
        let _filter = server
            .mock("GET", "/1/filter.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"meals": null}"#)
            .create_async()
            .await;

        let provider = MealDbProvider::with_base_url(server.url(), None);
        let result = provider.fetch_recipes(&Pantry::parse("unobtainium")).await;
        assert!(matches!(result, Err(RecipeError::NoMatch)));
    }

    #[test]
    fn test_provider_name() {
        let provider = MealDbProvider::with_base_url("http://x".to_string(), None);
        assert_eq!(provider.provider_name(), "themealdb");
    }
}
