use serde::{Deserialize, Serialize};

/// Upper bound on recipes returned for one request
pub const MAX_RECIPES: usize = 4;

/// Sentinel for an unknown or non-numeric nutrient figure
pub const NOT_AVAILABLE: &str = "N/A";

/// A recipe ingredient line and whether the user already has it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAvailability {
    pub name: String,
    pub available: bool,
}

/// Display-only macro-nutrient figures, e.g. `"15g"` or `"N/A"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionSummary {
    pub protein: String,
    pub carbohydrate: String,
    pub fat: String,
}

impl NutritionSummary {
    pub fn unavailable() -> Self {
        NutritionSummary {
            protein: NOT_AVAILABLE.to_string(),
            carbohydrate: NOT_AVAILABLE.to_string(),
            fat: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Canonical recipe shape consumed by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub cuisine: String,
    pub title: String,
    pub ingredients: Vec<IngredientAvailability>,
    pub preparation: Vec<String>,
    pub nutrition: NutritionSummary,
    pub pairing: Option<String>,
    pub source_url: Option<String>,
    pub image: Option<String>,
}

/// Successful response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub recipes: Vec<Recipe>,
}

/// Error response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Incoming request body
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub ingredients: Option<serde_json::Value>,
}

/// Provider-neutral record every adapter produces before normalization
#[derive(Debug, Clone, Default)]
pub struct ProviderRecipe {
    pub title: Option<String>,
    pub cuisine: CuisineTag,
    pub ingredients: Vec<IngredientLine>,
    pub steps: Vec<String>,
    pub nutrition: NutritionSource,
    pub dish_type: Option<String>,
    pub pairing: Option<String>,
    pub source_url: Option<String>,
    pub image: Option<String>,
}

/// Where a cuisine label comes from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CuisineTag {
    /// Cuisine or area tag, rendered with the cuisine suffix
    Cuisine(String),
    /// Meal-type tag used when no cuisine is known, rendered capitalized
    MealType(String),
    /// Ready-made label, rendered verbatim
    Label(String),
    #[default]
    Unknown,
}

/// One raw ingredient line, optionally carrying the provider's own verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientLine {
    pub name: String,
    pub available: Option<bool>,
}

impl IngredientLine {
    pub fn new(name: impl Into<String>) -> Self {
        IngredientLine {
            name: name.into(),
            available: None,
        }
    }
}

/// Nutrition data as supplied by a provider
#[derive(Debug, Clone, Default, PartialEq)]
pub enum NutritionSource {
    /// Named nutrient amounts to be picked and formatted
    Nutrients(Vec<Nutrient>),
    /// Figures already formatted upstream
    Formatted(NutritionSummary),
    #[default]
    Unavailable,
}

/// A named nutrient amount as reported upstream
#[derive(Debug, Clone, PartialEq)]
pub struct Nutrient {
    pub name: String,
    pub amount: Option<f64>,
    pub unit: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_serializes_camel_case_with_nulls() {
        let recipe = Recipe {
            cuisine: "Dünya Mutfağı".to_string(),
            title: "Menemen".to_string(),
            ingredients: vec![IngredientAvailability {
                name: "2 domates".to_string(),
                available: true,
            }],
            preparation: vec!["Pişirin.".to_string()],
            nutrition: NutritionSummary::unavailable(),
            pairing: None,
            source_url: None,
            image: Some("https://example.com/menemen.jpg".to_string()),
        };

        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(value["sourceUrl"], serde_json::Value::Null);
        assert_eq!(value["pairing"], serde_json::Value::Null);
        assert_eq!(value["image"], "https://example.com/menemen.jpg");
        assert_eq!(value["nutrition"]["carbohydrate"], "N/A");
        assert_eq!(value["ingredients"][0]["available"], true);
    }

    #[test]
    fn test_error_response_has_single_key() {
        let value = serde_json::to_value(ErrorResponse {
            error: "Lütfen malzeme listesi girin".to_string(),
        })
        .unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object.contains_key("error"));
    }
}
