use crate::config::ProviderConfig;
use crate::error::RecipeError;
use crate::matcher::Pantry;
use crate::model::{
    CuisineTag, IngredientLine, NutritionSource, NutritionSummary, ProviderRecipe, MAX_RECIPES,
    NOT_AVAILABLE,
};
use crate::providers::{
    build_generation_prompt, check_status, require_credential, trim_base_url, RecipeProvider,
    RECIPE_GENERATOR_PROMPT,
};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde_json::{json, Value};

const NAME: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.8;
const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Chat-completion backed generator. Works with any OpenAI-compatible endpoint.
pub struct OpenAIProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider from configuration
    pub fn new(client: Client, config: &ProviderConfig) -> Self {
        OpenAIProvider {
            client,
            api_key: config.api_key.clone(),
            base_url: trim_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: config.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        }
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        OpenAIProvider {
            client: Client::new(),
            api_key: Some(api_key),
            base_url: trim_base_url(&base_url),
            model,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[async_trait]
impl RecipeProvider for OpenAIProvider {
    fn provider_name(&self) -> &str {
        NAME
    }

    fn provides_own_availability(&self) -> bool {
        true
    }

    async fn fetch_recipes(&self, pantry: &Pantry) -> Result<Vec<ProviderRecipe>, RecipeError> {
        let api_key = require_credential(self.api_key.as_deref(), "OPENAI_API_KEY")?;

        info!("Generating recipes with {} for: {}", self.model, pantry.joined(", "));
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": RECIPE_GENERATOR_PROMPT},
                    {"role": "user", "content": build_generation_prompt(pantry)}
                ],
                "temperature": self.temperature,
                "max_tokens": self.max_tokens
            }))
            .send()
            .await?;

        let response = check_status(NAME, response).await?;
        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        let content = response_body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                RecipeError::Generation("Failed to extract content from response".to_string())
            })?;

        parse_generated_recipes(content)
    }
}

/// Body of the first fenced code block, or the whole text when there is none
pub fn extract_json_block(content: &str) -> &str {
    let Some(start) = content.find("```") else {
        return content.trim();
    };
    let after_fence = &content[start + 3..];
    let block = match after_fence.find("```") {
        Some(end) => &after_fence[..end],
        None => after_fence,
    };
    strip_language_tag(block).trim()
}

/// Drop a leading tag such as `json` from a fenced block, on its own line or not
fn strip_language_tag(block: &str) -> &str {
    let tag_len = block
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(block.len());
    if tag_len == 0 {
        return block;
    }
    let rest = &block[tag_len..];
    match rest.chars().next() {
        None => rest,
        Some(c) if c.is_whitespace() || c == '{' || c == '[' => rest,
        Some(_) => block,
    }
}

/// Parse model output into provider records, coercing loosely typed fields
pub fn parse_generated_recipes(content: &str) -> Result<Vec<ProviderRecipe>, RecipeError> {
    let value: Value = serde_json::from_str(extract_json_block(content)).map_err(|e| {
        RecipeError::Generation(format!("model output is not valid JSON: {}", e))
    })?;

    let recipes = value
        .get("recipes")
        .and_then(Value::as_array)
        .ok_or_else(|| RecipeError::Generation("model output has no recipes array".to_string()))?;

    let recipes: Vec<ProviderRecipe> = recipes
        .iter()
        .filter(|recipe| recipe.is_object())
        .take(MAX_RECIPES)
        .map(coerce_recipe)
        .collect();

    if recipes.is_empty() {
        return Err(RecipeError::NoMatch);
    }
    Ok(recipes)
}

fn coerce_recipe(recipe: &Value) -> ProviderRecipe {
    let ingredients = recipe["ingredients"]
        .as_array()
        .map(|items| items.iter().filter_map(coerce_ingredient).collect())
        .unwrap_or_default();

    let steps = recipe["preparation"]
        .as_array()
        .map(|steps| {
            steps
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let nutrition = &recipe["nutrition"];
    let figure = |key: &str| {
        nutrition[key]
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(NOT_AVAILABLE)
            .to_string()
    };

    ProviderRecipe {
        title: string_field(recipe, "title"),
        cuisine: string_field(recipe, "cuisine")
            .map(CuisineTag::Label)
            .unwrap_or_default(),
        ingredients,
        steps,
        nutrition: NutritionSource::Formatted(NutritionSummary {
            protein: figure("protein"),
            carbohydrate: figure("carbohydrate"),
            fat: figure("fat"),
        }),
        dish_type: None,
        pairing: string_field(recipe, "pairing"),
        source_url: None,
        image: None,
    }
}

fn coerce_ingredient(item: &Value) -> Option<IngredientLine> {
    match item {
        Value::String(name) if !name.trim().is_empty() => Some(IngredientLine::new(name.trim())),
        Value::Object(_) => Some(IngredientLine {
            name: string_field(item, "name")?,
            available: Some(item["available"].as_bool().unwrap_or(false)),
        }),
        _ => None,
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value[key]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
