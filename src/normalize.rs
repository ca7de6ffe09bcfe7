use crate::matcher::Pantry;
use crate::model::{
    CuisineTag, IngredientAvailability, Nutrient, NutritionSource, NutritionSummary,
    ProviderRecipe, Recipe, NOT_AVAILABLE,
};

const CUISINE_SUFFIX: &str = "Mutfağı";
const DEFAULT_CUISINE: &str = "Dünya Mutfağı";
const DEFAULT_TITLE: &str = "Tarif";
const DEFAULT_UNIT: &str = "g";
const GENERIC_PAIRING: &str =
    "Bu yemeği yan ürünler ve içeceklerle damak zevkinize göre eşleştirebilirsiniz.";

/// Steps used when a provider supplies no instructions
pub const PLACEHOLDER_STEPS: [&str; 4] = [
    "Fırını/ocağı tarifte belirtilen sıcaklığa getirin.",
    "Malzemeleri hazırlayın ve doğrayın.",
    "Tarif talimatlarına göre pişirin.",
    "Servis edin.",
];

// Lower-cased nutrient names as reported by Spoonacular, Edamam and FoodData Central
const PROTEIN_NAMES: &[&str] = &["protein"];
const CARBOHYDRATE_NAMES: &[&str] = &[
    "carbohydrates",
    "carbohydrate",
    "carbs",
    "carbohydrate, by difference",
];
const FAT_NAMES: &[&str] = &["fat", "total fat", "total lipid (fat)"];

/// Build the canonical recipe from a provider record.
///
/// When `own_availability` is set the provider's per-line flag is trusted
/// (missing flags become `false`); otherwise every line goes through the
/// pantry matcher.
pub fn normalize(record: ProviderRecipe, pantry: &Pantry, own_availability: bool) -> Recipe {
    let ingredients = record
        .ingredients
        .into_iter()
        .map(|line| {
            let available = if own_availability {
                line.available.unwrap_or(false)
            } else {
                pantry.contains_line(&line.name)
            };
            IngredientAvailability {
                name: line.name,
                available,
            }
        })
        .collect();

    Recipe {
        cuisine: cuisine_label(&record.cuisine),
        title: non_blank(record.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        ingredients,
        preparation: preparation_steps(record.steps),
        nutrition: nutrition_summary(&record.nutrition),
        pairing: Some(pairing_sentence(record.pairing, record.dish_type)),
        source_url: non_blank(record.source_url),
        image: non_blank(record.image),
    }
}

pub fn cuisine_label(tag: &CuisineTag) -> String {
    match tag {
        CuisineTag::Cuisine(name) if !name.trim().is_empty() => {
            format!("{} {}", capitalize(name.trim()), CUISINE_SUFFIX)
        }
        CuisineTag::MealType(name) if !name.trim().is_empty() => capitalize(name.trim()),
        CuisineTag::Label(label) if !label.trim().is_empty() => label.trim().to_string(),
        _ => DEFAULT_CUISINE.to_string(),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn preparation_steps(steps: Vec<String>) -> Vec<String> {
    let steps: Vec<String> = steps
        .into_iter()
        .map(|step| step.trim().to_string())
        .filter(|step| !step.is_empty())
        .collect();

    if steps.is_empty() {
        PLACEHOLDER_STEPS.iter().map(|step| step.to_string()).collect()
    } else {
        steps
    }
}

pub fn nutrition_summary(source: &NutritionSource) -> NutritionSummary {
    match source {
        NutritionSource::Nutrients(nutrients) => NutritionSummary {
            protein: format_nutrient(nutrients, PROTEIN_NAMES),
            carbohydrate: format_nutrient(nutrients, CARBOHYDRATE_NAMES),
            fat: format_nutrient(nutrients, FAT_NAMES),
        },
        NutritionSource::Formatted(summary) => summary.clone(),
        NutritionSource::Unavailable => NutritionSummary::unavailable(),
    }
}

/// Format the first nutrient whose name matches one of `names`, e.g. `"15g"`
pub fn format_nutrient(nutrients: &[Nutrient], names: &[&str]) -> String {
    let found = nutrients
        .iter()
        .find(|nutrient| names.contains(&nutrient.name.trim().to_lowercase().as_str()));

    match found.and_then(|nutrient| nutrient.amount.map(|amount| (amount, nutrient))) {
        Some((amount, nutrient)) if amount.is_finite() => {
            let unit = nutrient
                .unit
                .as_deref()
                .map(str::trim)
                .filter(|unit| !unit.is_empty())
                .map(str::to_lowercase)
                .unwrap_or_else(|| DEFAULT_UNIT.to_string());
            // Half-up rounding
            format!("{}{}", (amount + 0.5).floor() as i64, unit)
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn pairing_sentence(pairing: Option<String>, dish_type: Option<String>) -> String {
    if let Some(pairing) = non_blank(pairing) {
        return pairing;
    }
    match non_blank(dish_type) {
        Some(dish_type) => format!(
            "Bu {} yanında hafif bir salata veya içecek ile servis edilebilir.",
            dish_type
        ),
        None => GENERIC_PAIRING.to_string(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
