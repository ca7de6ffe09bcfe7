use crate::matcher::Pantry;

/// The system prompt used for generating recipes with a chat model.
///
/// The prompt is loaded from `prompt.txt` at compile time using the
/// `include_str!` macro, making it easy to edit without dealing with
/// Rust string syntax.
pub const RECIPE_GENERATOR_PROMPT: &str = include_str!("prompt.txt");

/// Build the user message listing the pantry
pub fn build_generation_prompt(pantry: &Pantry) -> String {
    format!(
        "Elimdeki malzemeler: {}\n\nBu malzemelerin hepsini kullanan 4 farklı tarif öner.",
        pantry.joined(", ")
    )
}
