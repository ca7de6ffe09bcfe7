//! Decides whether a recipe ingredient line is already in the user's pantry.
//!
//! Both sides go through [`tokenize`], so matching is symmetric for identical
//! inputs. A pantry word matches a line when it equals or prefixes one of the
//! line's tokens, which tolerates Turkish plural and case suffixes
//! (`domates` matches `domatesler`).

/// Letters outside `a-z` that count as word characters
const EXTENDED_LETTERS: [char; 6] = ['ı', 'ğ', 'ü', 'ş', 'ö', 'ç'];

fn is_token_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || EXTENDED_LETTERS.contains(&c)
}

/// Lower-case `text` and split it into word tokens
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !is_token_char(c))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// True when any pantry entry has all of its words present in `candidate_line`
pub fn is_available<S: AsRef<str>>(user_ingredients: &[S], candidate_line: &str) -> bool {
    let line_tokens = tokenize(candidate_line);

    user_ingredients.iter().any(|user_ingredient| {
        let user_words = tokenize(user_ingredient.as_ref());
        !user_words.is_empty()
            && user_words.iter().all(|word| {
                line_tokens
                    .iter()
                    .any(|token| token.starts_with(word.as_str()))
            })
    })
}

/// The user's declared ingredients, lower-cased and split on commas or newlines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pantry {
    items: Vec<String>,
}

impl Pantry {
    pub fn parse(raw: &str) -> Self {
        let items = raw
            .to_lowercase()
            .split([',', '\n'])
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();
        Pantry { items }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.items.first().map(String::as_str)
    }

    /// Comma-joined form used in upstream query strings
    pub fn joined(&self, separator: &str) -> String {
        self.items.join(separator)
    }

    pub fn contains_line(&self, candidate_line: &str) -> bool {
        is_available(self.items.as_slice(), candidate_line)
    }
}
