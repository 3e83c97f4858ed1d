//! Question preprocessing: lowercasing, punctuation removal and whitespace
//! tokenization.

/// ASCII punctuation deleted from questions before they are sent as prompts.
pub const PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;

/// A question after normalization.
///
/// `cleaned` keeps the original spacing; `tokens` is `cleaned` split on runs
/// of whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuestion {
    cleaned: String,
    tokens: Vec<String>,
}

impl NormalizedQuestion {
    /// Returns the lowercased, punctuation-free text.
    pub fn cleaned(&self) -> &str {
        &self.cleaned
    }

    /// Returns the whitespace-delimited tokens of the cleaned text.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Returns true if nothing but whitespace survived normalization.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Normalizes a raw question.
///
/// Every character is lowercased and every character in [`PUNCTUATION`] is
/// deleted outright, so words joined only by punctuation run together.
/// Uppercase characters with no lowercase mapping (e.g. `ϒ`, `𝐀`) are kept
/// as they are.
///
/// # Examples
///
/// ```
/// use gemqa::normalizer::normalize;
///
/// let question = normalize("Hello, World!");
/// assert_eq!(question.cleaned(), "hello world");
/// assert_eq!(question.tokens(), ["hello", "world"]);
///
/// assert_eq!(normalize("What is 2+2?").cleaned(), "what is 22");
/// ```
#[must_use]
pub fn normalize(text: &str) -> NormalizedQuestion {
    let cleaned: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| !is_punctuation(*c))
        .collect();

    let tokens = cleaned.split_whitespace().map(String::from).collect();

    NormalizedQuestion { cleaned, tokens }
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii() && PUNCTUATION.contains(c)
}
