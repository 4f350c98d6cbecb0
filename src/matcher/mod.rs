//! Text normalization and target-phrase matching
//!
//! Comment bodies are free text with arbitrary casing, punctuation and
//! emoji. Both the phrases and the comment text are reduced to lowercase
//! ASCII alphanumeric tokens separated by single spaces before a plain
//! substring test.

use regex::Regex;
use std::sync::LazyLock;

/// Phrases that qualify a comment as a target
pub const DEFAULT_PHRASES: &[&str] = &[
    "encrypted money code",
    "encryptedmoneycode",
    "encrypted code",
    "ethan rothwell",
];

static NON_ALNUM_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

static DEFAULT_MATCHER: LazyLock<PhraseMatcher> = LazyLock::new(PhraseMatcher::default);

/// Normalize text for matching
///
/// Lowercases, replaces every run of characters outside `[a-z0-9]` with a
/// single space and trims. Whitespace is itself outside the class, so runs
/// of it collapse in the same pass. The result is idempotent.
///
/// # Example
/// ```
/// use comment_finder::matcher::normalize;
///
/// assert_eq!(normalize("Encrypted-Money  Code!!"), "encrypted money code");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    NON_ALNUM_REGEX.replace_all(&lowered, " ").trim().to_string()
}

/// Check text against [`DEFAULT_PHRASES`]
///
/// # Example
/// ```
/// use comment_finder::matcher::has_target_phrase;
///
/// assert!(has_target_phrase("check out ethan rothwell's page"));
/// assert!(!has_target_phrase("totally unrelated text"));
/// ```
pub fn has_target_phrase(text: &str) -> bool {
    DEFAULT_MATCHER.matches(text)
}

/// Substring matcher over a set of normalized phrases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseMatcher {
    phrases: Vec<String>,
}

impl PhraseMatcher {
    /// Build a matcher, normalizing each phrase
    ///
    /// Phrases that normalize to nothing are dropped; an empty phrase would
    /// match every comment.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for phrase in phrases {
            let phrase = normalize(phrase.as_ref());
            if !phrase.is_empty() && !normalized.contains(&phrase) {
                normalized.push(phrase);
            }
        }

        Self {
            phrases: normalized,
        }
    }

    /// Normalized phrases in configuration order
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Whether the matcher has anything to look for
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// True iff any phrase occurs in the normalized text
    pub fn matches(&self, text: &str) -> bool {
        let normalized = normalize(text);
        self.matches_normalized(&normalized)
    }

    /// Like [`matches`](Self::matches) for text that is already normalized
    pub fn matches_normalized(&self, normalized: &str) -> bool {
        self.matching_phrases(normalized).next().is_some()
    }

    /// Phrases occurring in already normalized text, in configuration order
    pub fn matching_phrases<'a>(
        &'a self,
        normalized: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.phrases
            .iter()
            .map(String::as_str)
            .filter(move |phrase| normalized.contains(*phrase))
    }
}

impl Default for PhraseMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_PHRASES)
    }
}
