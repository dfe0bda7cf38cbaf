//! Default "no information available" detector.

use granula_core::traits::InsufficiencyDetector;
use granula_routing::normalize;

/// Phrases a generator uses when the context cannot answer the question.
/// Stored pre-normalized.
const DEFAULT_PHRASES: &[&str] = &[
    "no information available",
    "there is no information",
    "i don t have enough information",
    "i do not have enough information",
    "i don t know",
    "i do not know",
    "insufficient information",
    "not enough information",
    "the context does not contain",
    "the provided context does not contain",
    "no hay informacion",
    "no dispongo de informacion",
    "no tengo informacion suficiente",
    "no tengo suficiente informacion",
    "informacion insuficiente",
    "no hay datos",
];

/// Flags an answer as insufficient when, after normalization, it equals one
/// of the phrases or starts with one followed by more words.
#[derive(Debug, Clone)]
pub struct PhraseInsufficiencyDetector {
    phrases: Vec<String>,
}

impl PhraseInsufficiencyDetector {
    pub fn new() -> Self {
        Self::with_phrases(DEFAULT_PHRASES.iter().copied())
    }

    /// Detector over a custom phrase list. Phrases are normalized here.
    pub fn with_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|p| normalize(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();
        Self { phrases }
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

impl Default for PhraseInsufficiencyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl InsufficiencyDetector for PhraseInsufficiencyDetector {
    fn is_insufficient(&self, answer: &str) -> bool {
        let normalized = normalize(answer);
        if normalized.is_empty() {
            return false;
        }
        self.phrases.iter().any(|phrase| {
            normalized == *phrase
                || normalized
                    .strip_prefix(phrase.as_str())
                    .is_some_and(|rest| rest.starts_with(' '))
        })
    }
}
