//! Generation output: a tagged union of prose answer or structured query.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of output the generator produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationKind {
    Answer,
    Query,
}

impl fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Answer => f.write_str("answer"),
            Self::Query => f.write_str("query"),
        }
    }
}

/// Normalized generation. Downstream logic switches on the variant only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Generation {
    /// Grounded natural-language answer.
    Answer(String),
    /// Structured query for the relational store.
    Query(String),
}

impl Generation {
    pub fn kind(&self) -> GenerationKind {
        match self {
            Self::Answer(_) => GenerationKind::Answer,
            Self::Query(_) => GenerationKind::Query,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Answer(t) | Self::Query(t) => t,
        }
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }
}

/// Generator output before envelope normalization.
///
/// `kind` is `None` when the generator did not say what it produced; the
/// payload may then carry its own wrapper (JSON object, fenced block).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGeneration {
    pub kind: Option<GenerationKind>,
    pub payload: String,
}

impl RawGeneration {
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            kind: Some(GenerationKind::Answer),
            payload: text.into(),
        }
    }

    pub fn query(text: impl Into<String>) -> Self {
        Self {
            kind: Some(GenerationKind::Query),
            payload: text.into(),
        }
    }

    pub fn untagged(payload: impl Into<String>) -> Self {
        Self {
            kind: None,
            payload: payload.into(),
        }
    }
}
