//! Generator output normalization.
//!
//! Generators wrap their output in several ways. Accepted shapes:
//! a JSON object `{"kind": "...", "payload" | "text" | "query" | "sql": "..."}`,
//! a fenced code block (```` ```sql ... ``` ````) carrying a query, and plain
//! text. Anything else is used verbatim.

use granula_core::models::{Generation, GenerationKind, RawGeneration};
use serde_json::{Map, Value};

/// Field names that may carry the payload of a JSON envelope, in lookup order.
const PAYLOAD_FIELDS: &[(&str, Option<GenerationKind>)] = &[
    ("payload", None),
    ("text", Some(GenerationKind::Answer)),
    ("answer", Some(GenerationKind::Answer)),
    ("query", Some(GenerationKind::Query)),
    ("sql", Some(GenerationKind::Query)),
];

/// Fence languages that mark a structured query.
const QUERY_FENCES: &[&str] = &["sql", "query", "mdx", "dax"];

/// Normalize raw generator output. An explicit `raw.kind` always wins over a
/// kind found inside the payload; with neither, the output is an answer.
pub fn normalize(raw: RawGeneration) -> Generation {
    let (detected, text) = unwrap_payload(&raw.payload, raw.kind);
    let kind = raw.kind.or(detected).unwrap_or(GenerationKind::Answer);
    match kind {
        GenerationKind::Answer => Generation::Answer(text),
        GenerationKind::Query => Generation::Query(text),
    }
}

fn unwrap_payload(payload: &str, hint: Option<GenerationKind>) -> (Option<GenerationKind>, String) {
    let trimmed = payload.trim();

    if trimmed.starts_with('{') {
        if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(trimmed) {
            if let Some(found) = from_json_object(&obj) {
                return found;
            }
        }
    }

    if let Some((lang, body)) = split_fence(trimmed) {
        let is_query_fence = QUERY_FENCES.contains(&lang.as_str());
        if is_query_fence || hint == Some(GenerationKind::Query) {
            return (Some(GenerationKind::Query), body);
        }
    }

    (None, payload.to_string())
}

fn from_json_object(obj: &Map<String, Value>) -> Option<(Option<GenerationKind>, String)> {
    let declared = obj.get("kind").and_then(Value::as_str).and_then(parse_kind);
    PAYLOAD_FIELDS.iter().find_map(|(field, implied)| {
        let text = obj.get(*field)?.as_str()?;
        Some((declared.or(*implied), text.trim().to_string()))
    })
}

fn parse_kind(kind: &str) -> Option<GenerationKind> {
    match kind.trim().to_ascii_lowercase().as_str() {
        "answer" | "text" | "prose" => Some(GenerationKind::Answer),
        "query" | "sql" => Some(GenerationKind::Query),
        _ => None,
    }
}

/// `(language, body)` of a text that is exactly one fenced code block.
fn split_fence(text: &str) -> Option<(String, String)> {
    let rest = text.strip_prefix("```")?;
    let inner = rest.strip_suffix("```")?;
    let (first_line, body) = inner.split_once('\n')?;
    if body.contains("```") {
        return None;
    }
    Some((
        first_line.trim().to_ascii_lowercase(),
        body.trim().to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_shapes_pass_through() {
        assert_eq!(
            normalize(RawGeneration::answer("There were 1200 students.")),
            Generation::Answer("There were 1200 students.".into())
        );
        assert_eq!(
            normalize(RawGeneration::query("SELECT 1")),
            Generation::Query("SELECT 1".into())
        );
    }

    #[test]
    fn untagged_plain_text_is_an_answer() {
        assert_eq!(
            normalize(RawGeneration::untagged("  just prose  ")),
            Generation::Answer("  just prose  ".into())
        );
    }

    #[test]
    fn json_envelope_is_unwrapped() {
        let raw = RawGeneration::untagged(r#"{"kind": "query", "payload": " SELECT year FROM t "}"#);
        assert_eq!(normalize(raw), Generation::Query("SELECT year FROM t".into()));

        let raw = RawGeneration::untagged(r#"{"sql": "SELECT 2"}"#);
        assert_eq!(normalize(raw), Generation::Query("SELECT 2".into()));

        let raw = RawGeneration::untagged(r#"{"text": "an answer"}"#);
        assert_eq!(normalize(raw), Generation::Answer("an answer".into()));
    }

    #[test]
    fn explicit_kind_wins_over_envelope() {
        let raw = RawGeneration::answer(r#"{"kind": "query", "payload": "not really a query"}"#);
        assert_eq!(normalize(raw), Generation::Answer("not really a query".into()));
    }

    #[test]
    fn sql_fence_becomes_query() {
        let raw = RawGeneration::untagged("```sql\nSELECT COUNT(*) FROM enrollment\n```");
        assert_eq!(
            normalize(raw),
            Generation::Query("SELECT COUNT(*) FROM enrollment".into())
        );
    }

    #[test]
    fn unlabeled_fence_needs_query_hint() {
        let fenced = "```\nSELECT 1\n```";
        assert_eq!(
            normalize(RawGeneration::query(fenced)),
            Generation::Query("SELECT 1".into())
        );
        assert_eq!(
            normalize(RawGeneration::untagged(fenced)),
            Generation::Answer(fenced.into())
        );
    }

    #[test]
    fn malformed_envelopes_are_used_raw() {
        let broken = r#"{"kind": "query", "payload": "#;
        assert_eq!(
            normalize(RawGeneration::untagged(broken)),
            Generation::Answer(broken.into())
        );
        let no_payload = r#"{"kind": "query", "confidence": 0.9}"#;
        assert_eq!(
            normalize(RawGeneration::untagged(no_payload)),
            Generation::Answer(no_payload.into())
        );
    }
}
