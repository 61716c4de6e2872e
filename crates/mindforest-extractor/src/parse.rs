//! Parsing the model's reply into an [`ExtractedWisdom`].
//!
//! The reply should be a JSON object with `title`, `insight` and `summary`
//! strings. Anything missing, blank, or of the wrong type is replaced by a
//! fixed default, so a garbled reply still yields a usable record.

use serde_json::Value;
use tracing::warn;

use mindforest_types::ExtractedWisdom;

/// Title used when the reply carries none.
pub const DEFAULT_TITLE: &str = "Seed of Patience";

/// Situation used when the reply carries no summary.
pub const DEFAULT_SITUATION: &str = "Worked through a difficult moment.";

/// Insight used when the reply carries none.
pub const DEFAULT_INSIGHT: &str =
    "Through adversity we find strength, sending our roots deep into inner calm.";

/// Parse a raw model reply, filling gaps with the defaults.
pub fn parse_wisdom(raw: &str) -> ExtractedWisdom {
    let object = parse_object(raw).unwrap_or_else(|| {
        warn!(raw_response = raw, "Extractor reply is not a JSON object, using defaults");
        Value::Null
    });

    ExtractedWisdom {
        title: field(&object, "title", DEFAULT_TITLE),
        situation: field(&object, "summary", DEFAULT_SITUATION),
        insight: field(&object, "insight", DEFAULT_INSIGHT),
    }
}

/// Try the raw text, then the body of a markdown code block.
fn parse_object(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str::<Value>(trimmed)
        .ok()
        .or_else(|| extract_json_from_codeblock(trimmed).and_then(|s| serde_json::from_str(s).ok()))
        .filter(Value::is_object)
}

/// Extract the body of the first fenced code block, if any.
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = text.get(start.checked_add(3)?..)?;
    let body_start = after_fence.find('\n').and_then(|i| i.checked_add(1))?;
    let body = after_fence.get(body_start..)?;
    let end = body.find("```")?;
    body.get(..end).map(str::trim)
}

fn field(object: &Value, key: &str, default: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_reply_maps_summary_to_situation() {
        let wisdom = parse_wisdom(
            r#"{"title": "Calm Within the Storm", "insight": "Anger passes.", "summary": "My boss yelled at me."}"#,
        );
        assert_eq!(wisdom.title, "Calm Within the Storm");
        assert_eq!(wisdom.insight, "Anger passes.");
        assert_eq!(wisdom.situation, "My boss yelled at me.");
    }

    #[test]
    fn missing_and_blank_fields_use_defaults() {
        let wisdom = parse_wisdom(r#"{"title": "  ", "insight": 42}"#);
        assert_eq!(wisdom.title, DEFAULT_TITLE);
        assert_eq!(wisdom.situation, DEFAULT_SITUATION);
        assert_eq!(wisdom.insight, DEFAULT_INSIGHT);
    }

    #[test]
    fn garbage_yields_all_defaults() {
        for raw in ["", "not json at all", "[1, 2, 3]", "\"just a string\""] {
            let wisdom = parse_wisdom(raw);
            assert_eq!(wisdom.title, DEFAULT_TITLE, "input {raw:?}");
            assert_eq!(wisdom.situation, DEFAULT_SITUATION);
            assert_eq!(wisdom.insight, DEFAULT_INSIGHT);
        }
    }

    #[test]
    fn fenced_reply_is_unwrapped() {
        let raw = "Here you go:\n```json\n{\"title\": \"Roots\", \"insight\": \"Stay.\", \"summary\": \"Hard day.\"}\n```";
        let wisdom = parse_wisdom(raw);
        assert_eq!(wisdom.title, "Roots");
        assert_eq!(wisdom.situation, "Hard day.");
    }
}
