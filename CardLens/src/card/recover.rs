//! Tolerant JSON recovery from candidate text
//!
//! Two parsing stages, kept separate so each can be tested alone:
//!
//! 1. [`parse_strict`]: the whole text must be a JSON object.
//! 2. [`find_object_span`]: the text between the first `{` and the last `}`
//!    is cut out and handed back to the strict parser.
//!
//! [`recover_candidate`] applies both to the decoded text, then to the raw
//! bytes re-decoded as UTF-8, then (optionally) to a base64-decoded payload.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::{Map, Value};

use super::CardMetadata;
use super::select::CandidateEntry;

/// Name of the envelope field wrapping CCv2/CCv3 card data
pub const ENVELOPE_FIELD: &str = "data";

/// Which stage produced the parsed object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStage {
    /// The decoded text was a JSON object as-is
    Strict,
    /// An object was cut out of surrounding noise
    BraceScan,
    /// The raw bytes re-decoded as UTF-8 parsed
    RawUtf8,
    /// The text was base64 and decoded to a JSON object
    Base64,
}

/// Parse `text` as a JSON object. Anything else (arrays, scalars, junk) is `None`.
pub fn parse_strict(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Slice from the first `{` to the last `}`, if the last follows the first.
pub fn find_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Strict parse, then strict parse of the brace span.
///
/// Returns the object and whether the brace fallback was needed.
pub fn parse_loose(text: &str) -> Option<(Map<String, Value>, bool)> {
    if let Some(map) = parse_strict(text) {
        return Some((map, false));
    }
    find_object_span(text)
        .and_then(parse_strict)
        .map(|map| (map, true))
}

/// Unwrap one `{"data": {...}}` envelope. Never recurses.
pub fn unwrap_envelope(mut object: Map<String, Value>) -> Map<String, Value> {
    if !matches!(object.get(ENVELOPE_FIELD), Some(Value::Object(_))) {
        return object;
    }
    match object.remove(ENVELOPE_FIELD) {
        Some(Value::Object(inner)) => inner,
        _ => object,
    }
}

fn decode_base64_text(text: &str) -> Option<String> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    let bytes = STANDARD.decode(compact.as_bytes()).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Try every recovery stage on one candidate.
pub fn recover_candidate(candidate: &CandidateEntry, decode_base64: bool) -> Option<(CardMetadata, RecoveryStage)> {
    let (object, stage) = recover_object(candidate, decode_base64)?;
    Some((CardMetadata::from_json_object(unwrap_envelope(object)), stage))
}

fn recover_object(candidate: &CandidateEntry, decode_base64: bool) -> Option<(Map<String, Value>, RecoveryStage)> {
    if let Some((map, scanned)) = parse_loose(&candidate.text) {
        let stage = if scanned {
            RecoveryStage::BraceScan
        } else {
            RecoveryStage::Strict
        };
        return Some((map, stage));
    }

    let redecoded = String::from_utf8_lossy(&candidate.raw_bytes);
    if let Some((map, _)) = parse_loose(&redecoded) {
        tracing::debug!("Candidate '{}' parsed after UTF-8 re-decode", candidate.keyword);
        return Some((map, RecoveryStage::RawUtf8));
    }

    if decode_base64 {
        if let Some((map, _)) = decode_base64_text(&candidate.text).and_then(|t| parse_loose(&t)) {
            tracing::debug!("Candidate '{}' parsed as base64", candidate.keyword);
            return Some((map, RecoveryStage::Base64));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(text: &str, raw: &[u8]) -> CandidateEntry {
        CandidateEntry {
            keyword: "chara".to_string(),
            text: text.to_string(),
            raw_bytes: raw.to_vec(),
            priority_rank: 0,
            scan_index: 0,
        }
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_strict_accepts_only_objects() {
        assert!(parse_strict(r#"{"a":1}"#).is_some());
        assert!(parse_strict("[1,2]").is_none());
        assert!(parse_strict("42").is_none());
        assert!(parse_strict("null").is_none());
        assert!(parse_strict("{broken").is_none());
    }

    #[test]
    fn test_span_first_open_to_last_close() {
        assert_eq!(
            find_object_span(r#"noise {"ok":true} trailing junk"#),
            Some(r#"{"ok":true}"#)
        );
        assert_eq!(find_object_span("a {x} b {y} c"), Some("{x} b {y}"));
        assert_eq!(find_object_span("} backwards {"), None);
        assert_eq!(find_object_span("no braces"), None);
        assert_eq!(find_object_span("{"), None);
    }

    #[test]
    fn test_loose_reports_brace_scan() {
        let (map, scanned) = parse_loose(r#"noise {"ok":true} trailing junk"#).unwrap();
        assert!(scanned);
        assert_eq!(Value::Object(map), json!({"ok": true}));

        let (_, scanned) = parse_loose(r#"{"ok":true}"#).unwrap();
        assert!(!scanned);
    }

    #[test]
    fn test_loose_fails_when_span_is_not_json() {
        assert!(parse_loose("a {x} b {y} c").is_none());
    }

    #[test]
    fn test_unwrap_envelope_once() {
        let unwrapped = unwrap_envelope(object(json!({
            "spec": "chara_card_v2",
            "data": {"name": "X", "data": {"deeper": true}}
        })));
        assert_eq!(Value::Object(unwrapped), json!({"name": "X", "data": {"deeper": true}}));
    }

    #[test]
    fn test_unwrap_envelope_ignores_non_object_data() {
        let original = json!({"name": "X", "data": "just a string"});
        assert_eq!(Value::Object(unwrap_envelope(object(original.clone()))), original);

        let original = json!({"name": "X", "data": null});
        assert_eq!(Value::Object(unwrap_envelope(object(original.clone()))), original);
    }

    #[test]
    fn test_raw_bytes_redecode() {
        // Text mangled beyond parsing, raw bytes intact
        let raw = "{\"name\":\"Zo\u{eb}\"}".as_bytes();
        let (card, stage) = recover_candidate(&candidate("\u{fffd}garbage", raw), true).unwrap();
        assert_eq!(stage, RecoveryStage::RawUtf8);
        assert_eq!(card.name(), Some("Zo\u{eb}"));
    }

    #[test]
    fn test_base64_payload() {
        let encoded = STANDARD.encode(r#"{"spec":"chara_card_v2","data":{"name":"Aria"}}"#);
        let entry = candidate(&encoded, encoded.as_bytes());

        let (card, stage) = recover_candidate(&entry, true).unwrap();
        assert_eq!(stage, RecoveryStage::Base64);
        assert_eq!(card.name(), Some("Aria"));

        assert!(recover_candidate(&entry, false).is_none());
    }

    #[test]
    fn test_nothing_recoverable() {
        assert!(recover_candidate(&candidate("plain words", b"plain words"), true).is_none());
    }
}
