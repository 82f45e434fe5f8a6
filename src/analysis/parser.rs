//! Defensive parsing of untrusted completion text into a fixed response shape.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::types::Extraction;

fn code_fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)```").expect("valid code fence regex")
    })
}

/// Map completion text onto `shape`. Every key in `shape` is present in the
/// result; anything the text does not supply is [`Extraction::NotFound`].
pub fn parse_structured(text: &str, shape: &[&str]) -> BTreeMap<String, Extraction> {
    let object = extract_object(text)
        .map(normalize_keys)
        .map(|obj| unwrap_envelope(obj, shape))
        .unwrap_or_default();

    shape
        .iter()
        .map(|key| {
            let extraction = match object.get(*key) {
                Some(value) if !is_empty(value) => Extraction::Found(value.clone()),
                _ => Extraction::NotFound,
            };
            (key.to_string(), extraction)
        })
        .collect()
}

/// First JSON object found in a fenced block, else anywhere in the text.
fn extract_object(text: &str) -> Option<Map<String, Value>> {
    code_fence_regex()
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .find_map(|m| first_balanced_object(m.as_str()))
        .or_else(|| first_balanced_object(text))
}

/// Scan for `{`, match braces outside string literals, and return the first
/// candidate that decodes as a JSON object.
fn first_balanced_object(text: &str) -> Option<Map<String, Value>> {
    let bytes = text.as_bytes();
    let mut start = 0;

    while let Some(offset) = text[start..].find('{') {
        let open = start + offset;
        if let Some(close) = matching_brace(&bytes[open..]) {
            if let Ok(Value::Object(map)) = serde_json::from_str(&text[open..=open + close]) {
                return Some(map);
            }
        }
        start = open + 1;
    }
    None
}

fn matching_brace(bytes: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// `"Vital Signs"`, `"vital-signs"` and `"VITAL_SIGNS"` all become `vital_signs`.
pub fn normalize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.trim().chars() {
        let c = match c {
            ' ' | '-' | '.' => '_',
            c => c.to_ascii_lowercase(),
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('_').to_string()
}

fn normalize_keys(object: Map<String, Value>) -> Map<String, Value> {
    let mut normalized = Map::with_capacity(object.len());
    for (key, value) in object {
        // First spelling wins when two keys normalise to the same name.
        normalized.entry(normalize_key(&key)).or_insert(value);
    }
    normalized
}

/// Providers sometimes nest the answer under a single wrapper key such as
/// `"analysis"`. Descend one level when the top level has none of the shape keys.
fn unwrap_envelope(object: Map<String, Value>, shape: &[&str]) -> Map<String, Value> {
    if shape.iter().any(|k| object.contains_key(*k)) || object.len() != 1 {
        return object;
    }
    match object.into_iter().next() {
        Some((_, Value::Object(inner))) => {
            let inner = normalize_keys(inner);
            if shape.iter().any(|k| inner.contains_key(*k)) {
                inner
            } else {
                Map::new()
            }
        }
        _ => Map::new(),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SHAPE: &[&str] = &["vital_signs", "medications", "conditions", "assessment"];

    fn keys(result: &BTreeMap<String, Extraction>) -> Vec<&str> {
        result.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_plain_json() {
        let text = r#"{"vital_signs": {"blood_pressure": "150/95"}, "medications": ["Lisinopril 10mg"],
                       "conditions": ["Hypertension"], "assessment": "Elevated BP"}"#;
        let result = parse_structured(text, SHAPE);
        assert!(result.values().all(Extraction::is_found));
        assert_eq!(
            result["medications"],
            Extraction::Found(json!(["Lisinopril 10mg"]))
        );
    }

    #[test]
    fn test_fenced_json_with_prose() {
        let text = "Here is the analysis you asked for {see below}:\n```json\n{\"Vital Signs\": {\"hr\": 88}, \"MEDICATIONS\": [\"Metformin\"]}\n```\nLet me know.";
        let result = parse_structured(text, SHAPE);
        assert!(result["vital_signs"].is_found());
        assert!(result["medications"].is_found());
        assert_eq!(result["conditions"], Extraction::NotFound);
        assert_eq!(keys(&result).len(), SHAPE.len());
    }

    #[test]
    fn test_braces_inside_strings() {
        let text = r#"Result: {"assessment": "note says \"{unclear}\" here", "conditions": ["Asthma"]} trailing }"#;
        let result = parse_structured(text, SHAPE);
        assert_eq!(
            result["assessment"],
            Extraction::Found(json!("note says \"{unclear}\" here"))
        );
    }

    #[test]
    fn test_empty_values_are_not_found() {
        let text = r#"{"vital_signs": {}, "medications": [], "conditions": "  ", "assessment": null}"#;
        let result = parse_structured(text, SHAPE);
        assert!(result.values().all(|e| *e == Extraction::NotFound));
    }

    #[test]
    fn test_non_json_and_empty_text() {
        for text in ["", "The patient is stable.", "{not json at all", "[1, 2, 3]"] {
            let result = parse_structured(text, SHAPE);
            assert_eq!(
                keys(&result),
                vec!["assessment", "conditions", "medications", "vital_signs"]
            );
            assert!(result.values().all(|e| !e.is_found()), "{:?}", text);
        }
    }

    #[test]
    fn test_unknown_keys_dropped() {
        let text = r#"{"conditions": ["CKD"], "billing_code": "X123"}"#;
        let result = parse_structured(text, SHAPE);
        assert!(!result.contains_key("billing_code"));
        assert!(result["conditions"].is_found());
    }

    #[test]
    fn test_single_wrapper_key_unwrapped() {
        let text = r#"{"analysis": {"medications": ["Synthroid 75mcg"]}}"#;
        let result = parse_structured(text, SHAPE);
        assert!(result["medications"].is_found());
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Vital Signs"), "vital_signs");
        assert_eq!(normalize_key(" follow-up "), "follow_up");
        assert_eq!(normalize_key("Risk  Factors"), "risk_factors");
        assert_eq!(normalize_key("LAB_RESULTS"), "lab_results");
    }
}
