//! Transcript extraction and flattening.
//!
//! Providers deliver transcripts as a plain string, a list of utterance
//! objects, or a wrapper object, depending on version. Probes locate the
//! candidate; flattening reduces whatever it finds to one text blob for
//! keyword matching.

use serde_json::{Map, Value};
use tracing::debug;

use crate::extract::probe;

/// Recursion bound for flattening. Mirrors the phone-scan bound: input
/// nesting must not control stack depth.
const MAX_FLATTEN_DEPTH: usize = 8;

/// Ordered probe paths for the transcript field.
const TRANSCRIPT_PROBES: &[&[&str]] = &[
    &["transcript"],
    &["transcription"],
    &["conversation"],
    &["messages"],
    &["data", "transcript"],
    &["data", "transcription"],
    &["data", "messages"],
    &["data", "conversation"],
    &["call", "transcript"],
    &["analysis", "transcript"],
    &["metadata", "transcript"],
];

/// Find and flatten the transcript, if any probe yields text.
pub(super) fn find_transcript(event: &Value) -> Option<String> {
    for path in TRANSCRIPT_PROBES {
        if let Some(candidate) = probe(event, path) {
            let text = flatten(candidate, MAX_FLATTEN_DEPTH);
            if !text.trim().is_empty() {
                debug!(
                    path = %path.join("."),
                    chars = text.len(),
                    "Transcript probe matched"
                );
                return Some(text);
            }
        }
    }
    None
}

fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

/// Flatten a transcript candidate to plain text.
fn flatten(value: &Value, depth: usize) -> String {
    if depth == 0 {
        return value.to_string();
    }
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(item_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(map) => {
            if let Some(text) = str_field(map, "text") {
                return text.to_string();
            }
            if let Some(text) = str_field(map, "content") {
                return text.to_string();
            }
            if let Some(text) = str_field(map, "full_transcript") {
                return text.to_string();
            }
            if let Some(messages) = map.get("messages") {
                return flatten(messages, depth - 1);
            }
            value.to_string()
        }
        other => other.to_string(),
    }
}

/// Text of a single utterance item within a transcript sequence.
fn item_text(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            if let Some(text) = str_field(map, "text") {
                return text.to_string();
            }
            if let Some(text) = str_field(map, "content") {
                return text.to_string();
            }
            if let (Some(role), Some(message)) = (str_field(map, "role"), str_field(map, "message"))
            {
                return format!("{role}: {message}");
            }
            if let Some(text) = str_field(map, "transcript") {
                return text.to_string();
            }
            item.to_string()
        }
        other => other.to_string(),
    }
}
