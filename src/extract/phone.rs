//! Customer phone extraction.
//!
//! Two-pass strategy: ordered probes over known field paths first, then a
//! depth-bounded scan of the whole payload tree for anything phone-shaped.
//! Every candidate is checked against the gateway's own number; a
//! self-match means extraction failed, not that the gateway called itself.

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::extract::probe_str;
use crate::pipeline::types::Direction;

/// Recursion bound for the fallback scan. Payloads deeper than this are
/// either malicious or broken; either way the scan stops.
const MAX_SCAN_DEPTH: usize = 8;

/// Normalized digit-count bounds for a plausible phone number.
const MIN_PHONE_DIGITS: usize = 10;
const MAX_PHONE_DIGITS: usize = 20;

/// "to"-family probe paths, in priority order. These carry the customer
/// number under outbound semantics and most inbound payload variants.
const TO_PROBES: &[&[&str]] = &[
    &["to"],
    &["to_number"],
    &["customer_phone"],
    &["phone_number"],
    &["customer_number"],
    &["customer", "phone_number"],
    &["customer", "number"],
    &["call", "to"],
    &["call", "customer_phone"],
    &["data", "to"],
    &["data", "customer_phone"],
    &["data", "phone_number"],
    &["metadata", "customer_phone"],
    &["metadata", "phone_number"],
];

/// "from"-family probes: the caller's number. Only meaningful when the
/// customer placed the call, so these run last and never for outbound.
const FROM_PROBES: &[&[&str]] = &[
    &["from"],
    &["from_number"],
    &["caller_id"],
    &["call", "from"],
    &["data", "from"],
    &["metadata", "caller_id"],
];

/// Strip everything but digits.
pub fn digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Canonical form: leading `+` kept, internal spaces and hyphens removed.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut out = String::with_capacity(trimmed.len());
    for (index, c) in trimmed.chars().enumerate() {
        match c {
            '+' if index == 0 => out.push('+'),
            '0'..='9' => out.push(c),
            _ => {}
        }
    }
    out
}

/// Validate one candidate: phone-shaped, plausible digit count, and not
/// the gateway's own number. Returns the normalized form.
fn accept(raw: &str, gateway_digits: &str, shape: &Regex) -> Option<String> {
    let candidate = raw.trim();
    if !shape.is_match(candidate) {
        return None;
    }
    let candidate_digits = digits(candidate);
    if candidate_digits.len() < MIN_PHONE_DIGITS || candidate_digits.len() > MAX_PHONE_DIGITS {
        return None;
    }
    if !gateway_digits.is_empty() && candidate_digits == gateway_digits {
        debug!(candidate, "Discarding candidate matching the gateway number");
        return None;
    }
    Some(normalize(candidate))
}

/// Find the customer phone number, or report an explicit not-found.
pub(super) fn find_phone(
    event: &Value,
    direction: Direction,
    gateway_digits: &str,
    shape: &Regex,
) -> Option<String> {
    // Primary pass: known field paths in priority order.
    let mut probes: Vec<&[&str]> = TO_PROBES.to_vec();
    if direction != Direction::Outbound {
        probes.extend_from_slice(FROM_PROBES);
    }
    for path in &probes {
        if let Some(raw) = probe_str(event, path) {
            if let Some(found) = accept(raw, gateway_digits, shape) {
                debug!(path = %path.join("."), phone = %found, "Phone found via probe");
                return Some(found);
            }
        }
    }

    // Fallback pass: bounded scan of the entire tree, traversal order.
    let found = scan(event, MAX_SCAN_DEPTH, gateway_digits, shape);
    match &found {
        Some(found) => debug!(phone = %found, "Phone found via fallback scan"),
        None => debug!("No phone number candidate survived either pass"),
    }
    found
}

fn scan(value: &Value, depth: usize, gateway_digits: &str, shape: &Regex) -> Option<String> {
    match value {
        Value::String(s) => accept(s, gateway_digits, shape),
        Value::Array(items) if depth > 0 => items
            .iter()
            .find_map(|item| scan(item, depth - 1, gateway_digits, shape)),
        Value::Object(map) if depth > 0 => map
            .values()
            .find_map(|item| scan(item, depth - 1, gateway_digits, shape)),
        _ => None,
    }
}
