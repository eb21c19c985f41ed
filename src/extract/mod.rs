//! Field extraction from loosely-structured call-ended payloads.
//!
//! The voice provider's webhook body has no contractual schema and drifts
//! across provider versions. Extraction therefore works through ordered
//! lists of declarative probe paths per field, first well-formed hit wins,
//! and never raises on missing or malformed input. Pure functions of the
//! payload; no external calls.

pub mod phone;
pub mod transcript;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::pipeline::types::{CallFacts, Direction};

/// Ordered probe paths for the call direction field.
const DIRECTION_PROBES: &[&[&str]] = &[
    &["call_type"],
    &["callType"],
    &["type"],
    &["direction"],
    &["metadata", "call_type"],
    &["metadata", "direction"],
    &["data", "call_type"],
    &["data", "direction"],
    &["call", "type"],
    &["call", "direction"],
];

/// Walk a nested path into the payload tree.
pub(crate) fn probe<'a>(event: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = event;
    for segment in path {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Probe for a non-empty string at the given path.
pub(crate) fn probe_str<'a>(event: &'a Value, path: &[&str]) -> Option<&'a str> {
    probe(event, path)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Extracts call facts from arbitrary call-ended payloads.
///
/// Holds the gateway's own number so no extraction path can ever hand the
/// sending number back as a customer destination.
pub struct FieldExtractor {
    gateway_digits: String,
    phone_shape: Regex,
}

impl FieldExtractor {
    pub fn new(gateway_number: &str) -> Self {
        Self {
            gateway_digits: phone::digits(gateway_number),
            // A run of digits with optional leading +, allowing internal
            // spaces and hyphens. Digit-count bounds are enforced after
            // normalization.
            phone_shape: Regex::new(r"^\+?[0-9][0-9 \-]*[0-9]$").unwrap(),
        }
    }

    /// Extract direction, customer phone and transcript from one payload.
    /// Best-effort on every field; absence degrades, it never errors.
    pub fn extract(&self, event: &Value) -> CallFacts {
        let direction = self.extract_direction(event);
        let customer_phone =
            phone::find_phone(event, direction, &self.gateway_digits, &self.phone_shape);
        let transcript = match transcript::find_transcript(event) {
            Some(text) => text,
            None => {
                // Degraded mode: serialize the whole payload so keyword
                // matching can still see anything it carries.
                warn!("No transcript field found; matching against the serialized payload");
                event.to_string()
            }
        };

        CallFacts {
            direction,
            customer_phone,
            transcript,
        }
    }

    fn extract_direction(&self, event: &Value) -> Direction {
        for path in DIRECTION_PROBES {
            if let Some(raw) = probe_str(event, path) {
                let direction = Direction::parse(raw);
                debug!(
                    path = %path.join("."),
                    raw,
                    direction = direction.label(),
                    "Direction probe matched"
                );
                return direction;
            }
        }
        debug!("No direction field found; defaulting to unknown");
        Direction::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const GATEWAY: &str = "+15550001111";

    fn extractor() -> FieldExtractor {
        FieldExtractor::new(GATEWAY)
    }

    #[test]
    fn extracts_top_level_fields() {
        let event = json!({
            "call_type": "outbound",
            "to": "+447700900123",
            "transcript": "hello there",
        });
        let facts = extractor().extract(&event);
        assert_eq!(facts.direction, Direction::Outbound);
        assert_eq!(facts.customer_phone.as_deref(), Some("+447700900123"));
        assert_eq!(facts.transcript, "hello there");
    }

    #[test]
    fn direction_found_under_nested_objects() {
        let event = json!({"metadata": {"call_type": "inboundPhoneCall"}});
        assert_eq!(extractor().extract(&event).direction, Direction::Inbound);

        let event = json!({"call": {"direction": "OUTBOUND"}});
        assert_eq!(extractor().extract(&event).direction, Direction::Outbound);
    }

    #[test]
    fn direction_defaults_to_unknown() {
        let facts = extractor().extract(&json!({"unrelated": 1}));
        assert_eq!(facts.direction, Direction::Unknown);
    }

    #[test]
    fn first_nonempty_direction_probe_wins() {
        // An unrecognized value at an earlier probe still wins the probe
        // order; it parses as unknown rather than falling through.
        let event = json!({"type": "webCall", "direction": "inbound"});
        assert_eq!(extractor().extract(&event).direction, Direction::Unknown);
    }

    #[test]
    fn gateway_number_is_never_returned() {
        let event = json!({
            "call_type": "outbound",
            "to": GATEWAY,
            "customer_phone": "+447700900123",
        });
        let facts = extractor().extract(&event);
        assert_eq!(facts.customer_phone.as_deref(), Some("+447700900123"));
    }

    #[test]
    fn missing_phone_reports_none() {
        let event = json!({"call_type": "inbound", "transcript": "hi"});
        assert_eq!(extractor().extract(&event).customer_phone, None);
    }

    #[test]
    fn transcript_falls_back_to_serialized_payload() {
        let event = json!({"call_type": "inbound", "note": "terms and conditions"});
        let facts = extractor().extract(&event);
        assert!(facts.transcript.contains("terms and conditions"));
    }

    #[test]
    fn empty_payload_degrades_quietly() {
        let facts = extractor().extract(&json!({}));
        assert_eq!(facts.direction, Direction::Unknown);
        assert_eq!(facts.customer_phone, None);
        assert_eq!(facts.transcript, "{}");
    }
}
