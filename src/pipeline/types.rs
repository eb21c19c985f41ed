//! Shared types for the post-call notification pipeline.

use serde::{Deserialize, Serialize};

use crate::templates::TemplateId;

// ── Call direction ──────────────────────────────────────────────────

/// Direction of the completed call, as reported by the provider payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outbound,
    Inbound,
    Unknown,
}

impl Direction {
    /// Parse a raw payload value. Provider payloads vary
    /// ("outbound", "outboundPhoneCall", "OUTBOUND", ...), so this matches
    /// on substring rather than exact value.
    pub fn parse(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        if lower.contains("outbound") {
            Self::Outbound
        } else if lower.contains("inbound") {
            Self::Inbound
        } else {
            Self::Unknown
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Outbound => "outbound",
            Self::Inbound => "inbound",
            Self::Unknown => "unknown",
        }
    }
}

// ── Extracted call facts ────────────────────────────────────────────

/// Best-effort facts extracted from a call-ended payload.
///
/// Constructed once per delivery and immutable afterwards.
/// `customer_phone: None` is the explicit "not found" outcome; a present
/// phone never normalizes to the gateway's own number.
#[derive(Debug, Clone, Serialize)]
pub struct CallFacts {
    pub direction: Direction,
    pub customer_phone: Option<String>,
    /// Flattened transcript text, possibly empty.
    pub transcript: String,
}

// ── Classification decision ─────────────────────────────────────────

/// Outcome of classifying one transcript. Produced fresh per delivery,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub should_send: bool,
    pub template: Option<TemplateId>,
    /// Human-readable justification, kept for the audit log.
    pub reason: String,
}

impl Decision {
    pub fn send(template: TemplateId, reason: impl Into<String>) -> Self {
        Self {
            should_send: true,
            template: Some(template),
            reason: reason.into(),
        }
    }

    pub fn suppress(reason: impl Into<String>) -> Self {
        Self {
            should_send: false,
            template: None,
            reason: reason.into(),
        }
    }
}

// ── Dispatch result ─────────────────────────────────────────────────

/// Result of a single SMS send attempt.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchResult {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl DispatchResult {
    pub fn sent(message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

// ── Webhook reply ───────────────────────────────────────────────────

/// Body of the always-200 webhook acknowledgment.
///
/// `received` is true on every path, including internal failures; the
/// upstream provider retries on non-200 and a retry means a duplicate SMS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookReply {
    pub received: bool,
    pub sms_sent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookReply {
    /// SMS delivered; carries the template label and provider message id.
    pub fn sent(template: TemplateId, message_id: impl Into<String>) -> Self {
        Self {
            received: true,
            sms_sent: true,
            sms_type: Some(template.as_str().to_string()),
            message_id: Some(message_id.into()),
            sms_error: None,
            reason: None,
            error: None,
        }
    }

    /// No SMS was warranted (suppressed, or no phone found).
    pub fn suppressed(reason: impl Into<String>) -> Self {
        Self {
            received: true,
            sms_sent: false,
            sms_type: None,
            message_id: None,
            sms_error: None,
            reason: Some(reason.into()),
            error: None,
        }
    }

    /// An SMS was warranted but the dispatch failed.
    pub fn dispatch_failed(template: TemplateId, error: impl Into<String>) -> Self {
        Self {
            received: true,
            sms_sent: false,
            sms_type: Some(template.as_str().to_string()),
            message_id: None,
            sms_error: Some(error.into()),
            reason: None,
            error: None,
        }
    }

    /// An unexpected internal fault was caught at the orchestrator boundary.
    pub fn internal_error(detail: impl Into<String>) -> Self {
        Self {
            received: true,
            sms_sent: false,
            sms_type: None,
            message_id: None,
            sms_error: None,
            reason: None,
            error: Some(detail.into()),
        }
    }
}
