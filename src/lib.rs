//! call-notify — post-call SMS follow-up service.
//!
//! Receives call-ended webhooks from a voice-AI provider, extracts call
//! facts from the loosely-structured payload, classifies the transcript
//! against a fixed rule set, and dispatches at most one pre-approved
//! templated SMS through the messaging gateway. The webhook is always
//! acknowledged with HTTP 200. Also hosts the outbound-call initiation
//! endpoint.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod initiate;
pub mod pipeline;
pub mod recent;
pub mod routes;
pub mod templates;
