//! Post-call notification pipeline.
//!
//! Every call-ended delivery flows through:
//! 1. `FieldExtractor::extract()` — best-effort facts from the raw payload
//! 2. `ClassifierEngine::classify()` — deterministic keyword rules
//! 3. `SmsDispatcher::send()` — at most one templated SMS
//! 4. `WebhookProcessor::handle()` — the always-200 acknowledgment
//!
//! **No free-form outbound text exists.** Every SMS body is a fixed,
//! pre-approved template chosen by the classifier.

pub mod processor;
pub mod rules;
pub mod types;

pub use processor::WebhookProcessor;
pub use rules::ClassifierEngine;
pub use types::{CallFacts, Decision, Direction, DispatchResult, WebhookReply};
