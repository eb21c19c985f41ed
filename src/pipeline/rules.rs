//! Transcript classification rules.
//!
//! Deterministic, first-match-wins keyword matching over the lowercased
//! transcript. Order of evaluation:
//! - Block keywords → suppress, overriding everything else
//! - Trigger categories in priority order (explicit document/reference
//!   requests first) → send that category's template
//! - OUTBOUND direction fallback → generic confirmation
//! - Otherwise → suppress
//!
//! Classification is intentionally a rule match and not a language model:
//! outbound customer SMS must come from a fixed approved template, and the
//! decision must be reproducible from the audit log.

use tracing::debug;

use crate::pipeline::types::{Decision, Direction};
use crate::templates::TemplateId;

/// A trigger category: ordered keywords mapped to one template.
#[derive(Debug, Clone)]
pub struct TriggerRule {
    /// Category name, used in decision reasons.
    pub category: &'static str,
    /// Lowercase substrings, evaluated in listed order.
    pub keywords: Vec<&'static str>,
    /// Template sent when any keyword matches.
    pub template: TemplateId,
}

/// Keyword classifier for call transcripts.
///
/// Rules are process-wide static configuration: built once at startup,
/// never mutated. Categories are held in priority order; a transcript
/// containing keywords from several categories gets the first one.
pub struct ClassifierEngine {
    /// Any hit here forces suppression, checked before all triggers.
    block_keywords: Vec<&'static str>,
    triggers: Vec<TriggerRule>,
}

impl ClassifierEngine {
    /// Create a classifier with the production rule set.
    pub fn default_rules() -> Self {
        let block_keywords = vec![
            // Failed identity verification: the caller was never
            // authenticated, so no account-related SMS may go out.
            "unable to verify",
            "could not verify your identity",
            "cannot verify your identity",
            "verification failed",
            // Explicit opt-outs.
            "do not send me",
            "don't send me",
            "do not text me",
            "stop contacting me",
            // Misdialed customer.
            "wrong number",
        ];

        let triggers = vec![
            // Explicit document requests come before anything generic: a
            // customer asking for the T&Cs must get the T&Cs link, not a
            // blanket confirmation, even on an outbound call.
            TriggerRule {
                category: "rewards_tnc",
                keywords: vec![
                    "terms and conditions",
                    "terms & conditions",
                    "t&c",
                    "t and c",
                    "rewards terms",
                ],
                template: TemplateId::RewardsTnc,
            },
            TriggerRule {
                category: "complaint",
                keywords: vec![
                    "complaint",
                    "complain",
                    "case reference",
                    "raise a case",
                    "unhappy with the service",
                ],
                template: TemplateId::Complaint,
            },
        ];

        Self {
            block_keywords,
            triggers,
        }
    }

    /// Create an empty classifier (for testing).
    pub fn empty() -> Self {
        Self {
            block_keywords: Vec::new(),
            triggers: Vec::new(),
        }
    }

    /// Classify a transcript. Pure function: same input, same decision.
    pub fn classify(&self, transcript: &str, direction: Direction) -> Decision {
        let haystack = transcript.to_lowercase();

        // Block keywords override every trigger below.
        for keyword in self.block_keywords.iter().copied() {
            if haystack.contains(keyword) {
                debug!(keyword, "Transcript matched block keyword");
                return Decision::suppress(format!("blocked: {keyword}"));
            }
        }

        for rule in &self.triggers {
            for keyword in rule.keywords.iter().copied() {
                if haystack.contains(keyword) {
                    debug!(
                        category = rule.category,
                        keyword,
                        template = rule.template.as_str(),
                        "Transcript matched trigger keyword"
                    );
                    return Decision::send(
                        rule.template,
                        format!("matched {} keyword: {keyword}", rule.category),
                    );
                }
            }
        }

        // Direction fallback, tried only after every explicit trigger.
        if direction == Direction::Outbound {
            debug!("No trigger matched; outbound call gets the confirmation template");
            return Decision::send(
                TemplateId::OutboundConfirmation,
                "outbound call completed",
            );
        }

        Decision::suppress("no trigger keywords matched")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tnc_request_sends_rewards_template() {
        let engine = ClassifierEngine::default_rules();
        let decision = engine.classify(
            "Please send me the terms and conditions by SMS",
            Direction::Inbound,
        );
        assert!(decision.should_send);
        assert_eq!(decision.template, Some(TemplateId::RewardsTnc));
    }

    #[test]
    fn complaint_request_sends_complaint_template() {
        let engine = ClassifierEngine::default_rules();
        let decision = engine.classify(
            "I am calling to complain, please send case reference",
            Direction::Inbound,
        );
        assert!(decision.should_send);
        assert_eq!(decision.template, Some(TemplateId::Complaint));
    }

    #[test]
    fn outbound_call_without_triggers_gets_confirmation() {
        let engine = ClassifierEngine::default_rules();
        let decision = engine.classify("Thank you, goodbye", Direction::Outbound);
        assert!(decision.should_send);
        assert_eq!(decision.template, Some(TemplateId::OutboundConfirmation));
        assert!(decision.reason.contains("outbound call completed"));
    }

    #[test]
    fn inbound_call_without_triggers_is_suppressed() {
        let engine = ClassifierEngine::default_rules();
        let decision = engine.classify("Thank you, goodbye", Direction::Inbound);
        assert!(!decision.should_send);
        assert_eq!(decision.template, None);
        assert_eq!(decision.reason, "no trigger keywords matched");
    }

    #[test]
    fn block_keyword_suppresses_regardless_of_direction() {
        let engine = ClassifierEngine::default_rules();
        let transcript = "We were unable to verify your identity, please visit a branch";
        for direction in [Direction::Inbound, Direction::Outbound, Direction::Unknown] {
            let decision = engine.classify(transcript, direction);
            assert!(!decision.should_send, "direction {:?}", direction);
            assert!(decision.reason.starts_with("blocked:"));
        }
    }

    #[test]
    fn block_keyword_overrides_trigger_keyword() {
        let engine = ClassifierEngine::default_rules();
        let decision = engine.classify(
            "We were unable to verify your identity, so I cannot send the \
             terms and conditions",
            Direction::Inbound,
        );
        assert!(!decision.should_send);
        assert!(decision.reason.starts_with("blocked:"));
    }

    #[test]
    fn explicit_trigger_beats_outbound_fallback() {
        // An explicit T&C request on an outbound call must get the specific
        // template, never the generic confirmation.
        let engine = ClassifierEngine::default_rules();
        let decision = engine.classify(
            "Yes, please text me the terms and conditions. Goodbye.",
            Direction::Outbound,
        );
        assert_eq!(decision.template, Some(TemplateId::RewardsTnc));
    }

    #[test]
    fn earlier_category_wins_when_both_match() {
        let engine = ClassifierEngine::default_rules();
        let decision = engine.classify(
            "I want to complain about the terms and conditions",
            Direction::Inbound,
        );
        // rewards_tnc is listed before complaint.
        assert_eq!(decision.template, Some(TemplateId::RewardsTnc));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let engine = ClassifierEngine::default_rules();
        let decision = engine.classify("SEND THE TERMS AND CONDITIONS", Direction::Inbound);
        assert_eq!(decision.template, Some(TemplateId::RewardsTnc));
    }

    #[test]
    fn classify_is_deterministic() {
        let engine = ClassifierEngine::default_rules();
        let transcript = "I would like the terms and conditions and to complain";
        let first = engine.classify(transcript, Direction::Inbound);
        let second = engine.classify(transcript, Direction::Inbound);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_transcript_falls_through() {
        let engine = ClassifierEngine::default_rules();
        assert!(!engine.classify("", Direction::Inbound).should_send);
        assert!(engine.classify("", Direction::Outbound).should_send);
    }

    #[test]
    fn empty_rules_only_keeps_direction_fallback() {
        let engine = ClassifierEngine::empty();
        let decision = engine.classify("please send the terms and conditions", Direction::Inbound);
        assert!(!decision.should_send);
        let decision = engine.classify("anything", Direction::Outbound);
        assert_eq!(decision.template, Some(TemplateId::OutboundConfirmation));
    }
}
