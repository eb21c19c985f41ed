//! Pre-approved SMS templates.
//!
//! Regulatory constraint: the service may only ever send one of these
//! literal bodies. There is no runtime composition and no interpolation;
//! the classifier picks a variant of this closed enum, so an unknown
//! template id cannot exist at runtime.

use serde::{Deserialize, Serialize};

/// Identifier of a fixed message template, carrying its literal body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    /// Customer asked for the rewards account terms and conditions.
    RewardsTnc,
    /// Customer raised a complaint and was promised a case reference.
    Complaint,
    /// Generic follow-up after a completed outbound call.
    OutboundConfirmation,
}

impl TemplateId {
    /// Wire label, used as `sms_type` in the webhook acknowledgment.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RewardsTnc => "rewards_tnc",
            Self::Complaint => "complaint",
            Self::OutboundConfirmation => "outbound_confirmation",
        }
    }

    /// The literal, pre-approved message body.
    pub fn body(self) -> &'static str {
        match self {
            Self::RewardsTnc => {
                "Thank you for speaking with us today. As requested, the Rewards \
                 account terms and conditions are available at \
                 https://www.examplebank.co.uk/rewards/terms. Please do not reply \
                 to this message."
            }
            Self::Complaint => {
                "Thank you for raising your concern with us. Your complaint has \
                 been logged and you will receive a case reference within one \
                 working day. If you need further help, please call us on the \
                 number on the back of your card."
            }
            Self::OutboundConfirmation => {
                "Thank you for speaking with our automated assistant today. If \
                 you have any further questions, please call us on the number on \
                 the back of your card. Please do not reply to this message."
            }
        }
    }
}
