//! Configuration types, built from environment variables.

use secrecy::SecretString;

/// Default Twilio-compatible API base.
const DEFAULT_SMS_API_BASE: &str = "https://api.twilio.com";

/// Default voice-AI provider API base.
const DEFAULT_VOICE_API_BASE: &str = "https://api.elevenlabs.io";

/// SMS gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub account_sid: String,
    pub auth_token: SecretString,
    /// The number SMS are sent from. Extraction and dispatch both refuse to
    /// treat this number as a customer destination.
    pub from_number: String,
    pub base_url: String,
}

impl GatewayConfig {
    /// Build config from environment variables.
    /// Returns `None` if `SMS_ACCOUNT_SID` is not set (dispatch disabled).
    pub fn from_env() -> Option<Self> {
        let account_sid = std::env::var("SMS_ACCOUNT_SID").ok()?;
        let auth_token = std::env::var("SMS_AUTH_TOKEN").unwrap_or_default();
        let from_number = std::env::var("SMS_FROM_NUMBER").unwrap_or_default();
        let base_url = std::env::var("SMS_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_SMS_API_BASE.to_string());

        Some(Self {
            account_sid,
            auth_token: SecretString::from(auth_token),
            from_number,
            base_url,
        })
    }
}

/// Voice-AI provider configuration (outbound call initiation).
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: SecretString,
    pub agent_id: String,
    pub agent_phone_number_id: String,
    pub base_url: String,
}

impl ProviderConfig {
    /// Build config from environment variables.
    /// Returns `None` if `VOICE_API_KEY` is not set (initiation disabled).
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("VOICE_API_KEY").ok()?;
        let agent_id = std::env::var("VOICE_AGENT_ID").unwrap_or_default();
        let agent_phone_number_id =
            std::env::var("VOICE_AGENT_PHONE_NUMBER_ID").unwrap_or_default();
        let base_url = std::env::var("VOICE_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_VOICE_API_BASE.to_string());

        Some(Self {
            api_key: SecretString::from(api_key),
            agent_id,
            agent_phone_number_id,
            base_url,
        })
    }

    /// List the identifier fields that are required for initiating a call
    /// but missing from this config. Empty means ready.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.agent_id.is_empty() {
            missing.push("VOICE_AGENT_ID");
        }
        if self.agent_phone_number_id.is_empty() {
            missing.push("VOICE_AGENT_PHONE_NUMBER_ID");
        }
        missing
    }
}
