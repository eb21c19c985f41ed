//! Outbound call initiation through the voice-AI provider.
//!
//! Thin, validated request shaping: collect every violation before
//! rejecting, build the provider's conversation-initiation body, and pass
//! provider failures through with their own detail.

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::extract::phone::digits;

/// Client request to start an outbound call. Everything is optional at
/// the serde layer; `validate` decides what is actually required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutboundCallRequest {
    pub to_number: Option<String>,
    pub customer_name: Option<String>,
    pub first_message: Option<String>,
    pub language: Option<String>,
    /// Arbitrary key-value context, flattened into the agent's dynamic
    /// variables.
    pub context: Option<Value>,
}

impl OutboundCallRequest {
    /// Check the request, collecting every violation rather than failing
    /// on the first. Empty result means the request is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();

        match self.to_number.as_deref().map(str::trim) {
            None | Some("") => {
                violations.push("to_number is required".to_string());
            }
            Some(number) => {
                let digit_count = digits(number).len();
                if !(10..=20).contains(&digit_count) {
                    violations.push(format!(
                        "to_number does not look like a phone number: {number}"
                    ));
                }
            }
        }

        if let Some(context) = &self.context {
            if !context.is_object() {
                violations.push("context must be a JSON object".to_string());
            }
        }

        violations
    }
}

/// Provider acknowledgment for a started call.
#[derive(Debug, Clone, Serialize)]
pub struct CallHandle {
    pub conversation_id: Option<String>,
    pub call_id: Option<String>,
}

/// Voice-AI provider client for the outbound-call API.
pub struct VoiceProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl VoiceProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Start an outbound call. The request must already be validated.
    pub async fn start_call(&self, request: &OutboundCallRequest) -> Result<CallHandle, ProviderError> {
        let to_number = request.to_number.as_deref().unwrap_or_default().trim();
        let body = self.build_body(request, to_number);

        info!(to_number, agent_id = %self.config.agent_id, "Initiating outbound call");

        let response = self
            .client
            .post(format!(
                "{}/v1/convai/twilio/outbound-call",
                self.config.base_url
            ))
            .header("xi-api-key", self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            warn!(status = status.as_u16(), "Provider rejected call initiation");
            return Err(ProviderError::RequestFailed {
                status: status.as_u16(),
                detail: extract_error_detail(&text),
            });
        }

        let parsed: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok(CallHandle {
            conversation_id: string_at(&parsed, &["conversation_id", "conversationId"]),
            call_id: string_at(&parsed, &["callSid", "call_sid", "call_id"]),
        })
    }

    fn build_body(&self, request: &OutboundCallRequest, to_number: &str) -> Value {
        let mut dynamic_variables = Map::new();
        if let Some(name) = request.customer_name.as_deref() {
            dynamic_variables.insert("customer_name".into(), Value::String(name.to_string()));
        }
        if let Some(Value::Object(context)) = &request.context {
            for (key, value) in context {
                dynamic_variables.insert(key.clone(), flatten_variable(value));
            }
        }

        let mut agent_override = Map::new();
        if let Some(first_message) = request.first_message.as_deref() {
            agent_override.insert("first_message".into(), json!(first_message));
        }
        if let Some(language) = request.language.as_deref() {
            agent_override.insert("language".into(), json!(language));
        }

        json!({
            "agent_id": self.config.agent_id,
            "agent_phone_number_id": self.config.agent_phone_number_id,
            "to_number": to_number,
            "conversation_initiation_client_data": {
                "dynamic_variables": dynamic_variables,
                "conversation_config_override": {
                    "agent": agent_override,
                },
            },
        })
    }
}

/// Dynamic variables must be scalars; nested values are carried as their
/// JSON text.
fn flatten_variable(value: &Value) -> Value {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => value.clone(),
        nested => Value::String(nested.to_string()),
    }
}

/// Best-effort error message from a provider error body.
fn extract_error_detail(text: &str) -> String {
    let parsed: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => return text.to_string(),
    };
    for key in ["detail", "message", "error"] {
        match parsed.get(key) {
            Some(Value::String(s)) => return s.clone(),
            Some(other) if !other.is_null() => return other.to_string(),
            _ => {}
        }
    }
    text.to_string()
}

fn string_at(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(String::from)
}
