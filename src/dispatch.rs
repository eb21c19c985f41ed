//! SMS dispatch through the messaging gateway.
//!
//! One send attempt per webhook delivery, never retried: the upstream
//! webhook always gets a 200 from us, so nothing redelivers, and a
//! duplicate SMS to a customer is worse than a missed one.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use tracing::{info, warn};

use crate::config::GatewayConfig;
use crate::error::DispatchError;
use crate::extract::phone::digits;
use crate::pipeline::types::DispatchResult;
use crate::templates::TemplateId;

/// Per-request timeout on the gateway HTTP call.
const GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Messaging gateway seam. Pure I/O, no business logic; the dispatcher
/// owns the preconditions and the production impl owns the wire format.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Send one message; returns the provider-assigned message id.
    async fn send_sms(&self, to: &str, body: &str) -> Result<String, DispatchError>;
}

// ── Twilio-compatible gateway ───────────────────────────────────────

/// Twilio-style messaging API client (basic auth, form-encoded send).
pub struct TwilioGateway {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl TwilioGateway {
    pub fn new(config: GatewayConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(GATEWAY_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    fn send_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.base_url, self.config.account_sid
        )
    }
}

#[async_trait]
impl SmsGateway for TwilioGateway {
    async fn send_sms(&self, to: &str, body: &str) -> Result<String, DispatchError> {
        let params = [
            ("From", self.config.from_number.as_str()),
            ("To", to),
            ("Body", body),
        ];

        let response = self
            .client
            .post(self.send_url())
            .basic_auth(
                &self.config.account_sid,
                Some(self.config.auth_token.expose_secret()),
            )
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DispatchError::Timeout
                } else {
                    DispatchError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            // Provider error detail is reported verbatim, not retried.
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                detail: text,
            });
        }

        let message_id = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|json| json.get("sid").and_then(|v| v.as_str()).map(String::from))
            .unwrap_or_default();
        Ok(message_id)
    }
}

// ── Dispatcher ──────────────────────────────────────────────────────

/// Sends a chosen template to a customer number, with safety preconditions
/// checked before any network call.
pub struct SmsDispatcher {
    gateway: Option<Arc<dyn SmsGateway>>,
    /// Digits of the gateway's sending number. The dispatcher re-verifies
    /// the destination against this even though extraction already filters
    /// it; the two layers must not share a single point of failure.
    from_digits: String,
}

impl SmsDispatcher {
    pub fn new(gateway: Arc<dyn SmsGateway>, from_number: &str) -> Self {
        Self {
            gateway: Some(gateway),
            from_digits: digits(from_number),
        }
    }

    /// Dispatcher with no gateway configured: every send fails fast.
    pub fn disabled() -> Self {
        Self {
            gateway: None,
            from_digits: String::new(),
        }
    }

    /// Send one template. Exactly one gateway call per invocation, and
    /// none at all when a precondition fails.
    pub async fn send(&self, to_phone: &str, template: TemplateId) -> DispatchResult {
        let Some(gateway) = &self.gateway else {
            warn!("SMS send requested but no gateway is configured");
            return DispatchResult::failed(DispatchError::NotConfigured.to_string());
        };

        if to_phone.trim().is_empty() {
            return DispatchResult::failed(DispatchError::CustomerPhoneUnresolved.to_string());
        }
        if !self.from_digits.is_empty() && digits(to_phone) == self.from_digits {
            // Destination normalizes to our own sending number; this is an
            // upstream extraction failure surfacing late.
            warn!(to = to_phone, "Refusing to send SMS to the gateway's own number");
            return DispatchResult::failed(DispatchError::CustomerPhoneUnresolved.to_string());
        }

        match gateway.send_sms(to_phone, template.body()).await {
            Ok(message_id) => {
                info!(
                    to = to_phone,
                    template = template.as_str(),
                    message_id = %message_id,
                    "SMS dispatched"
                );
                DispatchResult::sent(message_id)
            }
            Err(e) => {
                warn!(
                    to = to_phone,
                    template = template.as_str(),
                    error = %e,
                    "SMS dispatch failed"
                );
                DispatchResult::failed(e.to_string())
            }
        }
    }
}
