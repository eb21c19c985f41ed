//! Webhook orchestrator.
//!
//! **Core invariant: the upstream provider always gets a 200.**
//! A non-200 acknowledgment makes the provider redeliver the webhook, and a
//! redelivery means a duplicate SMS to a bank customer. Every internal
//! fault, including a panic anywhere in the pipeline, is caught here and
//! folded into the acknowledgment body.
//!
//! Flow:
//! 1. Parse body (malformed input degrades to an empty event)
//! 2. Extract call facts → no phone short-circuits, classifier not invoked
//! 3. Classify transcript → suppress short-circuits with the reason
//! 4. Dispatch the chosen template, bounded by a timeout

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::dispatch::SmsDispatcher;
use crate::error::DispatchError;
use crate::extract::FieldExtractor;
use crate::pipeline::rules::ClassifierEngine;
use crate::pipeline::types::{DispatchResult, WebhookReply};

/// Upper bound on the single gateway call. A hung gateway must not hold
/// the webhook connection open; timeout counts as a dispatch failure.
const DISPATCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Orchestrates one call-ended delivery end to end.
///
/// Stateless across deliveries; the only shared data is the read-only
/// rule set and the extractor's probe tables.
pub struct WebhookProcessor {
    extractor: FieldExtractor,
    classifier: ClassifierEngine,
    dispatcher: SmsDispatcher,
}

impl WebhookProcessor {
    pub fn new(
        extractor: FieldExtractor,
        classifier: ClassifierEngine,
        dispatcher: SmsDispatcher,
    ) -> Self {
        Self {
            extractor,
            classifier,
            dispatcher,
        }
    }

    /// Handle one raw webhook delivery. Infallible: every path, including
    /// a panic in the pipeline, produces an acknowledgment body.
    pub async fn handle(&self, raw_body: &[u8]) -> WebhookReply {
        let event_id = Uuid::new_v4();

        let event = match serde_json::from_slice::<Value>(raw_body) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    %event_id,
                    error = %e,
                    bytes = raw_body.len(),
                    "Webhook body is not valid JSON; continuing with an empty event"
                );
                Value::Object(Default::default())
            }
        };

        match AssertUnwindSafe(self.run(event_id, &event))
            .catch_unwind()
            .await
        {
            Ok(reply) => reply,
            Err(panic) => {
                let detail = panic_detail(panic.as_ref());
                error!(%event_id, detail = %detail, "Webhook pipeline panicked; acknowledging anyway");
                WebhookReply::internal_error(detail)
            }
        }
    }

    async fn run(&self, event_id: Uuid, event: &Value) -> WebhookReply {
        let facts = self.extractor.extract(event);
        info!(
            %event_id,
            direction = facts.direction.label(),
            phone_found = facts.customer_phone.is_some(),
            transcript_chars = facts.transcript.len(),
            "Call facts extracted"
        );

        let Some(phone) = facts.customer_phone.as_deref() else {
            info!(%event_id, "No customer phone number found; SMS suppressed");
            return WebhookReply::suppressed("no phone number found in webhook payload");
        };

        let decision = self
            .classifier
            .classify(&facts.transcript, facts.direction);
        info!(
            %event_id,
            should_send = decision.should_send,
            template = decision.template.map(|t| t.as_str()).unwrap_or("none"),
            reason = %decision.reason,
            "Transcript classified"
        );

        let Some(template) = decision.template.filter(|_| decision.should_send) else {
            return WebhookReply::suppressed(decision.reason);
        };

        let result = match tokio::time::timeout(
            DISPATCH_TIMEOUT,
            self.dispatcher.send(phone, template),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(%event_id, "Gateway call exceeded the dispatch timeout");
                DispatchResult::failed(DispatchError::Timeout.to_string())
            }
        };

        info!(
            %event_id,
            success = result.success,
            message_id = result.message_id.as_deref().unwrap_or(""),
            error = result.error.as_deref().unwrap_or(""),
            "Dispatch finished"
        );

        if result.success {
            WebhookReply::sent(template, result.message_id.unwrap_or_default())
        } else {
            WebhookReply::dispatch_failed(
                template,
                result
                    .error
                    .unwrap_or_else(|| "unknown dispatch failure".to_string()),
            )
        }
    }
}

fn panic_detail(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "internal error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::dispatch::SmsGateway;

    const GATEWAY_NUMBER: &str = "+15550001111";

    enum StubMode {
        Succeed,
        Fail,
        Panic,
    }

    struct StubGateway {
        mode: StubMode,
        sends: AtomicUsize,
    }

    impl StubGateway {
        fn new(mode: StubMode) -> Arc<Self> {
            Arc::new(Self {
                mode,
                sends: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SmsGateway for StubGateway {
        async fn send_sms(&self, _to: &str, _body: &str) -> Result<String, DispatchError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            match self.mode {
                StubMode::Succeed => Ok("SM_stub".into()),
                StubMode::Fail => Err(DispatchError::Rejected {
                    status: 503,
                    detail: "gateway unavailable".into(),
                }),
                StubMode::Panic => panic!("stub gateway exploded"),
            }
        }
    }

    fn processor(gateway: Arc<StubGateway>) -> WebhookProcessor {
        WebhookProcessor::new(
            FieldExtractor::new(GATEWAY_NUMBER),
            ClassifierEngine::default_rules(),
            SmsDispatcher::new(gateway, GATEWAY_NUMBER),
        )
    }

    fn tnc_event() -> Vec<u8> {
        serde_json::json!({
            "call_type": "inbound",
            "from": "+447700900123",
            "transcript": "Please send me the terms and conditions by SMS",
        })
        .to_string()
        .into_bytes()
    }

    #[tokio::test]
    async fn happy_path_sends_and_acknowledges() {
        let gateway = StubGateway::new(StubMode::Succeed);
        let reply = processor(gateway.clone()).handle(&tnc_event()).await;

        assert!(reply.received);
        assert!(reply.sms_sent);
        assert_eq!(reply.sms_type.as_deref(), Some("rewards_tnc"));
        assert_eq!(reply.message_id.as_deref(), Some("SM_stub"));
        assert_eq!(gateway.sends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_phone_short_circuits_before_dispatch() {
        let gateway = StubGateway::new(StubMode::Succeed);
        let body = serde_json::json!({
            "call_type": "inbound",
            "transcript": "Please send me the terms and conditions",
        })
        .to_string();

        let reply = processor(gateway.clone()).handle(body.as_bytes()).await;
        assert!(reply.received);
        assert!(!reply.sms_sent);
        assert!(reply.reason.unwrap().contains("no phone number found"));
        assert_eq!(gateway.sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn suppressed_decision_skips_dispatch() {
        let gateway = StubGateway::new(StubMode::Succeed);
        let body = serde_json::json!({
            "call_type": "inbound",
            "from": "+447700900123",
            "transcript": "We were unable to verify your identity, please visit a branch",
        })
        .to_string();

        let reply = processor(gateway.clone()).handle(body.as_bytes()).await;
        assert!(!reply.sms_sent);
        assert!(reply.reason.unwrap().starts_with("blocked:"));
        assert_eq!(gateway.sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn gateway_failure_is_reported_in_acknowledgment() {
        let gateway = StubGateway::new(StubMode::Fail);
        let reply = processor(gateway).handle(&tnc_event()).await;

        assert!(reply.received);
        assert!(!reply.sms_sent);
        assert_eq!(reply.sms_type.as_deref(), Some("rewards_tnc"));
        assert!(reply.sms_error.unwrap().contains("gateway unavailable"));
    }

    #[tokio::test]
    async fn panic_in_pipeline_still_acknowledges() {
        let gateway = StubGateway::new(StubMode::Panic);
        let reply = processor(gateway).handle(&tnc_event()).await;

        assert!(reply.received);
        assert!(!reply.sms_sent);
        assert!(reply.error.unwrap().contains("stub gateway exploded"));
    }

    #[tokio::test]
    async fn malformed_body_degrades_to_empty_event() {
        let gateway = StubGateway::new(StubMode::Succeed);
        let reply = processor(gateway.clone()).handle(b"not json at all").await;

        assert!(reply.received);
        assert!(!reply.sms_sent);
        assert!(reply.reason.unwrap().contains("no phone number found"));
        assert_eq!(gateway.sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn outbound_confirmation_flows_end_to_end() {
        let gateway = StubGateway::new(StubMode::Succeed);
        let body = serde_json::json!({
            "call_type": "outboundPhoneCall",
            "to": "+447700900123",
            "transcript": "Thank you, goodbye",
        })
        .to_string();

        let reply = processor(gateway).handle(body.as_bytes()).await;
        assert!(reply.sms_sent);
        assert_eq!(reply.sms_type.as_deref(), Some("outbound_confirmation"));
    }
}
