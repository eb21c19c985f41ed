use std::sync::Arc;

use call_notify::config::{GatewayConfig, ProviderConfig};
use call_notify::dispatch::{SmsDispatcher, TwilioGateway};
use call_notify::extract::FieldExtractor;
use call_notify::initiate::VoiceProvider;
use call_notify::pipeline::rules::ClassifierEngine;
use call_notify::pipeline::WebhookProcessor;
use call_notify::recent::RecentEvents;
use call_notify::routes::{AppState, app_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    eprintln!("📞 call-notify v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Webhook:  http://0.0.0.0:{}/webhook/call-ended", port);
    eprintln!("   Initiate: http://0.0.0.0:{}/call", port);
    eprintln!("   Health:   http://0.0.0.0:{}/health", port);

    // ── SMS gateway ──────────────────────────────────────────────────
    let gateway_config = GatewayConfig::from_env();
    let (dispatcher, gateway_number) = match gateway_config {
        Some(config) => {
            eprintln!(
                "   SMS gateway: enabled (account: {}, from: {})",
                config.account_sid, config.from_number
            );
            let from_number = config.from_number.clone();
            (
                SmsDispatcher::new(Arc::new(TwilioGateway::new(config)), &from_number),
                from_number,
            )
        }
        None => {
            // The webhook path still runs; dispatch reports a caught
            // failure inside the always-200 acknowledgment.
            eprintln!("   SMS gateway: DISABLED (SMS_ACCOUNT_SID not set)");
            (SmsDispatcher::disabled(), String::new())
        }
    };

    // ── Voice provider ───────────────────────────────────────────────
    let provider = match ProviderConfig::from_env() {
        Some(config) => {
            let missing = config.missing_fields();
            if missing.is_empty() {
                eprintln!("   Voice provider: enabled (agent: {})", config.agent_id);
            } else {
                eprintln!("   Voice provider: INCOMPLETE (missing: {})", missing.join(", "));
            }
            Some(Arc::new(VoiceProvider::new(config)))
        }
        None => {
            eprintln!("   Voice provider: DISABLED (VOICE_API_KEY not set)");
            None
        }
    };

    let processor = WebhookProcessor::new(
        FieldExtractor::new(&gateway_number),
        ClassifierEngine::default_rules(),
        dispatcher,
    );

    let state = AppState {
        processor: Arc::new(processor),
        provider,
        recent: RecentEvents::new(),
    };

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!(port, "call-notify listening");
    axum::serve(listener, app_routes(state)).await?;

    Ok(())
}
