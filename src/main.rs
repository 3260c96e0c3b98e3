use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use fulfillment_webhook::config::AppConfig;
use fulfillment_webhook::handlers;
use fulfillment_webhook::services::ai::openai::OpenAiProvider;
use fulfillment_webhook::services::relay::webhook::WebhookRelay;
use fulfillment_webhook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    anyhow::ensure!(!config.openai_api_key.is_empty(), "OPENAI_API_KEY must be set");
    if config.booking_webhook_url.is_empty() {
        tracing::warn!("BOOKING_WEBHOOK_URL not set, booking requests will fail");
    }

    tracing::info!(
        model = %config.openai_model,
        base_url = %config.openai_base_url,
        persona = config.system_prompt.is_some(),
        timezone = %config.calendar_timezone,
        llm_failure_status = config.llm_failure_status.as_u16(),
        "configuration loaded"
    );

    let llm = OpenAiProvider::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.openai_model.clone(),
        config.openai_temperature,
    );
    let relay = WebhookRelay::new(config.booking_webhook_url.clone());

    let state = Arc::new(AppState {
        config: config.clone(),
        llm: Box::new(llm),
        relay: Box::new(relay),
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
