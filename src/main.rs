use anyhow::{Context, Result};
use assistant_relay::{router, AppState, AssistantsApi, Config, OpenAIClient, Relay, SessionSlot};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    let client: Arc<dyn AssistantsApi> = Arc::new(
        OpenAIClient::new(&config.api_key, &config.base_url, config.request_timeout)
            .context("Failed to build OpenAI client")?,
    );

    let sessions = SessionSlot::new();
    if config.init_strict {
        sessions
            .initialize(client.as_ref(), &config.assistant_id)
            .await
            .context("Error initializing OpenAI")?;
    } else {
        // Requests arriving before this finishes get the not-ready error.
        let slot = sessions.clone();
        let api = client.clone();
        let assistant_id = config.assistant_id.clone();
        tokio::spawn(async move {
            if slot.initialize(api.as_ref(), &assistant_id).await.is_err() {
                warn!("Serving without a conversation session");
            }
        });
    }

    let relay = Relay::new(client, config.poll.clone(), config.model.clone());
    let app = router(AppState::new(relay, sessions));

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    info!(port = config.port, "Server is running on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("HTTP server crashed")?;

    Ok(())
}
