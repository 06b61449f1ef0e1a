use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use voicebook::config::AppConfig;
use voicebook::handlers;
use voicebook::services::session::http::HttpBookingSession;
use voicebook::services::speech::broadcast::BroadcastSpeech;
use voicebook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    tracing::info!("using chat backend at {}", config.chat_api_url);
    let session = HttpBookingSession::new(config.chat_api_url.clone(), config.chat_timeout());

    let (feedback_tx, _) = broadcast::channel(256);
    let speech = BroadcastSpeech::new(feedback_tx.clone());

    let state = Arc::new(AppState {
        config: config.clone(),
        session: Box::new(session),
        speech: Box::new(speech),
        dialogues: Mutex::new(HashMap::new()),
        feedback_tx,
    });

    let sweeper = state.clone();
    let ttl = config.session_ttl();
    tokio::spawn(async move {
        let period = ttl.clamp(Duration::from_secs(1), Duration::from_secs(60));
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let evicted = sweeper.evict_idle(ttl);
            if evicted > 0 {
                tracing::info!(evicted, "swept idle voice sessions");
            }
        }
    });

    let app = handlers::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
