pub mod health;
pub mod voice;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/voice/sessions", post(voice::create_session))
        .route(
            "/api/voice/sessions/:id",
            get(voice::get_session).delete(voice::delete_session),
        )
        .route("/api/voice/sessions/:id/turn", put(voice::put_turn))
        .route("/api/voice/sessions/:id/patient", put(voice::put_patient))
        .route("/api/voice/sessions/:id/events", post(voice::post_event))
        .route("/api/voice/sessions/:id/input/take", post(voice::take_input))
        .route("/api/voice/sessions/:id/feedback", get(voice::feedback_stream))
        .with_state(state)
}
