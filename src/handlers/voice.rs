use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::Json;
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::errors::AppError;
use crate::models::{AssistantTurn, DialogueStep, PatientProfile};
use crate::services::capture::SpeechEvent;
use crate::services::dialogue::{Collaborators, EventReport, VoiceDialogue};
use crate::services::speech::voice_locale;
use crate::state::AppState;

fn session_view(dialogue: &VoiceDialogue) -> serde_json::Value {
    serde_json::json!({
        "id": dialogue.id(),
        "step": dialogue.step().map(DialogueStep::as_str),
        "state": dialogue.capture_state(),
        "input": dialogue.input().display(),
        "last_transcript": dialogue.last_transcript(),
        "turn": dialogue.turn(),
    })
}

// POST /api/voice/sessions
#[derive(Deserialize, Default)]
pub struct CreateSessionRequest {
    pub language: Option<String>,
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Option<Json<CreateSessionRequest>>,
) -> (StatusCode, Json<serde_json::Value>) {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let language = request
        .language
        .unwrap_or_else(|| state.config.voice_language.clone());

    let id = uuid::Uuid::new_v4().to_string();
    let dialogue = VoiceDialogue::new(
        id.clone(),
        voice_locale(&language).to_string(),
        state.config.capture_settings(),
    )
    .with_default_reason(state.config.default_reason.clone());

    state.open_dialogue(dialogue);

    tracing::info!(voice_session = %id, language = %language, "voice session created");
    (StatusCode::CREATED, Json(serde_json::json!({ "id": id })))
}

// GET /api/voice/sessions/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let dialogue = state.dialogue(&id)?;
    let dialogue = dialogue.lock().await;
    Ok(Json(session_view(&dialogue)))
}

// DELETE /api/voice/sessions/:id
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.close_dialogue(&id) {
        tracing::info!(voice_session = %id, "voice session closed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("voice session {id}")))
    }
}

// PUT /api/voice/sessions/:id/turn
pub async fn put_turn(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(turn): Json<AssistantTurn>,
) -> Result<Json<serde_json::Value>, AppError> {
    let dialogue = state.dialogue(&id)?;
    let mut dialogue = dialogue.lock().await;
    dialogue.apply_turn(turn);
    Ok(Json(session_view(&dialogue)))
}

// PUT /api/voice/sessions/:id/patient
#[derive(Deserialize)]
pub struct PatientRequest {
    pub profile: Option<PatientProfile>,
    pub reason: Option<String>,
}

pub async fn put_patient(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<PatientRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.profile.as_ref().is_some_and(|p| !p.is_complete()) {
        return Err(AppError::BadRequest("profile id must not be empty".to_string()));
    }

    let dialogue = state.dialogue(&id)?;
    dialogue.lock().await.set_patient(body.profile, body.reason);
    Ok(Json(serde_json::json!({ "ok": true })))
}

// POST /api/voice/sessions/:id/events
pub async fn post_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(event): Json<SpeechEvent>,
) -> Result<Json<EventReport>, AppError> {
    let dialogue = state.dialogue(&id)?;
    let today = chrono::Local::now().date_naive();

    // The round runs on its own task: a client that goes away mid-request
    // must not abandon it half way. The lock is held for the whole
    // classify → act round, so a second transcript waits for the turn the
    // first one produces.
    let round = tokio::spawn(async move {
        let mut dialogue = dialogue.lock().await;
        let collab = Collaborators {
            session: state.session.as_ref(),
            speech: state.speech.as_ref(),
        };
        dialogue.handle_event(event, &collab, today).await
    });

    let report = round.await.map_err(|e| {
        tracing::error!(voice_session = %id, error = %e, "voice event task failed");
        AppError::Internal(format!("voice event for session {id} failed"))
    })?;

    Ok(Json(report))
}

// POST /api/voice/sessions/:id/input/take
pub async fn take_input(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let dialogue = state.dialogue(&id)?;
    let text = dialogue.lock().await.take_input();
    Ok(Json(serde_json::json!({ "text": text })))
}

// GET /api/voice/sessions/:id/feedback (SSE)
pub async fn feedback_stream(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    state.dialogue(&id)?;

    let rx = state.feedback_tx.subscribe();

    let live_stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(utterance) if utterance.session_id == id => {
            let data = serde_json::to_string(&utterance).unwrap_or_default();
            Some(Ok(Event::default().data(data).event("feedback")))
        }
        Ok(_) => None,
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(_)) => None,
    });

    let keepalive_stream = tokio_stream::StreamExt::map(
        tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(Duration::from_secs(30))),
        |_| Ok(Event::default().comment("keepalive")),
    );

    Ok(Sse::new(StreamExt::merge(live_stream, keepalive_stream)))
}
