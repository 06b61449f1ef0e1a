use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::dialogue::VoiceDialogue;
use crate::services::session::BookingSession;
use crate::services::speech::{SpeechOutput, Utterance};

/// A voice session behind its own async lock, so commands for one widget are
/// handled strictly one after another.
pub type SharedDialogue = Arc<tokio::sync::Mutex<VoiceDialogue>>;

pub struct SessionEntry {
    pub dialogue: SharedDialogue,
    pub last_seen: Instant,
}

pub struct AppState {
    pub config: AppConfig,
    pub session: Box<dyn BookingSession>,
    pub speech: Box<dyn SpeechOutput>,
    pub dialogues: Mutex<HashMap<String, SessionEntry>>,
    pub feedback_tx: broadcast::Sender<Utterance>,
}

impl AppState {
    pub fn open_dialogue(&self, dialogue: VoiceDialogue) {
        let id = dialogue.id().to_string();
        self.dialogues.lock().unwrap().insert(
            id,
            SessionEntry {
                dialogue: Arc::new(tokio::sync::Mutex::new(dialogue)),
                last_seen: Instant::now(),
            },
        );
    }

    /// Look up a session and mark it as seen.
    pub fn dialogue(&self, id: &str) -> Result<SharedDialogue, AppError> {
        let mut dialogues = self.dialogues.lock().unwrap();
        let entry = dialogues
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("voice session {id}")))?;
        entry.last_seen = Instant::now();
        Ok(entry.dialogue.clone())
    }

    pub fn close_dialogue(&self, id: &str) -> bool {
        self.dialogues.lock().unwrap().remove(id).is_some()
    }

    /// Drop sessions nobody has touched for `ttl`. A session some request
    /// still holds is kept. Returns how many were dropped.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut dialogues = self.dialogues.lock().unwrap();
        let before = dialogues.len();

        dialogues.retain(|id, entry| {
            let keep = now.duration_since(entry.last_seen) < ttl
                || Arc::strong_count(&entry.dialogue) > 1;
            if !keep {
                tracing::info!(voice_session = %id, "idle voice session evicted");
            }
            keep
        });

        before - dialogues.len()
    }
}
