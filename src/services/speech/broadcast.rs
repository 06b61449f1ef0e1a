use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{SpeechOutput, Utterance};

/// Publishes feedback to every subscriber of the feedback stream; the widget
/// voices it with the browser's speech synthesis.
pub struct BroadcastSpeech {
    tx: broadcast::Sender<Utterance>,
}

impl BroadcastSpeech {
    pub fn new(tx: broadcast::Sender<Utterance>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl SpeechOutput for BroadcastSpeech {
    async fn speak(&self, utterance: &Utterance) -> anyhow::Result<()> {
        // No listeners is fine; the text is also returned to the caller.
        if self.tx.send(utterance.clone()).is_err() {
            tracing::debug!(session = %utterance.session_id, "no feedback subscribers");
        }
        Ok(())
    }
}
