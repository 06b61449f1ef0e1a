pub mod broadcast;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A line of spoken feedback for one voice session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub session_id: String,
    pub text: String,
    pub locale: String,
}

#[async_trait]
pub trait SpeechOutput: Send + Sync {
    async fn speak(&self, utterance: &Utterance) -> anyhow::Result<()>;
}

/// BCP-47 locale used to voice feedback in the widget's language.
pub fn voice_locale(language: &str) -> &'static str {
    match language.split('-').next().unwrap_or("").to_lowercase().as_str() {
        "hi" => "hi-IN",
        "te" => "te-IN",
        "ta" => "ta-IN",
        "kn" => "kn-IN",
        "ml" => "ml-IN",
        "mr" => "mr-IN",
        "gu" => "gu-IN",
        "bn" => "bn-IN",
        "pa" => "pa-IN",
        "or" => "or-IN",
        "as" => "as-IN",
        "ur" => "ur-IN",
        _ => "en-US",
    }
}
