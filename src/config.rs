use std::env;
use std::time::Duration;

use crate::services::capture::CaptureSettings;
use crate::services::driver::DEFAULT_REASON;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub chat_api_url: String,
    pub chat_timeout_secs: u64,
    pub voice_language: String,
    pub restart_delay_ms: u64,
    pub retry_delay_ms: u64,
    pub default_reason: String,
    pub session_ttl_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            chat_api_url: env::var("CHAT_API_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
            chat_timeout_secs: env::var("CHAT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            voice_language: env::var("VOICE_LANGUAGE").unwrap_or_else(|_| "en".to_string()),
            restart_delay_ms: env::var("RESTART_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            retry_delay_ms: env::var("RETRY_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            default_reason: env::var("DEFAULT_REASON")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REASON.to_string()),
            session_ttl_secs: env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1800),
        }
    }

    pub fn chat_timeout(&self) -> Duration {
        Duration::from_secs(self.chat_timeout_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn capture_settings(&self) -> CaptureSettings {
        CaptureSettings {
            restart_delay: Duration::from_millis(self.restart_delay_ms),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}
