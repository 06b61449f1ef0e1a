use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;

use super::BookingSession;
use crate::models::{ActionRequest, ActionResponse};

pub struct HttpBookingSession {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBookingSession {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    fn action_url(&self) -> String {
        format!("{}/api/chat/action", self.base_url)
    }
}

#[async_trait]
impl BookingSession for HttpBookingSession {
    async fn submit(&self, request: &ActionRequest) -> anyhow::Result<ActionResponse> {
        let resp = self
            .client
            .post(self.action_url())
            .json(request)
            .send()
            .await
            .context("failed to call chat action API")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("chat action API error ({status}): {body}");
        }

        resp.json::<ActionResponse>()
            .await
            .context("failed to parse chat action response")
    }
}
