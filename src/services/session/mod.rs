pub mod http;

use async_trait::async_trait;

use crate::models::{ActionRequest, ActionResponse};

/// The chat backend's booking session, which owns the real dialogue state.
#[async_trait]
pub trait BookingSession: Send + Sync {
    async fn submit(&self, request: &ActionRequest) -> anyhow::Result<ActionResponse>;
}
