use anyhow::Result;
use async_trait::async_trait;

/// Text generation seam. The model only phrases replies; every price,
/// routing, and escalation decision is made deterministically before the
/// prompt is built.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
