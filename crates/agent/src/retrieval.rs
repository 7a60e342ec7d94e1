use anyhow::Result;
use async_trait::async_trait;

/// Similarity search over the property knowledge base. Returns document
/// snippets ranked by relevance, at most `top_k`.
#[async_trait]
pub trait DocumentRetriever: Send + Sync {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<String>>;
}

/// Live occupancy feed used to pick the negotiation tier. Failures fall
/// back to the configured default rate.
#[async_trait]
pub trait OccupancySource: Send + Sync {
    async fn current_rate(&self) -> Result<f64>;
}
