//! The `KnowledgeSource` trait defines the interface for every knowledge-base
//! backend (REST, test doubles).

use async_trait::async_trait;
use ap_domain::error::Result;

use crate::types::{KbQueryRequest, KbQueryResponse};

/// Abstraction over the knowledge-base query service.
///
/// Implementations fail with `Error::Upstream` on non-2xx responses and
/// `Error::Transport` on network failure. They never retry.
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// Ask one natural-language question (POST /query/{profile}).
    async fn query(&self, req: KbQueryRequest) -> Result<KbQueryResponse>;

    /// Service health (GET /health).
    async fn health(&self) -> Result<serde_json::Value>;
}
