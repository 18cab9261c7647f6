//! Retrieval abstraction used by conversation pipelines.

use async_trait::async_trait;

use crate::client::{MemoryClient, MemoryQuery};
use crate::error::Result;
use crate::types::Retrieval;

/// Source of memory graph context for a conversation.
///
/// Pipelines depend on this trait rather than on [`MemoryClient`] directly so
/// tests can script retrieval outcomes.
#[async_trait]
pub trait MemoryRetriever: Send + Sync {
    async fn retrieve(&self, query: &str, memory_id: &str, assisted: bool) -> Result<Retrieval>;
}

#[async_trait]
impl MemoryRetriever for MemoryClient {
    async fn retrieve(&self, query: &str, memory_id: &str, assisted: bool) -> Result<Retrieval> {
        let query = MemoryQuery::new(query)
            .with_memory_id(memory_id)
            .assisted(assisted);
        self.retrieve_memory(&query).await
    }
}

/// Retriever that never returns context. Useful when a pipeline runs without
/// a memory service attached.
#[derive(Debug, Default, Clone)]
pub struct NoopRetriever;

#[async_trait]
impl MemoryRetriever for NoopRetriever {
    async fn retrieve(&self, _query: &str, _memory_id: &str, _assisted: bool) -> Result<Retrieval> {
        Ok(Retrieval::default())
    }
}
