//! Read-only nearest-neighbor lookup over passage embeddings.
//!
//! The on-disk implementation is `SqliteVectorIndex` in the `sqlite` module.

use async_trait::async_trait;

use crate::core::errors::ProviderError;

/// Minimal retrieved unit. Ranking scores are not carried past the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    pub content: String,
}

impl Passage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Up to `limit` passages, most similar first.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<Passage>, ProviderError>;

    /// Number of stored passages.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
