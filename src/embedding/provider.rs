use async_trait::async_trait;

use crate::core::errors::ProviderError;

/// Maps text to fixed-length vectors with a pretrained sentence-embedding
/// model. Implementations are stateless per call and shared read-only.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn model_name(&self) -> &str;

    /// One vector per input, in input order.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| ProviderError::Malformed {
            provider: "embedding",
            message: "no vector returned for query".to_string(),
        })
    }
}
