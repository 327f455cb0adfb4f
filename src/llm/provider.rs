use async_trait::async_trait;

use super::types::{Completion, CompletionRequest};
use crate::core::errors::ProviderError;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// return the provider name (e.g. "groq")
    fn name(&self) -> &str;

    /// chat completion (non-streaming)
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError>;
}
