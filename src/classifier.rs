use std::sync::Arc;

use crate::core::errors::ProviderError;
use crate::llm::{CompletionProvider, CompletionRequest};
use crate::pipeline::topic_prompt;

pub const REFUSAL_MESSAGE: &str = "I'm sorry, I can only provide medical and health-related suggestions. I won't be able to answer questions outside this topic.";

/// Cheap YES/NO gate that keeps off-topic questions away from the pipeline.
pub struct TopicClassifier {
    llm: Arc<dyn CompletionProvider>,
    model: String,
}

impl TopicClassifier {
    pub fn new(llm: Arc<dyn CompletionProvider>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    pub async fn is_medical(&self, question: &str) -> Result<bool, ProviderError> {
        let request = CompletionRequest::from_prompt(&self.model, topic_prompt(question))
            .with_max_tokens(5)
            .with_temperature(0.0);
        let completion = self.llm.complete(request).await?;
        let verdict = completion.text.trim().to_uppercase().starts_with("YES");

        tracing::debug!("Topic classifier verdict: {}", verdict);
        Ok(verdict)
    }
}
