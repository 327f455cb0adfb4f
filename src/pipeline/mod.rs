//! Two-pass retrieval and refinement.
//!
//! `answer()` runs strictly in sequence:
//! vector context -> draft completion -> web context -> refine completion ->
//! reasoning-markup removal. Nothing is cached between calls.

mod postprocess;
mod prompts;


use std::sync::Arc;

use thiserror::Error;

use crate::core::config::Settings;
use crate::core::errors::ProviderError;
use crate::embedding::EmbeddingProvider;
use crate::llm::{CompletionProvider, CompletionRequest};
use crate::rag::VectorIndex;
use crate::search::WebSearchProvider;

pub use postprocess::strip_reasoning_markup;
pub use prompts::{draft_prompt, refine_prompt, topic_prompt};

pub const NO_DATABASE_CONTEXT: &str = "No relevant context in database.";
pub const NO_WEB_CONTEXT: &str = "No relevant context found.";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[source] ProviderError),
    #[error("generation failed: {0}")]
    Generation(#[source] ProviderError),
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub top_k: usize,
    pub max_snippets: usize,
    pub draft_model: String,
    pub refine_model: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_snippets: 5,
            draft_model: "llama-3.3-70b-versatile".to_string(),
            refine_model: "qwen/qwen3-32b".to_string(),
        }
    }
}

impl From<&Settings> for PipelineSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            top_k: settings.rag.top_k,
            max_snippets: settings.search.max_snippets,
            draft_model: settings.llm.draft_model.clone(),
            refine_model: settings.llm.refine_model.clone(),
        }
    }
}

/// Collaborators are injected already constructed; the pipeline only reads
/// them, so one instance serves concurrent requests.
pub struct RagPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    search: Arc<dyn WebSearchProvider>,
    draft_llm: Arc<dyn CompletionProvider>,
    refine_llm: Arc<dyn CompletionProvider>,
    settings: PipelineSettings,
}

impl RagPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        search: Arc<dyn WebSearchProvider>,
        draft_llm: Arc<dyn CompletionProvider>,
        refine_llm: Arc<dyn CompletionProvider>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            embedder,
            index,
            search,
            draft_llm,
            refine_llm,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Top-K passages for the query, newline-joined in rank order.
    pub async fn retrieve_vector_context(&self, query: &str) -> Result<String, PipelineError> {
        let embedding = self
            .embedder
            .embed_query(query)
            .await
            .map_err(PipelineError::Retrieval)?;
        let passages = self
            .index
            .search(&embedding, self.settings.top_k)
            .await
            .map_err(PipelineError::Retrieval)?;

        tracing::debug!("Vector retrieval returned {} passages", passages.len());

        if passages.is_empty() {
            return Ok(NO_DATABASE_CONTEXT.to_string());
        }
        Ok(passages
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Up to `max_snippets` non-empty snippets in provider order.
    pub async fn retrieve_web_context(&self, query: &str) -> Result<String, PipelineError> {
        let results = self
            .search
            .search(query)
            .await
            .map_err(PipelineError::Retrieval)?;

        let snippets: Vec<&str> = results
            .iter()
            .map(|r| r.snippet.as_str())
            .filter(|s| !s.is_empty())
            .take(self.settings.max_snippets)
            .collect();

        tracing::debug!(
            "Web retrieval kept {} of {} results",
            snippets.len(),
            results.len()
        );

        if snippets.is_empty() {
            return Ok(NO_WEB_CONTEXT.to_string());
        }
        Ok(snippets.join("\n"))
    }

    pub async fn generate_draft(&self, query: &str, context: &str) -> Result<String, PipelineError> {
        let request =
            CompletionRequest::from_prompt(&self.settings.draft_model, draft_prompt(context, query));
        let completion = self
            .draft_llm
            .complete(request)
            .await
            .map_err(PipelineError::Generation)?;

        tracing::debug!(
            "Draft from {} ({}): {} chars",
            self.draft_llm.name(),
            self.settings.draft_model,
            completion.text.len()
        );
        Ok(completion.text)
    }

    /// Fetches fresh web context for `query` and rewrites the draft with it.
    /// Never consults the vector index.
    pub async fn refine_draft(&self, raw_answer: &str, query: &str) -> Result<String, PipelineError> {
        let extra_context = self.retrieve_web_context(query).await?;
        let request = CompletionRequest::from_prompt(
            &self.settings.refine_model,
            refine_prompt(raw_answer, &extra_context),
        );
        let completion = self
            .refine_llm
            .complete(request)
            .await
            .map_err(PipelineError::Generation)?;

        let refined = strip_reasoning_markup(&completion.text);
        tracing::debug!(
            "Refined answer from {} ({}): {} chars, {} after cleanup",
            self.refine_llm.name(),
            self.settings.refine_model,
            completion.text.len(),
            refined.len()
        );
        Ok(refined)
    }

    pub async fn answer(&self, query: &str) -> Result<String, PipelineError> {
        let context = self.retrieve_vector_context(query).await?;
        let raw = self.generate_draft(query, &context).await?;
        let refined = self.refine_draft(&raw, query).await?;

        tracing::info!(
            "Answered question ({} chars) with {} chars",
            query.len(),
            refined.len()
        );
        Ok(refined)
    }
}
