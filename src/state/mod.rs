use std::sync::Arc;
use std::time::Duration;

use crate::classifier::TopicClassifier;
use crate::core::config::{AppPaths, ConfigService, Settings};
use crate::embedding::{EmbeddingProvider, HttpEmbeddingProvider};
use crate::llm::{CompletionProvider, OpenAiCompatClient};
use crate::pipeline::{PipelineSettings, RagPipeline};
use crate::rag::{SqliteVectorIndex, VectorIndex};
use crate::search::{SerperSearch, WebSearchProvider};

pub mod error;

use error::InitializationError;

/// Shared state for the HTTP routes and the terminal shell.
///
/// Everything here is read-only after construction, so one instance serves
/// concurrent requests.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: ConfigService,
    pub settings: Arc<Settings>,
    pub index: Arc<dyn VectorIndex>,
    pub pipeline: Arc<RagPipeline>,
    /// `None` when `shell.topic_gate` is off.
    pub classifier: Option<Arc<TopicClassifier>>,
}

impl AppState {
    /// Loads configuration from `paths` and builds the full state.
    pub async fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let config = ConfigService::new(paths.clone());
        let settings = config.load_settings()?;
        Self::from_settings(paths, config, settings).await
    }

    /// Initialization order:
    /// 1. Secrets check (no network or disk access before it passes)
    /// 2. Embedding provider
    /// 3. Vector index load
    /// 4. Search and completion clients
    pub async fn from_settings(
        paths: Arc<AppPaths>,
        config: ConfigService,
        settings: Settings,
    ) -> Result<Arc<Self>, InitializationError> {
        let search_key = required_secret(
            settings.secrets.web_search_api_key.as_deref(),
            "web_search_api_key (SERPER_API_KEY)",
        )?;
        let llm_key = required_secret(
            settings.secrets.llm_api_key.as_deref(),
            "llm_api_key (GROQ_API_KEY)",
        )?;

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HttpEmbeddingProvider::new(
            &settings.embedding.base_url,
            settings.embedding.model.clone(),
            settings.secrets.embedding_api_key.clone(),
        ));

        let index_path = settings.index_path(&paths);
        let sqlite_index = SqliteVectorIndex::open(&index_path)
            .await
            .map_err(InitializationError::Index)?;
        if let Some(model) = sqlite_index.embedding_model() {
            if model != embedder.model_name() {
                tracing::warn!(
                    "Index was built with embedding model {} but {} is configured",
                    model,
                    embedder.model_name()
                );
            }
        }
        let index: Arc<dyn VectorIndex> = Arc::new(sqlite_index);

        let search: Arc<dyn WebSearchProvider> =
            Arc::new(SerperSearch::new(settings.search.endpoint.clone(), search_key));

        let timeout = settings.llm.timeout_secs.map(Duration::from_secs);
        let llm: Arc<dyn CompletionProvider> = Arc::new(
            OpenAiCompatClient::new("groq", &settings.llm.base_url, llm_key, timeout)
                .map_err(InitializationError::Client)?,
        );

        let pipeline = Arc::new(RagPipeline::new(
            embedder,
            index.clone(),
            search,
            llm.clone(),
            llm.clone(),
            PipelineSettings::from(&settings),
        ));

        let classifier = settings.shell.topic_gate.then(|| {
            Arc::new(TopicClassifier::new(
                llm.clone(),
                settings.llm.classifier_model.clone(),
            ))
        });

        tracing::info!(
            "Pipeline ready: {} passages, draft model {}, refine model {}, topic gate {}",
            index.len(),
            settings.llm.draft_model,
            settings.llm.refine_model,
            if classifier.is_some() { "on" } else { "off" }
        );

        Ok(Arc::new(AppState {
            paths,
            config,
            settings: Arc::new(settings),
            index,
            pipeline,
            classifier,
        }))
    }
}

fn required_secret(value: Option<&str>, name: &'static str) -> Result<String, InitializationError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(InitializationError::MissingSecret(name))
}
