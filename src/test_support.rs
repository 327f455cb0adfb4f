//! Shared fakes and helpers for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;

use crate::core::errors::ProviderError;
use crate::embedding::EmbeddingProvider;
use crate::llm::{Completion, CompletionProvider, CompletionRequest};
use crate::rag::{Passage, VectorIndex};
use crate::search::{SearchResult, WebSearchProvider};

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_router(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Ordered record of which collaborator was called.
pub type CallLog = Arc<Mutex<Vec<&'static str>>>;

fn record(log: &Option<CallLog>, entry: &'static str) {
    if let Some(log) = log {
        log.lock().unwrap().push(entry);
    }
}

fn fake_failure(provider: &'static str) -> ProviderError {
    ProviderError::Status {
        provider,
        status: 500,
        body: "fake failure".to_string(),
    }
}

/// Embeds text as a keyword-presence vector, one dimension per keyword.
pub struct FakeEmbedder {
    keywords: Vec<String>,
    batches: Mutex<Vec<usize>>,
    log: Option<CallLog>,
    fail: bool,
}

impl FakeEmbedder {
    pub fn keyword(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            batches: Mutex::new(Vec::new()),
            log: None,
            fail: false,
        }
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    fn model_name(&self) -> &str {
        "fake-embedder"
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        record(&self.log, "embed");
        self.batches.lock().unwrap().push(inputs.len());
        if self.fail {
            return Err(fake_failure("embedding"));
        }
        Ok(inputs
            .iter()
            .map(|text| {
                let lower = text.to_lowercase();
                self.keywords
                    .iter()
                    .map(|k| if lower.contains(k.as_str()) { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect())
    }
}

/// Returns its passages in stored order, truncated to the requested limit.
pub struct FakeIndex {
    passages: Vec<Passage>,
    limits: Mutex<Vec<usize>>,
    log: Option<CallLog>,
}

impl FakeIndex {
    pub fn new(passages: &[&str]) -> Self {
        Self {
            passages: passages.iter().map(|p| Passage::new(*p)).collect(),
            limits: Mutex::new(Vec::new()),
            log: None,
        }
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn limits(&self) -> Vec<usize> {
        self.limits.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorIndex for FakeIndex {
    async fn search(
        &self,
        _query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<Passage>, ProviderError> {
        record(&self.log, "index");
        self.limits.lock().unwrap().push(limit);
        Ok(self.passages.iter().take(limit).cloned().collect())
    }

    fn len(&self) -> usize {
        self.passages.len()
    }
}

/// Answers every query with the same snippets.
pub struct FakeSearch {
    snippets: Vec<String>,
    queries: Mutex<Vec<String>>,
    log: Option<CallLog>,
    fail: bool,
}

impl FakeSearch {
    pub fn snippets(snippets: &[&str]) -> Self {
        Self {
            snippets: snippets.iter().map(|s| s.to_string()).collect(),
            queries: Mutex::new(Vec::new()),
            log: None,
            fail: false,
        }
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearchProvider for FakeSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ProviderError> {
        record(&self.log, "search");
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(fake_failure("serper"));
        }
        Ok(self
            .snippets
            .iter()
            .enumerate()
            .map(|(idx, snippet)| SearchResult {
                title: format!("result {}", idx + 1),
                url: format!("https://example.org/{}", idx + 1),
                snippet: snippet.clone(),
            })
            .collect())
    }
}

/// Replies with fixed text and keeps every request it received.
pub struct RecordingCompletion {
    label: &'static str,
    reply: String,
    requests: Mutex<Vec<CompletionRequest>>,
    log: Option<CallLog>,
    fail: bool,
}

impl RecordingCompletion {
    pub fn replying(label: &'static str, reply: &str) -> Self {
        Self {
            label,
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
            log: None,
            fail: false,
        }
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Content of the single message of each request.
    pub fn prompts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| {
                r.messages
                    .iter()
                    .map(|m| m.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect()
    }
}

#[async_trait]
impl CompletionProvider for RecordingCompletion {
    fn name(&self) -> &str {
        self.label
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        record(&self.log, self.label);
        self.requests.lock().unwrap().push(request);
        if self.fail {
            return Err(fake_failure("groq"));
        }
        Ok(Completion {
            text: self.reply.clone(),
        })
    }
}
