use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::CompletionProvider;
use super::types::{Completion, CompletionRequest};
use crate::core::errors::ProviderError;

/// Chat-completions client for OpenAI-compatible endpoints (Groq by default).
#[derive(Clone)]
pub struct OpenAiCompatClient {
    name: &'static str,
    base_url: String,
    api_key: String,
    client: Client,
}

impl OpenAiCompatClient {
    pub fn new(
        name: &'static str,
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ProviderError::transport(name))?;

        Ok(Self {
            name,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatClient {
    fn name(&self) -> &str {
        self.name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut body = json!({
            "model": request.model,
            "messages": request.messages,
            "stream": false,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(temperature) = request.temperature {
                obj.insert("temperature".to_string(), json!(temperature));
            }
            if let Some(max_tokens) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(max_tokens));
            }
        }

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::transport(self.name))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: self.name,
                status: status.as_u16(),
                body: text,
            });
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| ProviderError::malformed(self.name, e))?;

        let text = extract_message_content(&payload).ok_or_else(|| {
            ProviderError::malformed(self.name, "missing choices[0].message.content")
        })?;

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyCompletion {
                provider: self.name,
            });
        }

        Ok(Completion {
            text: text.to_string(),
        })
    }
}

fn extract_message_content(payload: &Value) -> Option<&str> {
    payload
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
}
