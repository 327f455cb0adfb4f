use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::EmbeddingProvider;
use crate::core::errors::ProviderError;

const PROVIDER: &str = "embedding";

/// Client for an OpenAI-compatible `/v1/embeddings` endpoint, such as a
/// text-embeddings-inference server hosting all-MiniLM-L6-v2.
#[derive(Clone)]
pub struct HttpEmbeddingProvider {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpEmbeddingProvider {
    pub fn new(base_url: &str, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/v1/embeddings", self.base_url);
        let body = json!({
            "model": self.model,
            "input": inputs,
        });

        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let res = req.send().await.map_err(ProviderError::transport(PROVIDER))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body: text,
            });
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| ProviderError::malformed(PROVIDER, e))?;
        let embeddings = parse_embeddings(&payload)?;

        if embeddings.len() != inputs.len() {
            return Err(ProviderError::malformed(
                PROVIDER,
                format!(
                    "expected {} embeddings, received {}",
                    inputs.len(),
                    embeddings.len()
                ),
            ));
        }

        Ok(embeddings)
    }
}

fn parse_embeddings(payload: &Value) -> Result<Vec<Vec<f32>>, ProviderError> {
    let data = payload
        .get("data")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ProviderError::malformed(PROVIDER, "missing data array"))?;

    // Entries carry an `index`; order by it when present.
    let mut indexed = Vec::with_capacity(data.len());
    for (position, item) in data.iter().enumerate() {
        let values = item
            .get("embedding")
            .and_then(|v| v.as_array())
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "entry without embedding"))?;
        let vector = values
            .iter()
            .map(|v| {
                v.as_f64().map(|f| f as f32).ok_or_else(|| {
                    ProviderError::malformed(PROVIDER, format!("non-numeric embedding value {v}"))
                })
            })
            .collect::<Result<Vec<f32>, _>>()?;
        let index = item
            .get("index")
            .and_then(|v| v.as_u64())
            .map(|i| i as usize)
            .unwrap_or(position);
        indexed.push((index, vector));
    }
    indexed.sort_by_key(|(index, _)| *index);

    Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}
