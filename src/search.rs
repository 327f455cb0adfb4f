use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::errors::ProviderError;

const PROVIDER: &str = "serper";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    /// May be empty; callers skip those.
    pub snippet: String,
}

/// Hosted web search returning results in provider rank order.
#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ProviderError>;
}

/// Serper.dev Google search client.
#[derive(Clone)]
pub struct SerperSearch {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl SerperSearch {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl WebSearchProvider for SerperSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query }))
            .send()
            .await
            .map_err(ProviderError::transport(PROVIDER))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(PROVIDER, e))?;

        Ok(parse_organic(&payload))
    }
}

/// A payload without `organic` results is an empty result set, not an error.
fn parse_organic(payload: &Value) -> Vec<SearchResult> {
    let items = payload
        .get("organic")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    items
        .iter()
        .map(|item| {
            let text = |key: &str| {
                item.get(key)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string()
            };
            SearchResult {
                title: text("title"),
                url: text("link"),
                snippet: text("snippet"),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};

    use super::*;
    use crate::test_support::spawn_router;

    type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    async fn spawn_serper(reply: Value, status: StatusCode) -> (String, Seen) {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .route(
                "/search",
                post(
                    move |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            let key = headers
                                .get("x-api-key")
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string);
                            seen.lock().unwrap().push((key, body));
                            (status, Json(reply))
                        }
                    },
                ),
            )
            .with_state(seen.clone());
        let base = spawn_router(app).await;
        (format!("{}/search", base), seen)
    }

    #[tokio::test]
    async fn search_posts_query_with_api_key_and_keeps_order() {
        let (endpoint, seen) = spawn_serper(
            json!({ "organic": [
                { "title": "Dengue", "link": "https://who.int/dengue", "snippet": "Dengue is viral." },
                { "title": "No snippet", "link": "https://example.org" },
                { "title": "CDC", "link": "https://cdc.gov/dengue", "snippet": "Rest and hydrate." }
            ] }),
            StatusCode::OK,
        )
        .await;
        let search = SerperSearch::new(endpoint, "serper-key");

        let results = search.search("dengue treatment").await.unwrap();

        let snippets: Vec<&str> = results.iter().map(|r| r.snippet.as_str()).collect();
        assert_eq!(snippets, vec!["Dengue is viral.", "", "Rest and hydrate."]);
        assert_eq!(results[0].url, "https://who.int/dengue");

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0.as_deref(), Some("serper-key"));
        assert_eq!(seen[0].1, json!({ "q": "dengue treatment" }));
    }

    #[tokio::test]
    async fn missing_organic_section_is_empty() {
        let (endpoint, _) = spawn_serper(json!({ "searchParameters": {} }), StatusCode::OK).await;
        let search = SerperSearch::new(endpoint, "k");

        assert!(search.search("anything").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (endpoint, _) =
            spawn_serper(json!({ "message": "Unauthorized." }), StatusCode::FORBIDDEN).await;
        let search = SerperSearch::new(endpoint, "bad");

        let err = search.search("flu").await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Status {
                provider: "serper",
                status: 403,
                ..
            }
        ));
    }
}
