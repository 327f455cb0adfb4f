use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

use crate::state::AppState;

/// Merged configuration with API keys and other sensitive values masked.
pub async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.config.load_config();
    Json(state.config.redact_sensitive_values(&config))
}
