use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::classifier::REFUSAL_MESSAGE;
use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub on_topic: bool,
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    // Malformed bodies get the same JSON error shape as every other failure.
    let Json(payload) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let question = payload.question.trim();
    if question.is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".to_string()));
    }

    if let Some(classifier) = &state.classifier {
        let on_topic = classifier
            .is_medical(question)
            .await
            .map_err(|e| ApiError::Upstream(e.to_string()))?;
        if !on_topic {
            tracing::info!("Refused off-topic question");
            return Ok(Json(AskResponse {
                answer: REFUSAL_MESSAGE.to_string(),
                on_topic: false,
            }));
        }
    }

    let answer = state.pipeline.answer(question).await?;
    Ok(Json(AskResponse {
        answer,
        on_topic: true,
    }))
}
