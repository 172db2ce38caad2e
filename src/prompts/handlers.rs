//! AI prompt handlers

use axum::{extract::Extension, Json};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::CustomPromptRequest;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};
use crate::services::prompt_gen::GeneratedPrompt;

const TOPIC_MAX_LEN: usize = 200;

/// GET /api/ai-prompt - One journaling prompt for today
pub async fn get_prompt(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
) -> Result<Json<GeneratedPrompt>, ApiError> {
    let state = state_lock.read().await.clone();
    let generated = state.prompt_service.generate_prompt().await;
    Ok(Json(generated))
}

/// POST /api/ai-prompt/custom - A prompt about a caller-supplied topic
pub async fn custom_prompt(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
    Json(request): Json<CustomPromptRequest>,
) -> Result<Json<GeneratedPrompt>, ApiError> {
    let state = state_lock.read().await.clone();

    let topic = request.topic.trim();
    if topic.is_empty() {
        return Err(ApiError::ValidationError("topic: Topic is required".to_string()));
    }
    if topic.len() > TOPIC_MAX_LEN {
        return Err(ApiError::ValidationError(
            "topic: Topic must not exceed 200 characters".to_string(),
        ));
    }

    let generated = state.prompt_service.generate_custom_prompt(topic).await;
    Ok(Json(generated))
}
