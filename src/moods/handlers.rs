//! Mood reference-data handlers

use axum::{extract::Extension, Json};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::Mood;
use crate::common::{ApiError, AppState};

/// GET /api/moods - The full mood reference set
pub async fn list_moods(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<Vec<Mood>>, ApiError> {
    let state = state_lock.read().await.clone();

    let moods = sqlx::query_as::<_, Mood>("SELECT * FROM moods ORDER BY score DESC, id ASC")
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(moods))
}
