//! User activity statistics handler

use axum::{extract::Extension, Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::models::UserStats;
use super::service;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};

/// GET /api/user/stats - Journal/entry counts and writing streaks
pub async fn user_stats(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<UserStats>, ApiError> {
    let state = state_lock.read().await.clone();

    let stats = service::user_stats(&state.db, &authed.id)
        .await
        .map_err(ApiError::DatabaseError)?;

    debug!(
        user_id = %authed.id,
        journal_count = stats.journal_count,
        entry_count = stats.entry_count,
        "Computed user activity statistics"
    );

    Ok(Json(stats))
}
