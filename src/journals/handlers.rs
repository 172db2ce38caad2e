//! Journal CRUD handlers

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::models::{CreateJournalRequest, Journal, MessageResponse, UpdateJournalRequest};
use super::validators;
use crate::auth::AuthedUser;
use crate::common::error::map_unique_violation;
use crate::common::{generate_journal_id, ApiError, AppState, Validator};

/// Fetch a journal scoped to its owner. A journal owned by someone else
/// looks exactly like a missing one.
async fn fetch_owned_journal(
    db: &sqlx::SqlitePool,
    journal_id: &str,
    user_id: &str,
) -> Result<Journal, ApiError> {
    sqlx::query_as::<_, Journal>("SELECT * FROM journals WHERE id = ? AND user_id = ?")
        .bind(journal_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("journal not found".to_string()))
}

async fn title_taken(
    db: &sqlx::SqlitePool,
    title: &str,
    exclude_id: Option<&str>,
) -> Result<bool, ApiError> {
    let row: Option<(String,)> = match exclude_id {
        Some(id) => sqlx::query_as("SELECT id FROM journals WHERE title = ? AND id != ?")
            .bind(title)
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(ApiError::DatabaseError)?,
        None => sqlx::query_as("SELECT id FROM journals WHERE title = ?")
            .bind(title)
            .fetch_optional(db)
            .await
            .map_err(ApiError::DatabaseError)?,
    };
    Ok(row.is_some())
}

/// GET /api/journals - All journals owned by the caller
pub async fn list_journals(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<Journal>>, ApiError> {
    let state = state_lock.read().await.clone();

    let journals = sqlx::query_as::<_, Journal>(
        "SELECT * FROM journals WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(&authed.id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(journals))
}

/// POST /api/journals - Create a journal
pub async fn create_journal(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<CreateJournalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = request.validate(&request);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let title = request.title.trim().to_string();
    if title_taken(&state.db, &title, None).await? {
        return Err(ApiError::DuplicateField(
            "A journal with this title already exists".to_string(),
        ));
    }

    let color = request
        .color
        .unwrap_or_else(|| validators::DEFAULT_COLOR.to_string());
    let journal_id = generate_journal_id();

    sqlx::query("INSERT INTO journals (id, title, year, color, user_id) VALUES (?, ?, ?, ?, ?)")
        .bind(&journal_id)
        .bind(&title)
        .bind(request.year)
        .bind(&color)
        .bind(&authed.id)
        .execute(&state.db)
        .await
        .map_err(|e| map_unique_violation(e, "A journal with this title already exists"))?;

    let journal = fetch_owned_journal(&state.db, &journal_id, &authed.id).await?;

    info!(journal_id = %journal.id, user_id = %authed.id, "Journal created");

    Ok((StatusCode::CREATED, Json(journal)))
}

/// GET /api/journals/:id - Fetch one owned journal
pub async fn get_journal(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(journal_id): Path<String>,
) -> Result<Json<Journal>, ApiError> {
    let state = state_lock.read().await.clone();
    let journal = fetch_owned_journal(&state.db, &journal_id, &authed.id).await?;
    Ok(Json(journal))
}

/// PATCH /api/journals/:id - Partially update title/year/color
pub async fn update_journal(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(journal_id): Path<String>,
    Json(request): Json<UpdateJournalRequest>,
) -> Result<Json<Journal>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = validators::validate_update(&request);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let existing = fetch_owned_journal(&state.db, &journal_id, &authed.id).await?;

    let title = request
        .title
        .map(|t| t.trim().to_string())
        .unwrap_or(existing.title);
    let year = request.year.unwrap_or(existing.year);
    let color = request.color.unwrap_or(existing.color);

    if title_taken(&state.db, &title, Some(&journal_id)).await? {
        return Err(ApiError::DuplicateField(
            "A journal with this title already exists".to_string(),
        ));
    }

    sqlx::query(
        "UPDATE journals SET title = ?, year = ?, color = ?, updated_at = datetime('now') \
         WHERE id = ? AND user_id = ?",
    )
    .bind(&title)
    .bind(year)
    .bind(&color)
    .bind(&journal_id)
    .bind(&authed.id)
    .execute(&state.db)
    .await
    .map_err(|e| map_unique_violation(e, "A journal with this title already exists"))?;

    let journal = fetch_owned_journal(&state.db, &journal_id, &authed.id).await?;
    Ok(Json(journal))
}

/// DELETE /api/journals/:id - Delete a journal and, via cascade, all of
/// its entries and their mood associations
pub async fn delete_journal(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(journal_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let result = sqlx::query("DELETE FROM journals WHERE id = ? AND user_id = ?")
        .bind(&journal_id)
        .bind(&authed.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("journal not found".to_string()));
    }

    info!(journal_id = %journal_id, user_id = %authed.id, "Journal deleted");

    Ok(Json(MessageResponse {
        message: "Journal deleted successfully".to_string(),
    }))
}
