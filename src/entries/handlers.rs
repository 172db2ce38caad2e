//! Entry CRUD handlers

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::models::{
    CreateEntryRequest, Entry, EntryWithMoods, MessageResponse, UpdateEntryRequest,
};
use super::validators;
use crate::auth::AuthedUser;
use crate::common::{generate_entry_id, generate_entry_mood_id, ApiError, AppState};
use crate::moods::models::Mood;

/// Fetch an entry through its owning journal. Entries under another
/// user's journal are indistinguishable from missing ones.
async fn fetch_owned_entry(
    db: &SqlitePool,
    entry_id: &str,
    user_id: &str,
) -> Result<Entry, ApiError> {
    sqlx::query_as::<_, Entry>(
        "SELECT e.* FROM entries e \
         JOIN journals j ON e.journal_id = j.id \
         WHERE e.id = ? AND j.user_id = ?",
    )
    .bind(entry_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .map_err(ApiError::DatabaseError)?
    .ok_or_else(|| ApiError::NotFound("entry not found".to_string()))
}

async fn journal_owned(
    db: &SqlitePool,
    journal_id: &str,
    user_id: &str,
) -> Result<bool, ApiError> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT id FROM journals WHERE id = ? AND user_id = ?")
            .bind(journal_id)
            .bind(user_id)
            .fetch_optional(db)
            .await
            .map_err(ApiError::DatabaseError)?;
    Ok(row.is_some())
}

async fn load_moods(db: &SqlitePool, entry_id: &str) -> Result<Vec<Mood>, ApiError> {
    sqlx::query_as::<_, Mood>(
        "SELECT m.* FROM moods m \
         JOIN entry_moods em ON em.mood_id = m.id \
         WHERE em.entry_id = ? ORDER BY m.score DESC",
    )
    .bind(entry_id)
    .fetch_all(db)
    .await
    .map_err(ApiError::DatabaseError)
}

/// Every referenced mood must exist; moods are a fixed reference set.
async fn validate_mood_ids(db: &SqlitePool, mood_ids: &[String]) -> Result<(), ApiError> {
    for mood_id in mood_ids {
        let row: Option<(String,)> = sqlx::query_as("SELECT id FROM moods WHERE id = ?")
            .bind(mood_id)
            .fetch_optional(db)
            .await
            .map_err(ApiError::DatabaseError)?;
        if row.is_none() {
            return Err(ApiError::ValidationError(format!(
                "mood_ids: unknown mood '{}'",
                mood_id
            )));
        }
    }
    Ok(())
}

async fn with_moods(db: &SqlitePool, entry: Entry) -> Result<EntryWithMoods, ApiError> {
    let moods = load_moods(db, &entry.id).await?;
    Ok(EntryWithMoods { entry, moods })
}

/// GET /api/entries - All entries across the caller's journals
pub async fn list_entries(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<EntryWithMoods>>, ApiError> {
    let state = state_lock.read().await.clone();

    let entries = sqlx::query_as::<_, Entry>(
        "SELECT e.* FROM entries e \
         JOIN journals j ON e.journal_id = j.id \
         WHERE j.user_id = ? ORDER BY e.created_at DESC",
    )
    .bind(&authed.id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let mut result = Vec::with_capacity(entries.len());
    for entry in entries {
        result.push(with_moods(&state.db, entry).await?);
    }

    Ok(Json(result))
}

/// GET /api/journals/:id/entries - Entries of one owned journal
pub async fn list_journal_entries(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(journal_id): Path<String>,
) -> Result<Json<Vec<EntryWithMoods>>, ApiError> {
    let state = state_lock.read().await.clone();

    if !journal_owned(&state.db, &journal_id, &authed.id).await? {
        return Err(ApiError::NotFound("journal not found".to_string()));
    }

    let entries = sqlx::query_as::<_, Entry>(
        "SELECT * FROM entries WHERE journal_id = ? ORDER BY created_at DESC",
    )
    .bind(&journal_id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let mut result = Vec::with_capacity(entries.len());
    for entry in entries {
        result.push(with_moods(&state.db, entry).await?);
    }

    Ok(Json(result))
}

/// POST /api/entries - Create an entry (optionally with moods) under an
/// owned journal. Entry and join rows are written in one transaction.
pub async fn create_entry(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<CreateEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = validators::validate_create(&request);
    if !validation.is_valid {
        return Err(validation.into());
    }

    if !journal_owned(&state.db, &request.journal_id, &authed.id).await? {
        return Err(ApiError::NotFound("journal not found".to_string()));
    }

    let mood_ids = request.mood_ids.unwrap_or_default();
    validate_mood_ids(&state.db, &mood_ids).await?;

    let entry_id = generate_entry_id();

    let mut tx = state.db.begin().await.map_err(ApiError::DatabaseError)?;

    sqlx::query(
        "INSERT INTO entries (id, title, main_text, ai_prompt_used, journal_id) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&entry_id)
    .bind(request.title.trim())
    .bind(&request.main_text)
    .bind(request.ai_prompt_used as i64)
    .bind(&request.journal_id)
    .execute(&mut *tx)
    .await
    .map_err(ApiError::DatabaseError)?;

    for mood_id in &mood_ids {
        sqlx::query("INSERT OR IGNORE INTO entry_moods (id, entry_id, mood_id) VALUES (?, ?, ?)")
            .bind(generate_entry_mood_id())
            .bind(&entry_id)
            .bind(mood_id)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::DatabaseError)?;
    }

    tx.commit().await.map_err(ApiError::DatabaseError)?;

    let entry = fetch_owned_entry(&state.db, &entry_id, &authed.id).await?;
    let entry = with_moods(&state.db, entry).await?;

    info!(entry_id = %entry_id, user_id = %authed.id, "Entry created");

    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/entries/:id - Fetch one owned entry with its moods
pub async fn get_entry(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(entry_id): Path<String>,
) -> Result<Json<EntryWithMoods>, ApiError> {
    let state = state_lock.read().await.clone();

    let entry = fetch_owned_entry(&state.db, &entry_id, &authed.id).await?;
    let entry = with_moods(&state.db, entry).await?;
    Ok(Json(entry))
}

/// PATCH /api/entries/:id - Partial update; a present `mood_ids` replaces
/// the entire mood set
pub async fn update_entry(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(entry_id): Path<String>,
    Json(request): Json<UpdateEntryRequest>,
) -> Result<Json<EntryWithMoods>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = validators::validate_update(&request);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let existing = fetch_owned_entry(&state.db, &entry_id, &authed.id).await?;

    let title = request
        .title
        .map(|t| t.trim().to_string())
        .unwrap_or(existing.title);
    let main_text = request.main_text.unwrap_or(existing.main_text);
    let ai_prompt_used = request
        .ai_prompt_used
        .map(|b| b as i64)
        .unwrap_or(existing.ai_prompt_used);

    if let Some(mood_ids) = &request.mood_ids {
        validate_mood_ids(&state.db, mood_ids).await?;
    }

    let mut tx = state.db.begin().await.map_err(ApiError::DatabaseError)?;

    sqlx::query(
        "UPDATE entries SET title = ?, main_text = ?, ai_prompt_used = ?, \
         updated_at = datetime('now') WHERE id = ?",
    )
    .bind(&title)
    .bind(&main_text)
    .bind(ai_prompt_used)
    .bind(&entry_id)
    .execute(&mut *tx)
    .await
    .map_err(ApiError::DatabaseError)?;

    if let Some(mood_ids) = &request.mood_ids {
        sqlx::query("DELETE FROM entry_moods WHERE entry_id = ?")
            .bind(&entry_id)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::DatabaseError)?;

        for mood_id in mood_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO entry_moods (id, entry_id, mood_id) VALUES (?, ?, ?)",
            )
            .bind(generate_entry_mood_id())
            .bind(&entry_id)
            .bind(mood_id)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::DatabaseError)?;
        }
    }

    tx.commit().await.map_err(ApiError::DatabaseError)?;

    let entry = fetch_owned_entry(&state.db, &entry_id, &authed.id).await?;
    let entry = with_moods(&state.db, entry).await?;
    Ok(Json(entry))
}

/// DELETE /api/entries/:id - Remove the mood join rows, then the entry
pub async fn delete_entry(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(entry_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    // Scoped fetch doubles as the ownership check
    fetch_owned_entry(&state.db, &entry_id, &authed.id).await?;

    let mut tx = state.db.begin().await.map_err(ApiError::DatabaseError)?;

    sqlx::query("DELETE FROM entry_moods WHERE entry_id = ?")
        .bind(&entry_id)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::DatabaseError)?;

    sqlx::query("DELETE FROM entries WHERE id = ?")
        .bind(&entry_id)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::DatabaseError)?;

    tx.commit().await.map_err(ApiError::DatabaseError)?;

    info!(entry_id = %entry_id, user_id = %authed.id, "Entry deleted");

    Ok(Json(MessageResponse {
        message: "Entry deleted successfully".to_string(),
    }))
}
