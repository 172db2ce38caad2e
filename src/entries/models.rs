use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::moods::models::Mood;

fn serialize_bool_to_bool<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_bool(*value != 0)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entry {
    pub id: String,
    pub title: String,
    pub main_text: String,
    /// Stored as 0/1 in SQLite, exposed as a bool
    #[serde(serialize_with = "serialize_bool_to_bool")]
    pub ai_prompt_used: i64,
    pub journal_id: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// An entry together with its attached moods, as returned by the API.
#[derive(Debug, Serialize)]
pub struct EntryWithMoods {
    #[serde(flatten)]
    pub entry: Entry,
    pub moods: Vec<Mood>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub journal_id: String,
    pub title: String,
    pub main_text: String,
    /// Required with no default: the writer must choose AI prompt or
    /// freewrite explicitly
    pub ai_prompt_used: bool,
    pub mood_ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    pub title: Option<String>,
    pub main_text: Option<String>,
    pub ai_prompt_used: Option<bool>,
    /// When present, replaces the whole mood set
    pub mood_ids: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}
