use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Journal {
    pub id: String,
    pub title: String,
    pub year: i64,
    pub color: String,
    pub user_id: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateJournalRequest {
    pub title: String,
    pub year: i64,
    /// Defaults to the neutral palette color when omitted
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateJournalRequest {
    pub title: Option<String>,
    pub year: Option<i64>,
    pub color: Option<String>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}
