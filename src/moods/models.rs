use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Mood {
    pub id: String,
    pub emoji: String,
    /// Valence score used by the mood graph, 1 (low) to 5 (high)
    pub score: i64,
}
