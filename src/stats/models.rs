use serde::Serialize;

/// Activity statistics for one user
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UserStats {
    pub journal_count: i64,
    pub entry_count: i64,
    pub longest_streak: i64,
    pub current_streak: i64,
}
