// src/common/migrations.rs
//! Database schema management and reference-data seeding

use sqlx::SqlitePool;
use tracing::{info, warn};

use super::id_generator::generate_mood_id;

/// Seed mood set: emoji glyph plus a numeric valence score for graphing.
const MOODS: &[(&str, i64)] = &[
    ("😊", 5), // Happy
    ("😃", 5), // Very Happy
    ("🥰", 5), // Loving
    ("🤩", 5), // Excited
    ("😌", 4), // Content
    ("🙂", 4), // Pleased
    ("😐", 3), // Neutral
    ("😕", 2), // Confused
    ("😔", 2), // Sad
    ("😢", 1), // Very Sad
    ("😡", 1), // Angry
    ("😨", 1), // Anxious
    ("😴", 3), // Tired
    ("🤔", 3), // Thoughtful
    ("🤗", 4), // Grateful
];

/// Run all database migrations
///
/// Tables are created if missing; existing data is never dropped.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    create_user_tables(pool).await?;
    create_journal_tables(pool).await?;
    create_oauth_tables(pool).await?;
    create_indexes(pool).await?;

    info!("✅ Database migration completed successfully");

    Ok(())
}

async fn create_user_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT,
            google_id TEXT UNIQUE,
            google_access_token TEXT,
            google_refresh_token TEXT,
            google_token_expires_at TEXT,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_journal_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS journals (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL UNIQUE,
            year INTEGER NOT NULL,
            color TEXT NOT NULL,
            user_id TEXT NOT NULL,
            created_at TEXT DEFAULT (datetime('now')),
            updated_at TEXT DEFAULT (datetime('now')),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            main_text TEXT NOT NULL,
            ai_prompt_used INTEGER NOT NULL,
            journal_id TEXT NOT NULL,
            created_at TEXT DEFAULT (datetime('now')),
            updated_at TEXT DEFAULT (datetime('now')),
            FOREIGN KEY (journal_id) REFERENCES journals(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS moods (
            id TEXT PRIMARY KEY,
            emoji TEXT NOT NULL,
            score INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entry_moods (
            id TEXT PRIMARY KEY,
            entry_id TEXT NOT NULL,
            mood_id TEXT NOT NULL,
            FOREIGN KEY (entry_id) REFERENCES entries(id) ON DELETE CASCADE,
            FOREIGN KEY (mood_id) REFERENCES moods(id),
            UNIQUE (entry_id, mood_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_oauth_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS oauth_states (
            id TEXT PRIMARY KEY,
            state TEXT NOT NULL UNIQUE,
            created_at TEXT DEFAULT (datetime('now')),
            expires_at TEXT NOT NULL,
            used INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_journals_user_id ON journals(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_entries_journal_id ON entries(journal_id)",
        "CREATE INDEX IF NOT EXISTS idx_entries_created_at ON entries(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_entry_moods_entry_id ON entry_moods(entry_id)",
        "CREATE INDEX IF NOT EXISTS idx_oauth_states_state ON oauth_states(state)",
    ];

    for index in indexes {
        sqlx::query(index).execute(pool).await?;
    }

    Ok(())
}

/// Seed the mood reference set once, at startup, if the table is empty.
/// Moods are immutable reference data afterwards.
pub async fn seed_moods_if_empty(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM moods")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        info!(mood_count = count, "Moods already seeded, skipping");
        return Ok(());
    }

    for (emoji, score) in MOODS {
        sqlx::query("INSERT INTO moods (id, emoji, score) VALUES (?, ?, ?)")
            .bind(generate_mood_id())
            .bind(emoji)
            .bind(score)
            .execute(pool)
            .await?;
    }

    info!(mood_count = MOODS.len(), "Seeded mood reference set");
    Ok(())
}

/// Remove expired or consumed OAuth state rows. Best-effort housekeeping
/// run at startup; the conditional-consume query is what actually enforces
/// single use.
pub async fn cleanup_oauth_states(pool: &SqlitePool) {
    let result = sqlx::query(
        "DELETE FROM oauth_states WHERE used = 1 OR expires_at <= datetime('now')",
    )
    .execute(pool)
    .await;

    match result {
        Ok(r) => {
            if r.rows_affected() > 0 {
                info!(removed = r.rows_affected(), "Cleaned up stale OAuth states");
            }
        }
        Err(e) => warn!(error = %e, "Failed to clean up stale OAuth states"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    async fn setup_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = setup_pool().await;
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_moods_seed_once() {
        let pool = setup_pool().await;
        run_migrations(&pool).await.unwrap();

        seed_moods_if_empty(&pool).await.unwrap();
        seed_moods_if_empty(&pool).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM moods")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, MOODS.len() as i64);
    }

    #[tokio::test]
    async fn test_entry_mood_pair_is_unique() {
        let pool = setup_pool().await;
        run_migrations(&pool).await.unwrap();

        sqlx::query("INSERT INTO users (id, username, email, password_hash) VALUES ('U_1', 'alice', 'alice@x.com', 'h')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO journals (id, title, year, color, user_id) VALUES ('J_1', 't', 2024, '#E7E5E5', 'U_1')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO entries (id, title, main_text, ai_prompt_used, journal_id) VALUES ('E_1', 't', 'b', 0, 'J_1')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO moods (id, emoji, score) VALUES ('M_1', '😊', 5)")
            .execute(&pool)
            .await
            .unwrap();

        sqlx::query("INSERT INTO entry_moods (id, entry_id, mood_id) VALUES ('EM_1', 'E_1', 'M_1')")
            .execute(&pool)
            .await
            .unwrap();
        let dup = sqlx::query(
            "INSERT INTO entry_moods (id, entry_id, mood_id) VALUES ('EM_2', 'E_1', 'M_1')",
        )
        .execute(&pool)
        .await;
        assert!(dup.is_err(), "duplicate (entry, mood) pair should be rejected");
    }
}
