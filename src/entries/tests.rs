//! Tests for the entries module: validation and the mood-join lifecycle

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::migrations::{run_migrations, seed_moods_if_empty};
    use crate::entries::models::{CreateEntryRequest, UpdateEntryRequest};
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;
    use std::str::FromStr;

    async fn setup_test_db() -> SqlitePool {
        // One connection keeps the in-memory database shared across
        // queries; foreign keys make the cascade paths realistic
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        seed_moods_if_empty(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash) VALUES ('U_1', 'alice', 'alice@x.com', 'h')",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO journals (id, title, year, color, user_id) VALUES ('J_1', '2024', 2024, '#E7E5E5', 'U_1')",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    fn create_request(title: &str) -> CreateEntryRequest {
        CreateEntryRequest {
            journal_id: "J_1".to_string(),
            title: title.to_string(),
            main_text: "body".to_string(),
            ai_prompt_used: false,
            mood_ids: None,
        }
    }

    #[test]
    fn test_valid_create_request() {
        let result = validators::validate_create(&create_request("Morning pages"));
        assert!(result.is_valid);
    }

    #[test]
    fn test_empty_title_rejected() {
        let result = validators::validate_create(&create_request("   "));
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "title"));
    }

    #[test]
    fn test_missing_journal_id_rejected() {
        let mut request = create_request("Morning pages");
        request.journal_id = "".to_string();
        let result = validators::validate_create(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "journal_id"));
    }

    #[test]
    fn test_update_validates_title_only_when_present() {
        let result = validators::validate_update(&UpdateEntryRequest {
            title: None,
            main_text: Some("new body".to_string()),
            ai_prompt_used: None,
            mood_ids: None,
        });
        assert!(result.is_valid);

        let result = validators::validate_update(&UpdateEntryRequest {
            title: Some("  ".to_string()),
            main_text: None,
            ai_prompt_used: None,
            mood_ids: None,
        });
        assert!(!result.is_valid);
    }

    #[tokio::test]
    async fn test_entry_cascade_from_journal_delete() {
        let pool = setup_test_db().await;

        sqlx::query(
            "INSERT INTO entries (id, title, main_text, ai_prompt_used, journal_id) VALUES ('E_1', 't', 'b', 0, 'J_1')",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query("DELETE FROM journals WHERE id = 'J_1'")
            .execute(&pool)
            .await
            .unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM entries")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0, "entries should cascade with their journal");
    }

    #[tokio::test]
    async fn test_mood_joins_removed_before_entry() {
        let pool = setup_test_db().await;

        sqlx::query(
            "INSERT INTO entries (id, title, main_text, ai_prompt_used, journal_id) VALUES ('E_1', 't', 'b', 1, 'J_1')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let (mood_id,): (String,) = sqlx::query_as("SELECT id FROM moods LIMIT 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO entry_moods (id, entry_id, mood_id) VALUES ('EM_1', 'E_1', ?)")
            .bind(&mood_id)
            .execute(&pool)
            .await
            .unwrap();

        // Delete in the same order the handler does: joins, then entry
        let mut tx = pool.begin().await.unwrap();
        sqlx::query("DELETE FROM entry_moods WHERE entry_id = 'E_1'")
            .execute(&mut *tx)
            .await
            .unwrap();
        sqlx::query("DELETE FROM entries WHERE id = 'E_1'")
            .execute(&mut *tx)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let (joins,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM entry_moods")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(joins, 0);
    }
}
