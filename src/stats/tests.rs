//! Tests for the stats module: streak properties over calendar dates and
//! count aggregation against a real (in-memory) store.

#[cfg(test)]
mod tests {
    use super::super::service::{current_streak, entry_dates, longest_streak, user_stats};
    use crate::common::migrations::run_migrations;
    use chrono::{Duration, NaiveDate, Utc};
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;
    use std::str::FromStr;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    // ========================================================================
    // Pure streak computation
    // ========================================================================

    #[test]
    fn test_no_entries_means_no_streaks() {
        assert_eq!(longest_streak(&[]), 0);
        assert_eq!(current_streak(&[], d("2024-06-10")), 0);
    }

    #[test]
    fn test_single_day() {
        let dates = [d("2024-06-01")];
        assert_eq!(longest_streak(&dates), 1);
    }

    #[test]
    fn test_longest_streak_counts_consecutive_runs() {
        let dates = [
            d("2024-06-01"),
            d("2024-06-02"),
            d("2024-06-03"),
            // gap
            d("2024-06-07"),
            d("2024-06-08"),
        ];
        assert_eq!(longest_streak(&dates), 3);
    }

    #[test]
    fn test_gap_resets_run() {
        let dates = [d("2024-06-01"), d("2024-06-03"), d("2024-06-05")];
        assert_eq!(longest_streak(&dates), 1);
    }

    #[test]
    fn test_old_streak_has_no_current_streak() {
        // {D, D+1, D+2} with "now" well past D+3
        let dates = [d("2024-06-01"), d("2024-06-02"), d("2024-06-03")];
        assert_eq!(longest_streak(&dates), 3);
        assert_eq!(current_streak(&dates, d("2024-06-10")), 0);
    }

    #[test]
    fn test_current_streak_anchored_at_today() {
        let dates = [d("2024-06-08"), d("2024-06-09"), d("2024-06-10")];
        assert_eq!(current_streak(&dates, d("2024-06-10")), 3);
    }

    #[test]
    fn test_current_streak_anchored_at_yesterday() {
        // Journaled through yesterday but not yet today: streak still live
        let dates = [d("2024-06-08"), d("2024-06-09")];
        assert_eq!(current_streak(&dates, d("2024-06-10")), 2);
    }

    #[test]
    fn test_current_streak_ignores_older_runs() {
        let dates = [
            d("2024-06-01"),
            d("2024-06-02"),
            d("2024-06-03"),
            d("2024-06-04"),
            // gap
            d("2024-06-09"),
            d("2024-06-10"),
        ];
        assert_eq!(longest_streak(&dates), 4);
        assert_eq!(current_streak(&dates, d("2024-06-10")), 2);
    }

    #[test]
    fn test_two_day_old_entry_is_not_current() {
        let dates = [d("2024-06-07"), d("2024-06-08")];
        assert_eq!(current_streak(&dates, d("2024-06-10")), 0);
    }

    // ========================================================================
    // Aggregation against the store
    // ========================================================================

    async fn setup_test_db() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash) VALUES ('U_1', 'alice', 'alice@x.com', 'h')",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO journals (id, title, year, color, user_id) VALUES ('J_1', '2024', 2024, '#2D8FB6', 'U_1')",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    async fn insert_entry(pool: &SqlitePool, id: &str, days_ago: i64) {
        let created_at = (Utc::now() - Duration::days(days_ago))
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        sqlx::query(
            "INSERT INTO entries (id, title, main_text, ai_prompt_used, journal_id, created_at) \
             VALUES (?, ?, 'body', 0, 'J_1', ?)",
        )
        .bind(id)
        .bind(format!("entry {}", id))
        .bind(&created_at)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_alice_three_consecutive_days() {
        let pool = setup_test_db().await;

        // Three entries on three consecutive days ending today
        insert_entry(&pool, "E_1", 2).await;
        insert_entry(&pool, "E_2", 1).await;
        insert_entry(&pool, "E_3", 0).await;

        let stats = user_stats(&pool, "U_1").await.unwrap();
        assert_eq!(stats.journal_count, 1);
        assert_eq!(stats.entry_count, 3);
        assert_eq!(stats.longest_streak, 3);
        assert_eq!(stats.current_streak, 3);
    }

    #[tokio::test]
    async fn test_multiple_entries_one_day_count_once_for_streaks() {
        let pool = setup_test_db().await;

        insert_entry(&pool, "E_1", 0).await;
        insert_entry(&pool, "E_2", 0).await;
        insert_entry(&pool, "E_3", 1).await;

        let stats = user_stats(&pool, "U_1").await.unwrap();
        assert_eq!(stats.entry_count, 3);
        assert_eq!(stats.longest_streak, 2);
        assert_eq!(stats.current_streak, 2);

        let dates = entry_dates(&pool, "U_1").await.unwrap();
        assert_eq!(dates.len(), 2, "duplicate dates must be collapsed");
    }

    #[tokio::test]
    async fn test_stats_are_idempotent() {
        let pool = setup_test_db().await;

        insert_entry(&pool, "E_1", 5).await;
        insert_entry(&pool, "E_2", 4).await;

        let first = user_stats(&pool, "U_1").await.unwrap();
        let second = user_stats(&pool, "U_1").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_stats_scoped_to_user() {
        let pool = setup_test_db().await;

        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash) VALUES ('U_2', 'bob', 'bob@x.com', 'h')",
        )
        .execute(&pool)
        .await
        .unwrap();

        insert_entry(&pool, "E_1", 0).await;

        let stats = user_stats(&pool, "U_2").await.unwrap();
        assert_eq!(stats.journal_count, 0);
        assert_eq!(stats.entry_count, 0);
        assert_eq!(stats.longest_streak, 0);
        assert_eq!(stats.current_streak, 0);
    }

    #[tokio::test]
    async fn test_user_with_journal_but_no_entries() {
        let pool = setup_test_db().await;

        let stats = user_stats(&pool, "U_1").await.unwrap();
        assert_eq!(stats.journal_count, 1);
        assert_eq!(stats.entry_count, 0);
        assert_eq!(stats.longest_streak, 0);
        assert_eq!(stats.current_streak, 0);
    }
}
