//! Activity statistics: journal/entry counts and streak computation.
//!
//! The streak functions are pure over sorted distinct calendar dates so
//! they can be tested without a clock or a database.

use chrono::{Duration, NaiveDate, Utc};
use sqlx::SqlitePool;

use super::models::UserStats;

/// Compute all activity statistics for a user.
pub async fn user_stats(pool: &SqlitePool, user_id: &str) -> Result<UserStats, sqlx::Error> {
    let (journal_count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM journals WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    let (entry_count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM entries e \
         JOIN journals j ON e.journal_id = j.id \
         WHERE j.user_id = ?",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let dates = entry_dates(pool, user_id).await?;
    let today = Utc::now().date_naive();

    Ok(UserStats {
        journal_count,
        entry_count,
        longest_streak: longest_streak(&dates),
        current_streak: current_streak(&dates, today),
    })
}

/// Distinct calendar dates (UTC) on which the user created at least one
/// entry, sorted ascending.
pub async fn entry_dates(pool: &SqlitePool, user_id: &str) -> Result<Vec<NaiveDate>, sqlx::Error> {
    let rows: Vec<(Option<String>,)> = sqlx::query_as(
        "SELECT DISTINCT date(e.created_at) FROM entries e \
         JOIN journals j ON e.journal_id = j.id \
         WHERE j.user_id = ? ORDER BY 1 ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(d,)| d)
        .filter_map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok())
        .collect())
}

/// Length of the longest run of consecutive calendar days. A gap of
/// exactly one day continues a run; any other gap resets it.
pub fn longest_streak(dates: &[NaiveDate]) -> i64 {
    if dates.is_empty() {
        return 0;
    }

    let mut best = 1i64;
    let mut run = 1i64;

    for pair in dates.windows(2) {
        if (pair[1] - pair[0]).num_days() == 1 {
            run += 1;
        } else {
            run = 1;
        }
        best = best.max(run);
    }

    best
}

/// Length of the consecutive-day run ending today, or yesterday - a user
/// who journaled yesterday but not yet today still has a live streak.
/// Any older most-recent date means no current streak.
pub fn current_streak(dates: &[NaiveDate], today: NaiveDate) -> i64 {
    let last = match dates.last() {
        Some(d) => *d,
        None => return 0,
    };

    let yesterday = today - Duration::days(1);
    if last != today && last != yesterday {
        return 0;
    }

    let mut streak = 1i64;
    for pair in dates.windows(2).rev() {
        if (pair[1] - pair[0]).num_days() == 1 {
            streak += 1;
        } else {
            break;
        }
    }

    streak
}
