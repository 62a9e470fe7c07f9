//! SQLite persistence for profiles and messages.
//!
//! The schema is bootstrapped on every connect; all statements are
//! idempotent so restarting against an existing database is a no-op.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Identity record visible to other users. One row per account,
/// written by an idempotent upsert on every sign-in and sign-up.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub created_at: String,
}

/// A single message between two users. Append-only: no edit, no
/// delete. `id` is the autoincrement insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub created_at: String,
}

pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(database_url)
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}

/// Timestamps are UTC text with millisecond precision, so string
/// comparison orders them chronologically.
const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ','now')";

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT ({NOW})
        )"
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL DEFAULT ({NOW})
        )"
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sender_id TEXT NOT NULL REFERENCES profiles(id),
            receiver_id TEXT NOT NULL REFERENCES profiles(id),
            content TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT ({NOW})
        )"
    ))
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_messages_pair
         ON messages (sender_id, receiver_id, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Idempotent: a second call with the same id leaves exactly one row.
pub async fn upsert_profile(pool: &SqlitePool, id: &str, email: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO profiles (id, email) VALUES (?, ?)
         ON CONFLICT(id) DO UPDATE SET email = excluded.email",
    )
    .bind(id)
    .bind(email)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn profile_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>("SELECT id, email, created_at FROM profiles WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Every message between `a` and `b`, in either direction, oldest
/// first. The id tiebreak keeps equal-timestamp rows in insertion
/// order.
pub async fn history(pool: &SqlitePool, a: &str, b: &str) -> Result<Vec<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        "SELECT id, sender_id, receiver_id, content, created_at FROM messages
         WHERE (sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?)
         ORDER BY created_at ASC, id ASC",
    )
    .bind(a)
    .bind(b)
    .bind(b)
    .bind(a)
    .fetch_all(pool)
    .await
}

pub async fn insert_message(
    pool: &SqlitePool,
    sender_id: &str,
    receiver_id: &str,
    content: &str,
) -> Result<Message, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        "INSERT INTO messages (sender_id, receiver_id, content) VALUES (?, ?, ?)
         RETURNING id, sender_id, receiver_id, content, created_at",
    )
    .bind(sender_id)
    .bind(receiver_id)
    .bind(content)
    .fetch_one(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        // One connection so the in-memory database is shared.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn upsert_profile_is_idempotent() {
        let pool = test_pool().await;

        upsert_profile(&pool, "u1", "alice@x.com").await.unwrap();
        upsert_profile(&pool, "u1", "alice@x.com").await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profiles WHERE id = 'u1'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn profile_lookup_by_email() {
        let pool = test_pool().await;
        upsert_profile(&pool, "u1", "alice@x.com").await.unwrap();

        let found = profile_by_email(&pool, "alice@x.com").await.unwrap();
        assert_eq!(found.unwrap().id, "u1");

        let missing = profile_by_email(&pool, "nobody@x.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn history_filters_to_the_pair_in_both_directions() {
        let pool = test_pool().await;
        for (id, email) in [("a", "a@x.com"), ("b", "b@x.com"), ("c", "c@x.com")] {
            upsert_profile(&pool, id, email).await.unwrap();
        }

        insert_message(&pool, "a", "b", "hi").await.unwrap();
        insert_message(&pool, "b", "a", "hello").await.unwrap();
        insert_message(&pool, "a", "c", "other thread").await.unwrap();
        insert_message(&pool, "c", "b", "also other").await.unwrap();

        let msgs = history(&pool, "a", "b").await.unwrap();
        let contents: Vec<_> = msgs.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["hi", "hello"]);

        // Same conversation regardless of argument order.
        let flipped = history(&pool, "b", "a").await.unwrap();
        assert_eq!(flipped.len(), 2);
    }

    #[tokio::test]
    async fn history_is_oldest_first() {
        let pool = test_pool().await;
        upsert_profile(&pool, "a", "a@x.com").await.unwrap();
        upsert_profile(&pool, "b", "b@x.com").await.unwrap();

        for n in 0..5 {
            insert_message(&pool, "a", "b", &format!("m{n}")).await.unwrap();
        }

        let msgs = history(&pool, "a", "b").await.unwrap();
        assert!(msgs.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        assert!(msgs.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn insert_returns_the_stored_row() {
        let pool = test_pool().await;
        upsert_profile(&pool, "a", "a@x.com").await.unwrap();
        upsert_profile(&pool, "b", "b@x.com").await.unwrap();

        let msg = insert_message(&pool, "a", "b", "hi").await.unwrap();
        assert_eq!(msg.sender_id, "a");
        assert_eq!(msg.receiver_id, "b");
        assert_eq!(msg.content, "hi");
        assert!(!msg.created_at.is_empty());

        let next = insert_message(&pool, "a", "b", "again").await.unwrap();
        assert!(next.id > msg.id);
    }
}
