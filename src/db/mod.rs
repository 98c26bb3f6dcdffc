/// Ledger store for the soundcred core
///
/// Manages the SQLite connection pool and the durable schema: users, songs,
/// reviews, and votes. Typed row structs live in [`models`].
pub mod models;

use crate::error::{CoreError, CoreResult};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// Database connection options
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub max_connections: u32,
    pub enable_wal: bool,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            enable_wal: true,
        }
    }
}

/// Create a SQLite connection pool backed by a file
pub async fn create_pool(path: &Path, options: DatabaseOptions) -> CoreResult<SqlitePool> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| CoreError::InvalidInput(format!("cannot create data directory: {}", e)))?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(options.max_connections)
        .connect_with(
            sqlx::sqlite::SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(if options.enable_wal {
                    sqlx::sqlite::SqliteJournalMode::Wal
                } else {
                    sqlx::sqlite::SqliteJournalMode::Delete
                })
                .foreign_keys(true)
                .busy_timeout(std::time::Duration::from_secs(5)),
        )
        .await?;

    Ok(pool)
}

/// Create an in-memory pool, restricted to one connection so every query
/// sees the same database
pub async fn create_memory_pool() -> CoreResult<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await?;
    Ok(pool)
}

/// Create the ledger schema if it does not exist. Idempotent; runs at
/// every startup.
pub async fn init_schema(pool: &SqlitePool) -> CoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            credits INTEGER NOT NULL DEFAULT 10,
            lifetime_points INTEGER NOT NULL DEFAULT 0,
            daily_points INTEGER NOT NULL DEFAULT 0,
            last_active TEXT,
            listen_start INTEGER NOT NULL DEFAULT 0,
            listen_song_id INTEGER NOT NULL DEFAULT 0,
            extra_submits INTEGER NOT NULL DEFAULT 0,
            suspended_until INTEGER NOT NULL DEFAULT 0,
            suspend_reason TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            url TEXT NOT NULL,
            title TEXT,
            artist_name TEXT,
            description TEXT NOT NULL DEFAULT '',
            tags TEXT NOT NULL DEFAULT '[]',
            upvotes INTEGER NOT NULL DEFAULT 0,
            views INTEGER NOT NULL DEFAULT 0,
            message_ref TEXT,
            channel_ref TEXT,
            timestamp INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            user_id TEXT NOT NULL,
            song_id INTEGER NOT NULL,
            timestamp INTEGER NOT NULL,
            PRIMARY KEY (user_id, song_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS votes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            song_id INTEGER NOT NULL,
            voter_id TEXT NOT NULL,
            amount INTEGER NOT NULL,
            timestamp INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // The submission cooldown scans a user's newest song timestamps; the
    // vote cap sums rows per (voter, song).
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_songs_user_time ON songs (user_id, timestamp)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_votes_voter_song ON votes (voter_id, song_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Test database connection
pub async fn test_connection(pool: &SqlitePool) -> CoreResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_init_is_idempotent() {
        let pool = create_memory_pool().await.unwrap();
        init_schema(&pool).await.unwrap();
        init_schema(&pool).await.unwrap();
        test_connection(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn file_backed_pool_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.sqlite");
        let pool = create_pool(&path, DatabaseOptions::default()).await.unwrap();
        init_schema(&pool).await.unwrap();
        test_connection(&pool).await.unwrap();
        assert!(path.exists());
    }
}
