/// Moderator operations
///
/// The role check itself belongs to the calling layer; these operations
/// assume it already passed (the intent dispatcher enforces it for intents).
use crate::db::models::Song;
use crate::economy::EconomyManager;
use crate::error::{CoreError, CoreResult};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;

const HOUR_MS: i64 = 60 * 60 * 1000;

/// Admin manager service
pub struct AdminManager {
    db: SqlitePool,
    economy: Arc<EconomyManager>,
}

impl AdminManager {
    pub fn new(db: SqlitePool, economy: Arc<EconomyManager>) -> Self {
        Self { db, economy }
    }

    /// Grant spendable credits directly. Bypasses the earn caps: this is a
    /// moderator override, not an earn.
    pub async fn grant_credits(&self, target_id: &str, amount: i64) -> CoreResult<i64> {
        if amount <= 0 {
            return Err(CoreError::InvalidInput(
                "grant amount must be positive".to_string(),
            ));
        }
        self.economy.get_or_create(target_id).await?;
        sqlx::query("UPDATE users SET credits = credits + ?1 WHERE id = ?2")
            .bind(amount)
            .bind(target_id)
            .execute(&self.db)
            .await?;

        let balance = self.economy.balance(target_id).await?;
        tracing::info!(target = target_id, amount, "credits granted");
        Ok(balance.credits)
    }

    /// Set the bonus submission slots added on top of the base daily limit
    pub async fn set_bonus_slots(&self, target_id: &str, slots: i64) -> CoreResult<()> {
        if slots < 0 {
            return Err(CoreError::InvalidInput(
                "bonus slots must be non-negative".to_string(),
            ));
        }
        self.economy.get_or_create(target_id).await?;
        sqlx::query("UPDATE users SET extra_submits = ?1 WHERE id = ?2")
            .bind(slots)
            .bind(target_id)
            .execute(&self.db)
            .await?;
        tracing::info!(target = target_id, slots, "bonus slots set");
        Ok(())
    }

    /// Put a user under a moderation hold. Returns the hold's end instant.
    pub async fn suspend(&self, target_id: &str, hours: i64, reason: &str) -> CoreResult<i64> {
        if hours <= 0 {
            return Err(CoreError::InvalidInput(
                "suspension must last at least an hour".to_string(),
            ));
        }
        self.economy.get_or_create(target_id).await?;
        let until_ms = Utc::now().timestamp_millis() + hours * HOUR_MS;
        sqlx::query("UPDATE users SET suspended_until = ?1, suspend_reason = ?2 WHERE id = ?3")
            .bind(until_ms)
            .bind(reason)
            .bind(target_id)
            .execute(&self.db)
            .await?;
        tracing::warn!(target = target_id, hours, reason, "user suspended");
        Ok(until_ms)
    }

    /// Lift a hold early
    pub async fn lift_suspension(&self, target_id: &str) -> CoreResult<()> {
        let res = sqlx::query(
            "UPDATE users SET suspended_until = 0, suspend_reason = NULL WHERE id = ?1",
        )
        .bind(target_id)
        .execute(&self.db)
        .await?;
        if res.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("user {}", target_id)));
        }
        tracing::info!(target = target_id, "suspension lifted");
        Ok(())
    }

    /// Delete a song. Returns the deleted row so the caller can remove the
    /// posted card. Votes and reviews stay behind as immutable audit rows
    /// keyed by the old song id.
    pub async fn delete_song(&self, song_id: i64) -> CoreResult<Song> {
        let song = sqlx::query_as::<_, Song>("SELECT * FROM songs WHERE id = ?1")
            .bind(song_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("song {}", song_id)))?;

        sqlx::query("DELETE FROM songs WHERE id = ?1")
            .bind(song_id)
            .execute(&self.db)
            .await?;

        tracing::warn!(song_id, owner = %song.user_id, "song deleted");
        Ok(song)
    }
}
