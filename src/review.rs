/// Listen/review gate
///
/// A review is only worth points after a real listen: the gate records a
/// listen-start on the user row (one active listen per user, overwritten by
/// each new start), requires a minimum elapsed duration, and enforces one
/// review per user per song forever via the reviews composite key. The
/// review insert is the point of no return; a duplicate is detected there,
/// before any crediting.
use crate::config::CoreConfig;
use crate::economy::{BalanceView, EarnOutcome, EconomyManager};
use crate::error::{CoreError, CoreResult};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Whether a review may be written yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewEligibility {
    Eligible,
    /// Listen too short; try again after this many seconds
    NotYet { remaining_secs: i64 },
}

/// Outcome of an accepted review: the earn result plus fresh balances
#[derive(Debug, Clone)]
pub struct EconomyResult {
    pub outcome: EarnOutcome,
    pub balance: BalanceView,
}

/// Listen/review gate service
pub struct ReviewManager {
    db: SqlitePool,
    economy: Arc<EconomyManager>,
    config: Arc<CoreConfig>,
}

impl ReviewManager {
    pub fn new(db: SqlitePool, economy: Arc<EconomyManager>, config: Arc<CoreConfig>) -> Self {
        Self {
            db,
            economy,
            config,
        }
    }

    /// Stamp the listen state and count the view
    pub async fn start_listen(&self, user_id: &str, song_id: i64) -> CoreResult<()> {
        self.start_listen_at(user_id, song_id, Utc::now().timestamp_millis())
            .await
    }

    /// Clock-explicit variant of [`start_listen`](Self::start_listen)
    pub async fn start_listen_at(
        &self,
        user_id: &str,
        song_id: i64,
        now_ms: i64,
    ) -> CoreResult<()> {
        let res = sqlx::query("UPDATE songs SET views = views + 1 WHERE id = ?1")
            .bind(song_id)
            .execute(&self.db)
            .await?;
        if res.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("song {}", song_id)));
        }

        self.economy.get_or_create(user_id).await?;
        sqlx::query("UPDATE users SET listen_start = ?1, listen_song_id = ?2 WHERE id = ?3")
            .bind(now_ms)
            .bind(song_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        tracing::debug!(user = user_id, song_id, "listen started");
        Ok(())
    }

    /// Check whether the user may write a review for this song now
    pub async fn request_review(
        &self,
        user_id: &str,
        song_id: i64,
    ) -> CoreResult<ReviewEligibility> {
        self.request_review_at(user_id, song_id, Utc::now().timestamp_millis())
            .await
    }

    /// Clock-explicit variant of [`request_review`](Self::request_review)
    pub async fn request_review_at(
        &self,
        user_id: &str,
        song_id: i64,
        now_ms: i64,
    ) -> CoreResult<ReviewEligibility> {
        if self.review_exists(user_id, song_id).await? {
            return Err(CoreError::AlreadyDone(format!(
                "song {} already reviewed",
                song_id
            )));
        }

        let user = self.economy.get_or_create(user_id).await?;
        // No listen started, or the listen was for a different song
        if user.listen_start == 0 || user.listen_song_id != song_id {
            return Err(CoreError::SessionExpired);
        }

        let elapsed = now_ms - user.listen_start;
        let min = self.config.reviews.min_listen_ms;
        if elapsed < min {
            let remaining_secs = (min - elapsed + 999) / 1000;
            return Ok(ReviewEligibility::NotYet { remaining_secs });
        }
        Ok(ReviewEligibility::Eligible)
    }

    /// Persist the review and credit points. Idempotent against retries:
    /// the insert-or-ignore is checked before any crediting happens.
    pub async fn commit_review(
        &self,
        user_id: &str,
        song_id: i64,
        text: &str,
    ) -> CoreResult<EconomyResult> {
        self.commit_review_at(user_id, song_id, text, Utc::now().timestamp_millis())
            .await
    }

    /// Clock-explicit variant of [`commit_review`](Self::commit_review)
    pub async fn commit_review_at(
        &self,
        user_id: &str,
        song_id: i64,
        text: &str,
        now_ms: i64,
    ) -> CoreResult<EconomyResult> {
        let song_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM songs WHERE id = ?1")
            .bind(song_id)
            .fetch_optional(&self.db)
            .await?;
        if song_exists.is_none() {
            return Err(CoreError::NotFound(format!("song {}", song_id)));
        }

        let min_words = self.config.reviews.min_words;
        if crate::validation::word_count(text) < min_words {
            return Err(CoreError::InvalidInput(format!(
                "review must be at least {} words",
                min_words
            )));
        }

        let res = sqlx::query(
            "INSERT OR IGNORE INTO reviews (user_id, song_id, timestamp) VALUES (?1, ?2, ?3)",
        )
        .bind(user_id)
        .bind(song_id)
        .bind(now_ms)
        .execute(&self.db)
        .await?;
        if res.rows_affected() == 0 {
            return Err(CoreError::AlreadyDone(format!(
                "song {} already reviewed",
                song_id
            )));
        }

        let outcome = self
            .economy
            .earn_points(user_id, self.config.economy.review_earn)
            .await?;
        let balance = self.economy.balance(user_id).await?;

        tracing::info!(
            user = user_id,
            song_id,
            earned = outcome.earned_credits(),
            "review accepted"
        );
        Ok(EconomyResult { outcome, balance })
    }

    async fn review_exists(&self, user_id: &str, song_id: i64) -> CoreResult<bool> {
        let row: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM reviews WHERE user_id = ?1 AND song_id = ?2")
                .bind(user_id)
                .bind(song_id)
                .fetch_optional(&self.db)
                .await?;
        Ok(row.is_some())
    }
}
