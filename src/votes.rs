/// Vote ledger
///
/// Votes are spending decisions: a user pays credits to move a song's score.
/// Positive weight is capped per (voter, song); dislikes are uncapped but
/// cost a flat fee and sit behind a reputation gate. Every applied vote is
/// appended to the ledger; the cap sum reads only the positive rows.
use crate::config::CoreConfig;
use crate::economy::EconomyManager;
use crate::error::{CoreError, CoreResult};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Result of an applied vote
#[derive(Debug, Clone)]
pub struct VoteResult {
    pub song_id: i64,
    pub weight: i64,
    pub cost: i64,
    pub new_score: i64,
    pub remaining_credits: i64,
}

/// Vote ledger service
pub struct VoteLedger {
    db: SqlitePool,
    economy: Arc<EconomyManager>,
    config: Arc<CoreConfig>,
}

impl VoteLedger {
    pub fn new(db: SqlitePool, economy: Arc<EconomyManager>, config: Arc<CoreConfig>) -> Self {
        Self {
            db,
            economy,
            config,
        }
    }

    /// Sum of positive weight this voter has already put on this song
    pub async fn positive_total(&self, voter_id: &str, song_id: i64) -> CoreResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM votes WHERE voter_id = ?1 AND song_id = ?2 AND amount > 0",
        )
        .bind(voter_id)
        .bind(song_id)
        .fetch_one(&self.db)
        .await?;
        Ok(total)
    }

    /// Cap check. Negative weight is always allowed here; the cost and
    /// reputation gates are enforced in [`cast_vote`](Self::cast_vote).
    pub async fn can_apply_vote(
        &self,
        voter_id: &str,
        song_id: i64,
        weight: i64,
    ) -> CoreResult<bool> {
        if weight < 0 {
            return Ok(true);
        }
        let total = self.positive_total(voter_id, song_id).await?;
        Ok(total + weight <= self.config.votes.positive_cap)
    }

    /// Validate, charge, record, and apply one vote
    pub async fn cast_vote(
        &self,
        user_id: &str,
        song_id: i64,
        weight: i64,
    ) -> CoreResult<VoteResult> {
        if weight == 0 || weight > self.config.votes.positive_cap || weight < -1 {
            return Err(CoreError::InvalidInput(format!(
                "unsupported vote weight {}",
                weight
            )));
        }

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM songs WHERE id = ?1")
            .bind(song_id)
            .fetch_optional(&self.db)
            .await?;
        if exists.is_none() {
            return Err(CoreError::NotFound(format!("song {}", song_id)));
        }

        // Dislikes cost a flat fee and require reputation; upvotes cost
        // their own weight.
        let cost = if weight < 0 {
            let user = self.economy.get_or_create(user_id).await?;
            if user.lifetime_points < self.config.votes.dislike_reputation_threshold {
                return Err(CoreError::PermissionDenied(format!(
                    "dislikes unlock at {} lifetime points",
                    self.config.votes.dislike_reputation_threshold
                )));
            }
            self.config.votes.dislike_cost
        } else {
            weight
        };

        if !self.can_apply_vote(user_id, song_id, weight).await? {
            return Err(CoreError::CapReached {
                reason: format!(
                    "only {} total upvotes per song",
                    self.config.votes.positive_cap
                ),
                retry_at_ms: None,
            });
        }

        if !self.economy.spend(user_id, cost).await? {
            let balance = self.economy.balance(user_id).await?;
            return Err(CoreError::InsufficientFunds {
                required: cost,
                available: balance.credits,
            });
        }

        let now_ms = Utc::now().timestamp_millis();
        if weight > 0 {
            // Guarded insert: a concurrent duplicate click loses the race
            // here and gets refunded.
            let res = sqlx::query(
                r#"
                INSERT INTO votes (song_id, voter_id, amount, timestamp)
                SELECT ?1, ?2, ?3, ?4
                WHERE (SELECT COALESCE(SUM(amount), 0) FROM votes
                       WHERE voter_id = ?2 AND song_id = ?1 AND amount > 0) + ?3 <= ?5
                "#,
            )
            .bind(song_id)
            .bind(user_id)
            .bind(weight)
            .bind(now_ms)
            .bind(self.config.votes.positive_cap)
            .execute(&self.db)
            .await?;
            if res.rows_affected() == 0 {
                self.economy.refund(user_id, cost).await?;
                return Err(CoreError::CapReached {
                    reason: format!(
                        "only {} total upvotes per song",
                        self.config.votes.positive_cap
                    ),
                    retry_at_ms: None,
                });
            }
        } else {
            sqlx::query("INSERT INTO votes (song_id, voter_id, amount, timestamp) VALUES (?1, ?2, ?3, ?4)")
                .bind(song_id)
                .bind(user_id)
                .bind(weight)
                .bind(now_ms)
                .execute(&self.db)
                .await?;
        }

        sqlx::query("UPDATE songs SET upvotes = upvotes + ?1 WHERE id = ?2")
            .bind(weight)
            .bind(song_id)
            .execute(&self.db)
            .await?;

        let new_score: i64 = sqlx::query_scalar("SELECT upvotes FROM songs WHERE id = ?1")
            .bind(song_id)
            .fetch_one(&self.db)
            .await?;
        let balance = self.economy.balance(user_id).await?;

        tracing::info!(
            voter = user_id,
            song_id,
            weight,
            cost,
            new_score,
            "vote applied"
        );
        Ok(VoteResult {
            song_id,
            weight,
            cost,
            new_score,
            remaining_credits: balance.credits,
        })
    }
}
