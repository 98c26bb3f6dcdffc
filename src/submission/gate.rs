/// Submission gate: rolling 24h rate limit plus bonus slots
use crate::config::CoreConfig;
use crate::db::models::User;
use crate::economy::EconomyManager;
use crate::error::{CoreError, CoreResult};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;

/// A passed gate check, with the numbers the caller renders
#[derive(Debug, Clone)]
pub struct GateReady {
    pub credits: i64,
    /// Submissions inside the current rolling window
    pub used_slots: i64,
    pub daily_limit: i64,
}

/// Submission gate service
pub struct SubmissionGate {
    db: SqlitePool,
    economy: Arc<EconomyManager>,
    config: Arc<CoreConfig>,
}

impl SubmissionGate {
    pub fn new(db: SqlitePool, economy: Arc<EconomyManager>, config: Arc<CoreConfig>) -> Self {
        Self {
            db,
            economy,
            config,
        }
    }

    /// Base limit plus moderator-granted bonus slots
    pub fn daily_limit(&self, user: &User) -> i64 {
        self.config.submissions.base_daily_limit + user.extra_submits
    }

    /// When the user regains a submission slot, if currently rate limited.
    ///
    /// Looks at the newest `limit` submission timestamps; with fewer rows
    /// than the limit the user is unrestricted. Otherwise the oldest of that
    /// window plus the cooldown is the unlock instant. The window slides:
    /// after a burst of `limit` songs, exactly one slot frees as each
    /// submission ages out.
    pub async fn cooldown_unlock_time(
        &self,
        user_id: &str,
        limit: i64,
        now_ms: i64,
    ) -> CoreResult<Option<i64>> {
        let newest: Vec<i64> = sqlx::query_scalar(
            "SELECT timestamp FROM songs WHERE user_id = ?1 ORDER BY timestamp DESC LIMIT ?2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        if (newest.len() as i64) < limit {
            return Ok(None);
        }
        // Newest-first, so the last element is the oldest of the window
        let oldest = *newest.last().unwrap_or(&0);
        let unlock = oldest + self.config.submissions.cooldown_ms;
        if unlock > now_ms {
            Ok(Some(unlock))
        } else {
            Ok(None)
        }
    }

    /// Full gate: suspension, then funds, then cooldown
    pub async fn can_submit(&self, user_id: &str) -> CoreResult<GateReady> {
        self.can_submit_at(user_id, Utc::now().timestamp_millis())
            .await
    }

    /// Clock-explicit variant of [`can_submit`](Self::can_submit)
    pub async fn can_submit_at(&self, user_id: &str, now_ms: i64) -> CoreResult<GateReady> {
        let user = self.economy.get_or_create(user_id).await?;

        if user.is_suspended(now_ms) {
            return Err(CoreError::Suspended {
                until_ms: user.suspended_until,
                reason: user
                    .suspend_reason
                    .unwrap_or_else(|| "account suspended".to_string()),
            });
        }

        let cost = self.config.submissions.submission_cost;
        if user.credits < cost {
            return Err(CoreError::InsufficientFunds {
                required: cost,
                available: user.credits,
            });
        }

        let limit = self.daily_limit(&user);
        if let Some(unlock) = self.cooldown_unlock_time(user_id, limit, now_ms).await? {
            return Err(CoreError::CapReached {
                reason: format!("submission limit of {} reached", limit),
                retry_at_ms: Some(unlock),
            });
        }

        let window_start = now_ms - self.config.submissions.cooldown_ms;
        let used_slots: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM songs WHERE user_id = ?1 AND timestamp > ?2",
        )
        .bind(user_id)
        .bind(window_start)
        .fetch_one(&self.db)
        .await?;

        Ok(GateReady {
            credits: user.credits,
            used_slots,
            daily_limit: limit,
        })
    }
}
