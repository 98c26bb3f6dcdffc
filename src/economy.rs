/// User economy: credit balance, lifetime score, daily score
///
/// The three counters decouple reputation accrual (lifetime, uncapped) from
/// spendable currency (credits, wallet-capped) and daily earn rate (daily
/// points, capped, lazy calendar-day reset). All mutations are single
/// conditional statements so concurrent intents from the same user cannot
/// break the caps or drive credits negative.
use crate::config::CoreConfig;
use crate::db::models::User;
use crate::error::{CoreError, CoreResult};
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Outcome of an earn attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarnOutcome {
    /// All three counters credited
    Credited { amount: i64 },
    /// Wallet full: lifetime and daily points credited, spendable credits not
    WalletCap { amount: i64 },
    /// Daily cap hit: nothing credited
    DailyCap,
}

impl EarnOutcome {
    pub fn earned_credits(&self) -> bool {
        matches!(self, EarnOutcome::Credited { .. })
    }
}

/// Balance snapshot for rendering
#[derive(Debug, Clone)]
pub struct BalanceView {
    pub user_id: String,
    pub credits: i64,
    pub lifetime_points: i64,
    pub daily_points: i64,
    pub daily_point_cap: i64,
    pub wallet_cap: i64,
    /// Whether the dislike reputation gate is met
    pub can_dislike: bool,
}

/// Pure daily rollover: if `last_active` is not `today`, zero the daily
/// counter and stamp the date. No background timer; callers apply this
/// lazily on the first economy touch of a day.
pub fn rollover_if_needed(mut user: User, today: NaiveDate) -> User {
    if user.last_active_date() != Some(today) {
        user.daily_points = 0;
        user.last_active = Some(today.to_string());
    }
    user
}

/// Economy manager service
pub struct EconomyManager {
    db: SqlitePool,
    config: Arc<CoreConfig>,
}

impl EconomyManager {
    pub fn new(db: SqlitePool, config: Arc<CoreConfig>) -> Self {
        Self { db, config }
    }

    /// Fetch a user row, inserting defaults on first interaction
    pub async fn get_or_create(&self, user_id: &str) -> CoreResult<User> {
        sqlx::query("INSERT OR IGNORE INTO users (id, credits) VALUES (?1, ?2)")
            .bind(user_id)
            .bind(self.config.economy.starting_credits)
            .execute(&self.db)
            .await?;

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;
        Ok(user)
    }

    /// Credit review points for today, honoring the daily and wallet caps
    pub async fn earn_points(&self, user_id: &str, amount: i64) -> CoreResult<EarnOutcome> {
        self.earn_points_on(user_id, amount, Utc::now().date_naive())
            .await
    }

    /// Clock-explicit variant of [`earn_points`](Self::earn_points)
    pub async fn earn_points_on(
        &self,
        user_id: &str,
        amount: i64,
        today: NaiveDate,
    ) -> CoreResult<EarnOutcome> {
        if amount <= 0 {
            return Err(CoreError::InvalidInput(
                "earn amount must be positive".to_string(),
            ));
        }
        self.get_or_create(user_id).await?;
        self.apply_rollover(user_id, today).await?;

        let daily_cap = self.config.economy.daily_point_cap;
        let wallet_cap = self.config.economy.wallet_cap;

        // Normal path: wallet below cap and daily budget open.
        let res = sqlx::query(
            r#"
            UPDATE users
            SET credits = credits + ?1,
                lifetime_points = lifetime_points + ?1,
                daily_points = daily_points + ?1
            WHERE id = ?2 AND daily_points < ?3 AND credits < ?4
            "#,
        )
        .bind(amount)
        .bind(user_id)
        .bind(daily_cap)
        .bind(wallet_cap)
        .execute(&self.db)
        .await?;
        if res.rows_affected() == 1 {
            return Ok(EarnOutcome::Credited { amount });
        }

        // Wallet full: reputation keeps growing, spendable credits do not.
        let res = sqlx::query(
            r#"
            UPDATE users
            SET lifetime_points = lifetime_points + ?1,
                daily_points = daily_points + ?1
            WHERE id = ?2 AND daily_points < ?3
            "#,
        )
        .bind(amount)
        .bind(user_id)
        .bind(daily_cap)
        .execute(&self.db)
        .await?;
        if res.rows_affected() == 1 {
            return Ok(EarnOutcome::WalletCap { amount });
        }

        Ok(EarnOutcome::DailyCap)
    }

    /// Atomic check-then-debit. Returns false without mutation when the
    /// balance is short.
    pub async fn spend(&self, user_id: &str, amount: i64) -> CoreResult<bool> {
        if amount < 0 {
            return Err(CoreError::InvalidInput(
                "spend amount must be non-negative".to_string(),
            ));
        }
        self.get_or_create(user_id).await?;

        let res = sqlx::query("UPDATE users SET credits = credits - ?1 WHERE id = ?2 AND credits >= ?1")
            .bind(amount)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() == 1)
    }

    /// Refund a debit that could not complete (for example a vote whose cap
    /// guard lost a race after the spend)
    pub(crate) async fn refund(&self, user_id: &str, amount: i64) -> CoreResult<()> {
        sqlx::query("UPDATE users SET credits = credits + ?1 WHERE id = ?2")
            .bind(amount)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// Balance snapshot for rendering
    pub async fn balance(&self, user_id: &str) -> CoreResult<BalanceView> {
        let user = self.get_or_create(user_id).await?;
        Ok(BalanceView {
            user_id: user.id,
            credits: user.credits,
            lifetime_points: user.lifetime_points,
            daily_points: user.daily_points,
            daily_point_cap: self.config.economy.daily_point_cap,
            wallet_cap: self.config.economy.wallet_cap,
            can_dislike: user.lifetime_points >= self.config.votes.dislike_reputation_threshold,
        })
    }

    /// Persisted form of [`rollover_if_needed`]
    async fn apply_rollover(&self, user_id: &str, today: NaiveDate) -> CoreResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET daily_points = 0, last_active = ?1
            WHERE id = ?2 AND (last_active IS NULL OR last_active <> ?1)
            "#,
        )
        .bind(today.to_string())
        .bind(user_id)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
