/// Application context and dependency injection
use crate::{
    admin::AdminManager,
    config::CoreConfig,
    db,
    economy::EconomyManager,
    error::{CoreError, CoreResult},
    intent::{Intent, IntentEnvelope, Reply},
    leaderboard::LeaderboardManager,
    review::ReviewManager,
    session::SessionStore,
    submission::{SubmissionGate, WizardManager},
    votes::VoteLedger,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<CoreConfig>,
    pub db: SqlitePool,
    pub economy: Arc<EconomyManager>,
    pub gate: Arc<SubmissionGate>,
    pub wizard: Arc<WizardManager>,
    pub reviews: Arc<ReviewManager>,
    pub votes: Arc<VoteLedger>,
    pub leaderboard: Arc<LeaderboardManager>,
    pub admin: Arc<AdminManager>,
    pub sessions: Arc<SessionStore>,
}

impl AppContext {
    /// Create a context over a file-backed ledger from configuration
    pub async fn new(config: CoreConfig) -> CoreResult<Self> {
        config.validate()?;
        let pool = db::create_pool(&config.storage.ledger_db, db::DatabaseOptions::default())
            .await?;
        Self::with_pool(config, pool, Arc::new(SessionStore::new())).await
    }

    /// Create a context over an in-memory ledger; used by tests and demos
    pub async fn in_memory(config: CoreConfig) -> CoreResult<Self> {
        config.validate()?;
        let pool = db::create_memory_pool().await?;
        Self::with_pool(config, pool, Arc::new(SessionStore::new())).await
    }

    /// Wire all managers over an existing pool and an injected session store
    pub async fn with_pool(
        config: CoreConfig,
        pool: SqlitePool,
        sessions: Arc<SessionStore>,
    ) -> CoreResult<Self> {
        db::init_schema(&pool).await?;
        db::test_connection(&pool).await?;

        let config = Arc::new(config);
        let economy = Arc::new(EconomyManager::new(pool.clone(), Arc::clone(&config)));
        let gate = Arc::new(SubmissionGate::new(
            pool.clone(),
            Arc::clone(&economy),
            Arc::clone(&config),
        ));
        let wizard = Arc::new(WizardManager::new(
            pool.clone(),
            Arc::clone(&economy),
            Arc::clone(&gate),
            Arc::clone(&sessions),
            Arc::clone(&config),
        ));
        let reviews = Arc::new(ReviewManager::new(
            pool.clone(),
            Arc::clone(&economy),
            Arc::clone(&config),
        ));
        let votes = Arc::new(VoteLedger::new(
            pool.clone(),
            Arc::clone(&economy),
            Arc::clone(&config),
        ));
        let leaderboard = Arc::new(LeaderboardManager::new(pool.clone()));
        let admin = Arc::new(AdminManager::new(pool.clone(), Arc::clone(&economy)));

        tracing::info!("soundcred core ready");
        Ok(Self {
            config,
            db: pool,
            economy,
            gate,
            wizard,
            reviews,
            votes,
            leaderboard,
            admin,
            sessions,
        })
    }

    /// Resolve current state, apply one intent, and describe the result
    pub async fn dispatch(&self, envelope: IntentEnvelope) -> CoreResult<Reply> {
        let user_id = envelope.user_id.as_str();

        if envelope.intent.requires_moderator() && !envelope.moderator {
            return Err(CoreError::PermissionDenied(
                "moderator role required".to_string(),
            ));
        }

        match envelope.intent {
            Intent::Submit => Ok(Reply::Gate(self.gate.can_submit(user_id).await?)),
            Intent::StartWizard { seed } => {
                Ok(Reply::Step(self.wizard.start(user_id, seed).await?))
            }
            Intent::SelectStep { field, value } => {
                match self.wizard.select(user_id, field, &value).await? {
                    crate::submission::WizardReply::Step(view) => Ok(Reply::Step(view)),
                    crate::submission::WizardReply::Finalized(result) => {
                        Ok(Reply::Finalized(result))
                    }
                }
            }
            Intent::BackStep => Ok(Reply::Step(self.wizard.back(user_id)?)),
            Intent::StartListen { song_id } => {
                self.reviews.start_listen(user_id, song_id).await?;
                Ok(Reply::ListenStarted { song_id })
            }
            Intent::RequestReview { song_id } => Ok(Reply::Eligibility(
                self.reviews.request_review(user_id, song_id).await?,
            )),
            Intent::CommitReview { song_id, text } => Ok(Reply::ReviewAccepted(
                self.reviews.commit_review(user_id, song_id, &text).await?,
            )),
            Intent::CastVote { song_id, weight } => Ok(Reply::VoteApplied(
                self.votes.cast_vote(user_id, song_id, weight).await?,
            )),
            Intent::Profile => Ok(Reply::Balance(self.economy.balance(user_id).await?)),
            Intent::Rankings { window_days } => {
                Ok(Reply::Rankings(self.leaderboard.rankings(window_days).await?))
            }
            Intent::TopByGenre { tag } => {
                Ok(Reply::TopTracks(self.leaderboard.top_by_genre(&tag).await?))
            }
            Intent::AdminGrant { target_id, amount } => {
                let balance = self.admin.grant_credits(&target_id, amount).await?;
                Ok(Reply::CreditsGranted { target_id, balance })
            }
            Intent::AdminSetBonusSlots { target_id, slots } => {
                self.admin.set_bonus_slots(&target_id, slots).await?;
                Ok(Reply::BonusSlotsSet { target_id, slots })
            }
            Intent::AdminSuspend {
                target_id,
                hours,
                reason,
            } => {
                let until_ms = self.admin.suspend(&target_id, hours, &reason).await?;
                Ok(Reply::UserSuspended { target_id, until_ms })
            }
            Intent::AdminLiftSuspension { target_id } => {
                self.admin.lift_suspension(&target_id).await?;
                Ok(Reply::SuspensionLifted { target_id })
            }
            Intent::AdminDeleteSong { song_id } => Ok(Reply::SongDeleted(Box::new(
                self.admin.delete_song(song_id).await?,
            ))),
        }
    }
}
