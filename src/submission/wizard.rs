/// Classification wizard: a resumable, per-user, multi-step genre selection
///
/// Strictly linear: primary genre, primary style, optional secondary genre
/// (with an explicit SKIP), secondary style. Forward transitions write one
/// draft field; `back` discards exactly the most recent field and re-renders
/// the prior step. Finalize debits the submission cost and persists the song.
use crate::config::CoreConfig;
use crate::economy::EconomyManager;
use crate::error::{CoreError, CoreResult};
use crate::session::SessionStore;
use crate::submission::gate::SubmissionGate;
use crate::taxonomy::{self, SKIP};
use crate::validation;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;

/// One selectable wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardField {
    PrimaryGenre,
    PrimaryStyle,
    SecondaryGenre,
    SecondaryStyle,
}

/// Fields collected before the wizard starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftSeed {
    pub link: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub description: String,
}

/// In-flight submission state, process memory only
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub link: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub description: String,
    pub primary_genre: Option<String>,
    pub primary_style: Option<String>,
    pub secondary_genre: Option<String>,
    pub secondary_style: Option<String>,
}

impl Draft {
    fn from_seed(seed: DraftSeed) -> Self {
        Self {
            link: seed.link,
            title: seed.title,
            artist: seed.artist,
            description: seed.description,
            ..Self::default()
        }
    }

    /// The next field awaiting a selection
    fn next_field(&self) -> Option<WizardField> {
        if self.primary_genre.is_none() {
            Some(WizardField::PrimaryGenre)
        } else if self.primary_style.is_none() {
            Some(WizardField::PrimaryStyle)
        } else if self.secondary_genre.is_none() {
            Some(WizardField::SecondaryGenre)
        } else if self.secondary_style.is_none() {
            Some(WizardField::SecondaryStyle)
        } else {
            None
        }
    }

    /// Assembled tag path: 2 entries, or 4 when a secondary pair is set
    fn tag_path(&self) -> Vec<String> {
        let mut tags = Vec::with_capacity(4);
        tags.extend(self.primary_genre.clone());
        tags.extend(self.primary_style.clone());
        tags.extend(self.secondary_genre.clone());
        tags.extend(self.secondary_style.clone());
        tags
    }
}

/// What the caller renders for one step
#[derive(Debug, Clone)]
pub struct StepView {
    pub field: WizardField,
    pub options: Vec<String>,
    pub allow_skip: bool,
    pub allow_back: bool,
}

/// Result of a successful finalize
#[derive(Debug, Clone)]
pub struct FinalizeResult {
    pub song_id: i64,
    pub tags: Vec<String>,
    /// Routing reference resolved from the primary genre
    pub channel_ref: String,
    pub remaining_credits: i64,
}

/// A forward transition either renders the next step or finalizes
#[derive(Debug, Clone)]
pub enum WizardReply {
    Step(StepView),
    Finalized(FinalizeResult),
}

/// Wizard manager service
pub struct WizardManager {
    db: SqlitePool,
    economy: Arc<EconomyManager>,
    gate: Arc<SubmissionGate>,
    sessions: Arc<SessionStore>,
    config: Arc<CoreConfig>,
}

impl WizardManager {
    pub fn new(
        db: SqlitePool,
        economy: Arc<EconomyManager>,
        gate: Arc<SubmissionGate>,
        sessions: Arc<SessionStore>,
        config: Arc<CoreConfig>,
    ) -> Self {
        Self {
            db,
            economy,
            gate,
            sessions,
            config,
        }
    }

    /// Validate the seed, run the submission gate, and open a session
    pub async fn start(&self, user_id: &str, seed: DraftSeed) -> CoreResult<StepView> {
        validation::validate_seed(&seed, &self.config.submissions)?;
        self.gate.can_submit(user_id).await?;

        self.sessions.insert(user_id, Draft::from_seed(seed));
        Ok(self.view_for(user_id, WizardField::PrimaryGenre))
    }

    /// Record one selection and advance
    pub async fn select(
        &self,
        user_id: &str,
        field: WizardField,
        value: &str,
    ) -> CoreResult<WizardReply> {
        let mut draft = self.sessions.get(user_id).ok_or(CoreError::SessionExpired)?;

        let expected = draft.next_field().ok_or_else(|| {
            CoreError::InvalidInput("draft already complete".to_string())
        })?;
        if field != expected {
            // Stale click from an already-answered step
            return Err(CoreError::InvalidInput(format!(
                "expected a {:?} selection",
                expected
            )));
        }

        match field {
            WizardField::PrimaryGenre => {
                if !taxonomy::is_genre(value) {
                    return Err(CoreError::InvalidInput(format!("unknown genre: {}", value)));
                }
                draft.primary_genre = Some(value.to_string());
                self.sessions.insert(user_id, draft);
                Ok(WizardReply::Step(
                    self.view_for(user_id, WizardField::PrimaryStyle),
                ))
            }
            WizardField::PrimaryStyle => {
                let genre = draft.primary_genre.as_deref().unwrap_or_default();
                if !taxonomy::is_style_of(genre, value) {
                    return Err(CoreError::InvalidInput(format!(
                        "{} is not a style of {}",
                        value, genre
                    )));
                }
                draft.primary_style = Some(value.to_string());
                self.sessions.insert(user_id, draft);
                Ok(WizardReply::Step(
                    self.view_for(user_id, WizardField::SecondaryGenre),
                ))
            }
            WizardField::SecondaryGenre => {
                if value == SKIP {
                    // Short-circuit straight to finalize with the primary pair
                    return Ok(WizardReply::Finalized(self.finalize(user_id, draft).await?));
                }
                if !taxonomy::is_genre(value) {
                    return Err(CoreError::InvalidInput(format!("unknown genre: {}", value)));
                }
                draft.secondary_genre = Some(value.to_string());
                self.sessions.insert(user_id, draft);
                Ok(WizardReply::Step(
                    self.view_for(user_id, WizardField::SecondaryStyle),
                ))
            }
            WizardField::SecondaryStyle => {
                let genre = draft.secondary_genre.as_deref().unwrap_or_default();
                if !taxonomy::is_style_of(genre, value) {
                    return Err(CoreError::InvalidInput(format!(
                        "{} is not a style of {}",
                        value, genre
                    )));
                }
                draft.secondary_style = Some(value.to_string());
                Ok(WizardReply::Finalized(self.finalize(user_id, draft).await?))
            }
        }
    }

    /// Discard the most recently set field and re-render its step.
    /// Not an undo stack: one level only, and unavailable at the first step.
    pub fn back(&self, user_id: &str) -> CoreResult<StepView> {
        let mut draft = self.sessions.get(user_id).ok_or(CoreError::SessionExpired)?;

        let reopened = if draft.secondary_genre.is_some() {
            draft.secondary_genre = None;
            WizardField::SecondaryGenre
        } else if draft.primary_style.is_some() {
            draft.primary_style = None;
            WizardField::PrimaryStyle
        } else if draft.primary_genre.is_some() {
            draft.primary_genre = None;
            WizardField::PrimaryGenre
        } else {
            return Err(CoreError::InvalidInput(
                "already at the first step".to_string(),
            ));
        };

        self.sessions.insert(user_id, draft);
        Ok(self.view_for(user_id, reopened))
    }

    /// Record where the surrounding system posted the song card
    pub async fn set_message_ref(&self, song_id: i64, message_ref: &str) -> CoreResult<()> {
        let res = sqlx::query("UPDATE songs SET message_ref = ?1 WHERE id = ?2")
            .bind(message_ref)
            .bind(song_id)
            .execute(&self.db)
            .await?;
        if res.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("song {}", song_id)));
        }
        Ok(())
    }

    /// Debit the submission cost and persist the song. A failed debit
    /// discards the draft and creates no song row.
    async fn finalize(&self, user_id: &str, draft: Draft) -> CoreResult<FinalizeResult> {
        let cost = self.config.submissions.submission_cost;
        if !self.economy.spend(user_id, cost).await? {
            // Balance changed between wizard start and finalize
            self.sessions.remove(user_id);
            let balance = self.economy.balance(user_id).await?;
            return Err(CoreError::InsufficientFunds {
                required: cost,
                available: balance.credits,
            });
        }

        let tags = draft.tag_path();
        let primary = draft.primary_genre.clone().unwrap_or_default();
        let channel_ref = self
            .config
            .submissions
            .routing
            .get(&primary)
            .cloned()
            .unwrap_or_else(|| self.config.submissions.fallback_channel.clone());
        let now_ms = Utc::now().timestamp_millis();

        let res = sqlx::query(
            r#"
            INSERT INTO songs (user_id, url, title, artist_name, description, tags, channel_ref, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(user_id)
        .bind(&draft.link)
        .bind(&draft.title)
        .bind(&draft.artist)
        .bind(&draft.description)
        .bind(serde_json::to_string(&tags).unwrap_or_else(|_| "[]".to_string()))
        .bind(&channel_ref)
        .bind(now_ms)
        .execute(&self.db)
        .await?;
        let song_id = res.last_insert_rowid();

        self.sessions.remove(user_id);
        let balance = self.economy.balance(user_id).await?;

        tracing::info!(
            song_id,
            user = user_id,
            channel = %channel_ref,
            "submission finalized"
        );

        Ok(FinalizeResult {
            song_id,
            tags,
            channel_ref,
            remaining_credits: balance.credits,
        })
    }

    fn view_for(&self, user_id: &str, field: WizardField) -> StepView {
        let draft = self.sessions.get(user_id).unwrap_or_default();
        let options = match field {
            WizardField::PrimaryGenre | WizardField::SecondaryGenre => taxonomy::genres(),
            WizardField::PrimaryStyle => draft
                .primary_genre
                .as_deref()
                .and_then(taxonomy::styles_of)
                .cloned()
                .unwrap_or_default(),
            WizardField::SecondaryStyle => draft
                .secondary_genre
                .as_deref()
                .and_then(taxonomy::styles_of)
                .cloned()
                .unwrap_or_default(),
        };
        StepView {
            field,
            options,
            allow_skip: field == WizardField::SecondaryGenre,
            allow_back: field != WizardField::PrimaryGenre,
        }
    }
}
