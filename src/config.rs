/// Configuration management for the soundcred core
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// Main core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    pub storage: StorageConfig,
    pub economy: EconomyConfig,
    pub submissions: SubmissionConfig,
    pub reviews: ReviewConfig,
    pub votes: VoteConfig,
    pub logging: LoggingConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub ledger_db: PathBuf,
}

/// Credit and point accounting knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Credits a user starts with on first interaction
    pub starting_credits: i64,
    /// Points credited per accepted review
    pub review_earn: i64,
    /// Daily earn ceiling; resets on the first economy touch of a new day
    pub daily_point_cap: i64,
    /// Spendable-credit ceiling; lifetime points keep growing past it
    pub wallet_cap: i64,
}

/// Submission rate-limit knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Submissions allowed per rolling window before bonus slots
    pub base_daily_limit: i64,
    /// Credits debited when a submission finalizes
    pub submission_cost: i64,
    /// Rolling cooldown window in millis
    pub cooldown_ms: i64,
    /// Hosts a submitted link may point at
    pub allowed_domains: Vec<String>,
    pub max_title_len: usize,
    pub max_artist_len: usize,
    pub max_description_len: usize,
    /// Primary genre to routing-channel reference; opaque to the core
    pub routing: HashMap<String, String>,
    /// Channel reference used when a genre has no route
    pub fallback_channel: String,
}

/// Listen/review gate knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Minimum listen duration before a review may be requested
    pub min_listen_ms: i64,
    /// Minimum review word count
    pub min_words: usize,
}

/// Vote ledger knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteConfig {
    /// Cumulative positive weight one user may put on one song
    pub positive_cap: i64,
    /// Flat cost of the -1 dislike
    pub dislike_cost: i64,
    /// Lifetime points required before dislikes unlock
    pub dislike_reputation_threshold: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_directory: PathBuf::from("./data"),
                ledger_db: PathBuf::from("./data/ledger.sqlite"),
            },
            economy: EconomyConfig {
                starting_credits: 10,
                review_earn: 2,
                daily_point_cap: 40,
                wallet_cap: 60,
            },
            submissions: SubmissionConfig {
                base_daily_limit: 3,
                submission_cost: 3,
                cooldown_ms: 24 * 60 * 60 * 1000,
                allowed_domains: [
                    "youtube.com",
                    "youtu.be",
                    "music.youtube.com",
                    "spotify.com",
                    "soundcloud.com",
                    "suno.com",
                    "suno.ai",
                    "udio.com",
                    "sonauto.ai",
                    "tunee.ai",
                    "mureka.ai",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                max_title_len: 100,
                max_artist_len: 50,
                max_description_len: 100,
                routing: HashMap::new(),
                fallback_channel: "general".to_string(),
            },
            reviews: ReviewConfig {
                min_listen_ms: 45_000,
                min_words: 5,
            },
            votes: VoteConfig {
                positive_cap: 3,
                dislike_cost: 3,
                dislike_reputation_threshold: 50,
            },
            logging: LoggingConfig {
                level: "soundcred=debug".to_string(),
            },
        }
    }
}

impl CoreConfig {
    /// Load configuration from environment variables, with defaults for
    /// anything unset. Reads a `.env` file if one is present.
    pub fn from_env() -> CoreResult<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::default();

        if let Ok(dir) = env::var("SC_DATA_DIRECTORY") {
            config.storage.data_directory = PathBuf::from(&dir);
            config.storage.ledger_db = PathBuf::from(dir).join("ledger.sqlite");
        }
        if let Ok(path) = env::var("SC_LEDGER_DB_LOCATION") {
            config.storage.ledger_db = PathBuf::from(path);
        }

        config.economy.starting_credits =
            env_i64("SC_STARTING_CREDITS", config.economy.starting_credits)?;
        config.economy.review_earn = env_i64("SC_REVIEW_EARN", config.economy.review_earn)?;
        config.economy.daily_point_cap =
            env_i64("SC_DAILY_POINT_CAP", config.economy.daily_point_cap)?;
        config.economy.wallet_cap = env_i64("SC_WALLET_CAP", config.economy.wallet_cap)?;

        config.submissions.base_daily_limit =
            env_i64("SC_BASE_DAILY_LIMIT", config.submissions.base_daily_limit)?;
        config.submissions.submission_cost =
            env_i64("SC_SUBMISSION_COST", config.submissions.submission_cost)?;
        config.submissions.cooldown_ms =
            env_i64("SC_COOLDOWN_MS", config.submissions.cooldown_ms)?;
        if let Ok(domains) = env::var("SC_ALLOWED_DOMAINS") {
            config.submissions.allowed_domains = domains
                .split(',')
                .map(|d| d.trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect();
        }
        if let Ok(fallback) = env::var("SC_FALLBACK_CHANNEL") {
            config.submissions.fallback_channel = fallback;
        }
        // SC_ROUTING is "Genre=channel,Genre=channel"
        if let Ok(routes) = env::var("SC_ROUTING") {
            for pair in routes.split(',') {
                if let Some((genre, channel)) = pair.split_once('=') {
                    config
                        .submissions
                        .routing
                        .insert(genre.trim().to_string(), channel.trim().to_string());
                }
            }
        }

        config.reviews.min_listen_ms = env_i64("SC_MIN_LISTEN_MS", config.reviews.min_listen_ms)?;
        config.reviews.min_words = env_i64("SC_MIN_REVIEW_WORDS", config.reviews.min_words as i64)?
            as usize;

        config.votes.positive_cap = env_i64("SC_VOTE_CAP", config.votes.positive_cap)?;
        config.votes.dislike_cost = env_i64("SC_DISLIKE_COST", config.votes.dislike_cost)?;
        config.votes.dislike_reputation_threshold = env_i64(
            "SC_DISLIKE_REPUTATION",
            config.votes.dislike_reputation_threshold,
        )?;

        if let Ok(level) = env::var("SC_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Sanity-check the numeric knobs
    pub fn validate(&self) -> CoreResult<()> {
        if self.economy.starting_credits < 0 {
            return Err(CoreError::InvalidInput(
                "starting credits must be non-negative".to_string(),
            ));
        }
        if self.economy.review_earn <= 0 {
            return Err(CoreError::InvalidInput(
                "review earn amount must be positive".to_string(),
            ));
        }
        if self.economy.daily_point_cap <= 0 || self.economy.wallet_cap <= 0 {
            return Err(CoreError::InvalidInput(
                "point caps must be positive".to_string(),
            ));
        }
        if self.submissions.base_daily_limit <= 0 {
            return Err(CoreError::InvalidInput(
                "base daily limit must be positive".to_string(),
            ));
        }
        if self.submissions.submission_cost < 0 || self.votes.dislike_cost < 0 {
            return Err(CoreError::InvalidInput(
                "costs must be non-negative".to_string(),
            ));
        }
        if self.submissions.cooldown_ms <= 0 {
            return Err(CoreError::InvalidInput(
                "cooldown window must be positive".to_string(),
            ));
        }
        if self.votes.positive_cap <= 0 {
            return Err(CoreError::InvalidInput(
                "vote cap must be positive".to_string(),
            ));
        }
        if self.submissions.allowed_domains.is_empty() {
            return Err(CoreError::InvalidInput(
                "allowed domain list must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_i64(key: &str, default: i64) -> CoreResult<i64> {
    match env::var(key) {
        Ok(v) => v
            .parse()
            .map_err(|_| CoreError::InvalidInput(format!("{} must be an integer", key))),
        Err(_) => Ok(default),
    }
}
