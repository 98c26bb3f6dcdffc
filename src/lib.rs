/// soundcred - token-economy and moderation core for a community music board
///
/// Members submit music links, listen to each other's tracks, write reviews,
/// and spend earned credits to boost songs. This crate is the economy and
/// anti-abuse state machine behind that loop: credit/point accounting with
/// daily resets and caps, a sliding submission rate limit, a listen-then-
/// review gate, a capped vote ledger, and the resumable classification
/// wizard that turns a draft into a committed song.
///
/// The chat platform, command parsing, and card rendering live outside; they
/// deliver typed [`intent::Intent`]s to [`AppContext::dispatch`] and render
/// the [`intent::Reply`] or [`error::CoreError`] that comes back.
pub mod admin;
pub mod config;
pub mod context;
pub mod db;
pub mod economy;
pub mod error;
pub mod intent;
pub mod leaderboard;
pub mod review;
pub mod session;
pub mod submission;
pub mod taxonomy;
pub mod validation;
pub mod votes;

pub use config::CoreConfig;
pub use context::AppContext;
pub use error::{CoreError, CoreResult};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for a host process. `RUST_LOG` wins over the
/// configured level.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
