/// Typed intent surface
///
/// The external dispatcher (commands, buttons, menus, forms) parses its wire
/// tokens once at its own boundary and hands the core one of these tagged
/// intents. Handlers never re-derive meaning from strings.
use crate::db::models::Song;
use crate::economy::BalanceView;
use crate::leaderboard::Leaderboards;
use crate::review::{EconomyResult, ReviewEligibility};
use crate::submission::{DraftSeed, FinalizeResult, GateReady, StepView, WizardField};
use crate::votes::VoteResult;
use serde::{Deserialize, Serialize};

/// One user action, with typed payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Intent {
    /// Check whether the user may open the submission wizard
    Submit,
    StartWizard { seed: DraftSeed },
    SelectStep { field: WizardField, value: String },
    BackStep,
    StartListen { song_id: i64 },
    RequestReview { song_id: i64 },
    CommitReview { song_id: i64, text: String },
    CastVote { song_id: i64, weight: i64 },
    Profile,
    Rankings { window_days: Option<u32> },
    TopByGenre { tag: String },
    AdminGrant { target_id: String, amount: i64 },
    AdminSetBonusSlots { target_id: String, slots: i64 },
    AdminSuspend { target_id: String, hours: i64, reason: String },
    AdminLiftSuspension { target_id: String },
    AdminDeleteSong { song_id: i64 },
}

impl Intent {
    /// Intents the dispatcher must refuse for non-moderators
    pub fn requires_moderator(&self) -> bool {
        matches!(
            self,
            Intent::AdminGrant { .. }
                | Intent::AdminSetBonusSlots { .. }
                | Intent::AdminSuspend { .. }
                | Intent::AdminLiftSuspension { .. }
                | Intent::AdminDeleteSong { .. }
        )
    }
}

/// An intent plus who sent it. The moderator flag comes from the external
/// authorization layer; the core only honors it.
#[derive(Debug, Clone)]
pub struct IntentEnvelope {
    pub user_id: String,
    pub moderator: bool,
    pub intent: Intent,
}

/// Typed result descriptor for the caller to render
#[derive(Debug, Clone)]
pub enum Reply {
    Gate(GateReady),
    Step(StepView),
    Finalized(FinalizeResult),
    ListenStarted { song_id: i64 },
    Eligibility(ReviewEligibility),
    ReviewAccepted(EconomyResult),
    VoteApplied(VoteResult),
    Balance(BalanceView),
    Rankings(Leaderboards),
    TopTracks(Vec<crate::leaderboard::TrackEntry>),
    CreditsGranted { target_id: String, balance: i64 },
    BonusSlotsSet { target_id: String, slots: i64 },
    UserSuspended { target_id: String, until_ms: i64 },
    SuspensionLifted { target_id: String },
    SongDeleted(Box<Song>),
}
