/// End-to-end intent dispatch tests
///
/// Drives the full loop the external dispatcher would: submission gate,
/// wizard, listen, review, vote, profile, rankings, and admin operations.
use soundcred::config::CoreConfig;
use soundcred::error::CoreError;
use soundcred::intent::{Intent, IntentEnvelope, Reply};
use soundcred::submission::{DraftSeed, WizardField};
use soundcred::AppContext;

fn envelope(user_id: &str, intent: Intent) -> IntentEnvelope {
    IntentEnvelope {
        user_id: user_id.to_string(),
        moderator: false,
        intent,
    }
}

fn mod_envelope(user_id: &str, intent: Intent) -> IntentEnvelope {
    IntentEnvelope {
        user_id: user_id.to_string(),
        moderator: true,
        intent,
    }
}

fn seed() -> DraftSeed {
    DraftSeed {
        link: "https://soundcloud.com/neon/night-drive".to_string(),
        title: None,
        artist: Some("Neon Harbor".to_string()),
        description: "late night cruiser".to_string(),
    }
}

async fn ctx() -> AppContext {
    AppContext::in_memory(CoreConfig::default()).await.unwrap()
}

/// Run the wizard to a finalized song and return its id
async fn submit_song(ctx: &AppContext, user_id: &str) -> i64 {
    ctx.dispatch(envelope(user_id, Intent::StartWizard { seed: seed() }))
        .await
        .unwrap();
    ctx.dispatch(envelope(
        user_id,
        Intent::SelectStep {
            field: WizardField::PrimaryGenre,
            value: "EDM: House & Techno".to_string(),
        },
    ))
    .await
    .unwrap();
    ctx.dispatch(envelope(
        user_id,
        Intent::SelectStep {
            field: WizardField::PrimaryStyle,
            value: "Deep House".to_string(),
        },
    ))
    .await
    .unwrap();
    let reply = ctx
        .dispatch(envelope(
            user_id,
            Intent::SelectStep {
                field: WizardField::SecondaryGenre,
                value: "SKIP".to_string(),
            },
        ))
        .await
        .unwrap();
    match reply {
        Reply::Finalized(result) => result.song_id,
        other => panic!("expected finalize, got {:?}", other),
    }
}

#[tokio::test]
async fn submit_intent_reports_gate_state() {
    let ctx = ctx().await;
    let reply = ctx.dispatch(envelope("u1", Intent::Submit)).await.unwrap();
    match reply {
        Reply::Gate(ready) => {
            assert_eq!(ready.credits, 10);
            assert_eq!(ready.used_slots, 0);
            assert_eq!(ready.daily_limit, 3);
        }
        other => panic!("expected gate state, got {:?}", other),
    }
}

#[tokio::test]
async fn review_and_vote_loop() {
    let ctx = ctx().await;
    let song_id = submit_song(&ctx, "owner").await;

    // Listener starts a listen; the clock-explicit call backdates it so the
    // 45s gate is already satisfied
    ctx.reviews.start_listen_at("fan", song_id, 0).await.unwrap();
    let reply = ctx
        .dispatch(envelope("fan", Intent::RequestReview { song_id }))
        .await
        .unwrap();
    assert!(matches!(
        reply,
        Reply::Eligibility(soundcred::review::ReviewEligibility::Eligible)
    ));

    let reply = ctx
        .dispatch(envelope(
            "fan",
            Intent::CommitReview {
                song_id,
                text: "warm pads and a rolling bassline throughout".to_string(),
            },
        ))
        .await
        .unwrap();
    match reply {
        Reply::ReviewAccepted(result) => {
            assert!(result.outcome.earned_credits());
            assert_eq!(result.balance.credits, 12);
        }
        other => panic!("expected review result, got {:?}", other),
    }

    // Spend the earnings on votes
    let reply = ctx
        .dispatch(envelope("fan", Intent::CastVote { song_id, weight: 2 }))
        .await
        .unwrap();
    match reply {
        Reply::VoteApplied(result) => {
            assert_eq!(result.new_score, 2);
            assert_eq!(result.remaining_credits, 10);
        }
        other => panic!("expected vote result, got {:?}", other),
    }

    // Profile reflects it all
    let reply = ctx.dispatch(envelope("fan", Intent::Profile)).await.unwrap();
    match reply {
        Reply::Balance(view) => {
            assert_eq!(view.credits, 10);
            assert_eq!(view.lifetime_points, 2);
            assert!(!view.can_dislike);
        }
        other => panic!("expected balance, got {:?}", other),
    }

    // And the song now leads the board
    let reply = ctx
        .dispatch(envelope("fan", Intent::Rankings { window_days: None }))
        .await
        .unwrap();
    match reply {
        Reply::Rankings(boards) => {
            assert_eq!(boards.tracks[0].song_id, song_id);
            assert_eq!(boards.tracks[0].score, 2);
            assert_eq!(boards.critics[0].user_id, "fan");
        }
        other => panic!("expected rankings, got {:?}", other),
    }

    let reply = ctx
        .dispatch(envelope(
            "fan",
            Intent::TopByGenre {
                tag: "Deep House".to_string(),
            },
        ))
        .await
        .unwrap();
    match reply {
        Reply::TopTracks(tracks) => assert_eq!(tracks.len(), 1),
        other => panic!("expected tracks, got {:?}", other),
    }
}

#[tokio::test]
async fn fresh_listener_is_still_on_the_clock() {
    let ctx = ctx().await;
    let song_id = submit_song(&ctx, "owner").await;

    ctx.dispatch(envelope("fan", Intent::StartListen { song_id }))
        .await
        .unwrap();
    let reply = ctx
        .dispatch(envelope("fan", Intent::RequestReview { song_id }))
        .await
        .unwrap();
    match reply {
        Reply::Eligibility(soundcred::review::ReviewEligibility::NotYet { remaining_secs }) => {
            assert!(remaining_secs >= 1 && remaining_secs <= 45);
        }
        other => panic!("expected a wait, got {:?}", other),
    }
}

#[tokio::test]
async fn admin_intents_require_the_moderator_flag() {
    let ctx = ctx().await;

    let err = ctx
        .dispatch(envelope(
            "sneaky",
            Intent::AdminGrant {
                target_id: "sneaky".to_string(),
                amount: 100,
            },
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::PermissionDenied(_)));

    let reply = ctx
        .dispatch(mod_envelope(
            "mod",
            Intent::AdminGrant {
                target_id: "artist".to_string(),
                amount: 100,
            },
        ))
        .await
        .unwrap();
    match reply {
        Reply::CreditsGranted { balance, .. } => assert_eq!(balance, 110),
        other => panic!("expected grant, got {:?}", other),
    }
}

#[tokio::test]
async fn suspension_closes_the_gate_until_lifted() {
    let ctx = ctx().await;

    ctx.dispatch(mod_envelope(
        "mod",
        Intent::AdminSuspend {
            target_id: "u1".to_string(),
            hours: 24,
            reason: "review ring".to_string(),
        },
    ))
    .await
    .unwrap();

    let err = ctx.dispatch(envelope("u1", Intent::Submit)).await.unwrap_err();
    match &err {
        CoreError::Suspended { reason, .. } => assert_eq!(reason, "review ring"),
        other => panic!("expected Suspended, got {:?}", other),
    }
    assert!(err.retry_at_ms().is_some());

    ctx.dispatch(mod_envelope(
        "mod",
        Intent::AdminLiftSuspension {
            target_id: "u1".to_string(),
        },
    ))
    .await
    .unwrap();
    assert!(ctx.dispatch(envelope("u1", Intent::Submit)).await.is_ok());
}

#[tokio::test]
async fn moderator_delete_returns_the_row_for_cleanup() {
    let ctx = ctx().await;
    let song_id = submit_song(&ctx, "owner").await;
    ctx.wizard.set_message_ref(song_id, "msg-42").await.unwrap();

    let reply = ctx
        .dispatch(mod_envelope("mod", Intent::AdminDeleteSong { song_id }))
        .await
        .unwrap();
    match reply {
        Reply::SongDeleted(song) => {
            assert_eq!(song.id, song_id);
            assert_eq!(song.message_ref.as_deref(), Some("msg-42"));
        }
        other => panic!("expected deleted song, got {:?}", other),
    }
}

#[tokio::test]
async fn bonus_slots_widen_the_burst() {
    let ctx = ctx().await;
    ctx.dispatch(mod_envelope(
        "mod",
        Intent::AdminGrant {
            target_id: "prolific".to_string(),
            amount: 50,
        },
    ))
    .await
    .unwrap();

    // Burn through the base limit of 3
    for _ in 0..3 {
        submit_song(&ctx, "prolific").await;
    }
    let err = ctx
        .dispatch(envelope("prolific", Intent::Submit))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::CapReached { .. }));

    // A bonus slot opens the gate again
    ctx.dispatch(mod_envelope(
        "mod",
        Intent::AdminSetBonusSlots {
            target_id: "prolific".to_string(),
            slots: 1,
        },
    ))
    .await
    .unwrap();
    let reply = ctx
        .dispatch(envelope("prolific", Intent::Submit))
        .await
        .unwrap();
    match reply {
        Reply::Gate(ready) => assert_eq!(ready.daily_limit, 4),
        other => panic!("expected gate state, got {:?}", other),
    }
}
