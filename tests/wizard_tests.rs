/// Classification wizard integration tests
///
/// Runs the wizard over an in-memory ledger, end to end: forward steps,
/// back, SKIP, finalize debits, and session loss.
use soundcred::config::CoreConfig;
use soundcred::error::CoreError;
use soundcred::session::SessionStore;
use soundcred::submission::{DraftSeed, WizardField, WizardReply};
use soundcred::AppContext;
use std::sync::Arc;

fn seed() -> DraftSeed {
    DraftSeed {
        link: "https://suno.com/song/abc".to_string(),
        title: Some("Night Drive".to_string()),
        artist: Some("Neon Harbor".to_string()),
        description: "late night synth cruiser".to_string(),
    }
}

async fn ctx() -> AppContext {
    AppContext::in_memory(CoreConfig::default()).await.unwrap()
}

#[tokio::test]
async fn skip_path_produces_a_two_tag_song_and_debits_once() {
    let ctx = ctx().await;

    let view = ctx.wizard.start("u1", seed()).await.unwrap();
    assert_eq!(view.field, WizardField::PrimaryGenre);
    assert!(!view.allow_back);
    assert!(view.options.contains(&"Rock: Metal & Heavy".to_string()));

    let reply = ctx
        .wizard
        .select("u1", WizardField::PrimaryGenre, "Rock: Metal & Heavy")
        .await
        .unwrap();
    let view = match reply {
        WizardReply::Step(view) => view,
        other => panic!("expected a step, got {:?}", other),
    };
    assert_eq!(view.field, WizardField::PrimaryStyle);
    assert!(view.options.contains(&"Thrash".to_string()));

    let reply = ctx
        .wizard
        .select("u1", WizardField::PrimaryStyle, "Thrash")
        .await
        .unwrap();
    let view = match reply {
        WizardReply::Step(view) => view,
        other => panic!("expected a step, got {:?}", other),
    };
    assert_eq!(view.field, WizardField::SecondaryGenre);
    assert!(view.allow_skip);

    let reply = ctx
        .wizard
        .select("u1", WizardField::SecondaryGenre, "SKIP")
        .await
        .unwrap();
    let result = match reply {
        WizardReply::Finalized(result) => result,
        other => panic!("expected finalize, got {:?}", other),
    };
    assert_eq!(result.tags, vec!["Rock: Metal & Heavy", "Thrash"]);
    // Starting credits 10, submission cost 3, debited exactly once
    assert_eq!(result.remaining_credits, 7);

    // Draft is gone; the song row is real
    assert!(ctx.sessions.is_empty());
    let song = ctx.admin.delete_song(result.song_id).await.unwrap();
    assert_eq!(song.url, "https://suno.com/song/abc");
    assert_eq!(song.artist_name.as_deref(), Some("Neon Harbor"));
}

#[tokio::test]
async fn full_path_produces_a_four_tag_song() {
    let ctx = ctx().await;
    ctx.wizard.start("u1", seed()).await.unwrap();
    ctx.wizard
        .select("u1", WizardField::PrimaryGenre, "Jazz & Blues")
        .await
        .unwrap();
    ctx.wizard
        .select("u1", WizardField::PrimaryStyle, "Fusion")
        .await
        .unwrap();
    ctx.wizard
        .select("u1", WizardField::SecondaryGenre, "Experimental & AI")
        .await
        .unwrap();
    let reply = ctx
        .wizard
        .select("u1", WizardField::SecondaryStyle, "Glitch")
        .await
        .unwrap();

    match reply {
        WizardReply::Finalized(result) => {
            assert_eq!(
                result.tags,
                vec!["Jazz & Blues", "Fusion", "Experimental & AI", "Glitch"]
            );
        }
        other => panic!("expected finalize, got {:?}", other),
    }
}

#[tokio::test]
async fn back_clears_exactly_one_level() {
    let ctx = ctx().await;
    ctx.wizard.start("u1", seed()).await.unwrap();
    ctx.wizard
        .select("u1", WizardField::PrimaryGenre, "Jazz & Blues")
        .await
        .unwrap();

    // From the style step, back reopens the primary-genre step with the
    // genre cleared
    let view = ctx.wizard.back("u1").unwrap();
    assert_eq!(view.field, WizardField::PrimaryGenre);

    // The style selection must now be rejected: we are back at step one
    let err = ctx
        .wizard
        .select("u1", WizardField::PrimaryStyle, "Bebop")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));

    // Picking a different genre works
    let reply = ctx
        .wizard
        .select("u1", WizardField::PrimaryGenre, "Pop & R&B")
        .await
        .unwrap();
    match reply {
        WizardReply::Step(view) => {
            assert!(view.options.contains(&"Neo Soul".to_string()));
        }
        other => panic!("expected a step, got {:?}", other),
    }

    // Back at the first step is refused
    let view = ctx.wizard.back("u1").unwrap();
    assert_eq!(view.field, WizardField::PrimaryGenre);
    assert!(matches!(
        ctx.wizard.back("u1").unwrap_err(),
        CoreError::InvalidInput(_)
    ));
}

#[tokio::test]
async fn unknown_values_are_rejected() {
    let ctx = ctx().await;
    ctx.wizard.start("u1", seed()).await.unwrap();

    assert!(matches!(
        ctx.wizard
            .select("u1", WizardField::PrimaryGenre, "Polka")
            .await
            .unwrap_err(),
        CoreError::InvalidInput(_)
    ));

    ctx.wizard
        .select("u1", WizardField::PrimaryGenre, "Jazz & Blues")
        .await
        .unwrap();
    // A style from a different genre
    assert!(matches!(
        ctx.wizard
            .select("u1", WizardField::PrimaryStyle, "Thrash")
            .await
            .unwrap_err(),
        CoreError::InvalidInput(_)
    ));
}

#[tokio::test]
async fn bad_seed_never_opens_a_session() {
    let ctx = ctx().await;
    let mut bad = seed();
    bad.link = "https://example.com/mp3".to_string();
    assert!(matches!(
        ctx.wizard.start("u1", bad).await.unwrap_err(),
        CoreError::InvalidInput(_)
    ));
    assert!(ctx.sessions.is_empty());
}

#[tokio::test]
async fn restart_loses_in_flight_wizards() {
    let ctx = ctx().await;
    ctx.wizard.start("u1", seed()).await.unwrap();

    // Same ledger, fresh process memory
    let restarted = AppContext::with_pool(
        CoreConfig::default(),
        ctx.db.clone(),
        Arc::new(SessionStore::new()),
    )
    .await
    .unwrap();

    let err = restarted
        .wizard
        .select("u1", WizardField::PrimaryGenre, "Jazz & Blues")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::SessionExpired));
    assert!(matches!(
        restarted.wizard.back("u1").unwrap_err(),
        CoreError::SessionExpired
    ));
}

#[tokio::test]
async fn late_fund_shortfall_aborts_and_discards_the_draft() {
    let ctx = ctx().await;
    ctx.wizard.start("u1", seed()).await.unwrap();

    // Balance collapses between wizard start and finalize
    assert!(ctx.economy.spend("u1", 9).await.unwrap());

    ctx.wizard
        .select("u1", WizardField::PrimaryGenre, "Jazz & Blues")
        .await
        .unwrap();
    ctx.wizard
        .select("u1", WizardField::PrimaryStyle, "Bebop")
        .await
        .unwrap();
    let err = ctx
        .wizard
        .select("u1", WizardField::SecondaryGenre, "SKIP")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::InsufficientFunds {
            required: 3,
            available: 1
        }
    ));

    // No song row, no draft; the user restarts from the entry command
    assert!(ctx.sessions.is_empty());
    let rankings = ctx.leaderboard.rankings(None).await.unwrap();
    assert!(rankings.tracks.is_empty());
}

#[tokio::test]
async fn message_ref_is_recorded_after_posting() {
    let ctx = ctx().await;
    ctx.wizard.start("u1", seed()).await.unwrap();
    ctx.wizard
        .select("u1", WizardField::PrimaryGenre, "Jazz & Blues")
        .await
        .unwrap();
    ctx.wizard
        .select("u1", WizardField::PrimaryStyle, "Bebop")
        .await
        .unwrap();
    let reply = ctx
        .wizard
        .select("u1", WizardField::SecondaryGenre, "SKIP")
        .await
        .unwrap();
    let result = match reply {
        WizardReply::Finalized(result) => result,
        other => panic!("expected finalize, got {:?}", other),
    };

    ctx.wizard
        .set_message_ref(result.song_id, "msg-1234")
        .await
        .unwrap();
    assert!(matches!(
        ctx.wizard.set_message_ref(999, "msg-x").await.unwrap_err(),
        CoreError::NotFound(_)
    ));
}
