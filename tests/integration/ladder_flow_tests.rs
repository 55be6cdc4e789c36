use crate::common::init_test_env;
use club_ladder::{
    config::LadderConfig,
    error::{InvalidMatch, LadderError},
    ladder::Ladder,
    model::structures::{ladder_match::Match, resolution::MatchOutcome},
    store::MemoryStore,
    utils::test_utils::{generate_challenges, generate_ladder, named_ladder, player_named, FaultInjectingStore}
};
use std::{sync::Arc, time::Duration};

fn memory_ladder(config: LadderConfig) -> Ladder<MemoryStore, MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    Ladder::new(Arc::clone(&store), store, config)
}

#[tokio::test]
async fn test_club_season() {
    init_test_env();
    let ladder = memory_ladder(LadderConfig::default());

    let seeded = ladder.seed_sample_players().await.unwrap();
    let newcomer = ladder.add_player("Newcomer").await.unwrap();
    assert_eq!(newcomer.rank, seeded.len() as i32 + 1);

    // The newcomer climbs three slots at a time
    let standings = ladder.standings().await.unwrap();
    let target = standings[standings.len() - 4].id;
    let submission = ladder.submit_match(newcomer.id, target, 21, 18).await.unwrap();
    assert_eq!(submission.resolution.outcome, MatchOutcome::Upset);
    assert_eq!(submission.resolution.new_rank_of(newcomer.id), Some(newcomer.rank - 3));

    // A drawn result is rejected before anything is written
    let standings = ladder.standings().await.unwrap();
    let submission = ladder
        .submit_match(standings[0].id, standings[1].id, 0, 0)
        .await;
    assert!(matches!(
        submission,
        Err(LadderError::InvalidMatch(InvalidMatch::ScoreNotHigher { .. }))
    ));

    ladder.remove_player(standings[0].id).await.unwrap();
    ladder.rename_player(newcomer.id, "Rising Star").await.unwrap();

    let integrity = ladder.check_integrity().await.unwrap();
    assert!(integrity.is_dense());
    assert_eq!(integrity.player_count, seeded.len());

    let history = ladder.history(100).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].winner_name.as_deref(), Some("Rising Star"));
}

#[tokio::test]
async fn test_favourite_win_is_recorded_without_moves() {
    init_test_env();
    let players = named_ladder(&["A", "B", "C"]);
    let store = Arc::new(MemoryStore::with_players(players.clone()));
    let ladder = Ladder::new(Arc::clone(&store), store, LadderConfig::default());

    // A favourite win only reaches the ladder through process_match_result,
    // since submit_match only accepts upward challenges
    let match_ = Match::new(player_named(&players, "A").id, player_named(&players, "B").id, 3, 2);
    let resolution = ladder.process_match_result(&match_).await.unwrap();

    assert_eq!(resolution.outcome, MatchOutcome::NoChange);
    assert!(resolution.changes.is_empty());
    assert_eq!(
        ladder.standings().await.unwrap().iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        vec!["A", "B", "C"]
    );
}

#[tokio::test]
async fn test_interrupted_commit_is_detected() {
    init_test_env();
    let players = named_ladder(&["A", "B", "C", "D", "E"]);
    let store = Arc::new(FaultInjectingStore::failing_on(MemoryStore::with_players(players.clone()), &[3]));
    let ladder = Ladder::new(Arc::clone(&store), Arc::new(MemoryStore::new()), LadderConfig::default());

    let result = ladder
        .submit_match(player_named(&players, "D").id, player_named(&players, "A").id, 3, 1)
        .await;

    assert!(matches!(result, Err(LadderError::StoreWriteFailure { rank: 1007, .. })));
    assert!(!ladder.check_integrity().await.unwrap().is_dense());
}

#[tokio::test]
async fn test_generated_season_stays_dense() {
    init_test_env();
    let players = generate_ladder(40, 7);
    let store = Arc::new(MemoryStore::with_players(players.clone()));
    let config = LadderConfig {
        duplicate_cooldown: Duration::ZERO,
        ..LadderConfig::default()
    };
    let ladder = Ladder::new(Arc::clone(&store), store, config);

    for (challenger, target) in generate_challenges(40, 200, 3, 11) {
        let standings = ladder.standings().await.unwrap();
        let winner = standings[challenger as usize - 1].id;
        let loser = standings[target as usize - 1].id;

        ladder.submit_match(winner, loser, 2, 1).await.unwrap();
    }

    let integrity = ladder.check_integrity().await.unwrap();
    assert!(integrity.is_dense());
    assert_eq!(integrity.player_count, 40);
    assert_eq!(ladder.history(500).await.unwrap().len(), 200);
}
