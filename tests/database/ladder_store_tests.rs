use crate::{common::init_test_env, test_helpers::TestDatabase};
use club_ladder::{
    config::LadderConfig,
    error::LadderError,
    model::structures::{commit_strategy::CommitStrategy, ladder_match::Match, rank_change::RankChange},
    store::{LadderStore, MatchStore}
};
use serial_test::serial;
use uuid::Uuid;

const NAMES: [&str; 5] = ["A", "B", "C", "D", "E"];

async fn standing_names(db: &TestDatabase) -> Vec<String> {
    let client = db.get_client().await.unwrap();
    client
        .list_players_by_rank()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect()
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_insert_and_list_players() {
    init_test_env();
    let db = TestDatabase::new().await.unwrap();
    db.seed_players(&NAMES).await.unwrap();

    let client = db.get_client().await.unwrap();
    let players = client.list_players_by_rank().await.unwrap();

    assert_eq!(players.len(), 5);
    assert_eq!(players.iter().map(|p| p.rank).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    assert_eq!(client.max_rank().await.unwrap(), 5);
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_unique_rank_is_enforced() {
    init_test_env();
    let db = TestDatabase::new().await.unwrap();
    let players = db.seed_players(&NAMES).await.unwrap();

    let client = db.get_client().await.unwrap();
    assert!(client.set_player_rank(players[4].id, 1).await.is_err());
    assert!(client.set_player_rank(Uuid::new_v4(), 99).await.is_err());
    assert!(client.insert_player("F", 3).await.is_err());
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_staged_commit_against_postgres() {
    init_test_env();
    let db = TestDatabase::new().await.unwrap();
    let players = db.seed_players(&NAMES).await.unwrap();
    let ladder = db.ladder(LadderConfig::default()).await.unwrap();

    let submission = ladder.submit_match(players[3].id, players[0].id, 3, 1).await.unwrap();

    assert_eq!(submission.resolution.changes.len(), 4);
    assert_eq!(standing_names(&db).await, vec!["D", "A", "B", "C", "E"]);
    assert!(ladder.check_integrity().await.unwrap().is_dense());
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_atomic_commit_against_postgres() {
    init_test_env();
    let db = TestDatabase::new().await.unwrap();
    let players = db.seed_players(&NAMES).await.unwrap();
    let config = LadderConfig {
        commit_strategy: CommitStrategy::Atomic,
        ..LadderConfig::default()
    };
    let ladder = db.ladder(config).await.unwrap();

    ladder.submit_match(players[4].id, players[1].id, 5, 4).await.unwrap();

    assert_eq!(standing_names(&db).await, vec!["A", "E", "B", "C", "D"]);
    assert!(ladder.check_integrity().await.unwrap().is_dense());
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_atomic_commit_with_missing_player_changes_nothing() {
    init_test_env();
    let db = TestDatabase::new().await.unwrap();
    let players = db.seed_players(&NAMES).await.unwrap();
    let client = db.get_client().await.unwrap();

    let changes = vec![
        RankChange::new(players[1].id, 2, 1),
        RankChange::new(players[0].id, 1, 2),
        RankChange::new(Uuid::new_v4(), 6, 7)
    ];

    assert!(client.apply_rank_changes_atomically(&changes).await.is_err());
    assert_eq!(standing_names(&db).await, vec!["A", "B", "C", "D", "E"]);
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_duplicate_guard_against_postgres() {
    init_test_env();
    let db = TestDatabase::new().await.unwrap();
    let players = db.seed_players(&NAMES).await.unwrap();
    let ladder = db.ladder(LadderConfig::default()).await.unwrap();
    let (a, b) = (players[0].id, players[1].id);

    ladder.submit_match(b, a, 3, 1).await.unwrap();
    ladder.submit_match(a, b, 3, 1).await.unwrap();

    assert!(matches!(
        ladder.submit_match(b, a, 3, 0).await,
        Err(LadderError::DuplicateMatch { .. })
    ));

    let client = db.get_client().await.unwrap();
    assert_eq!(client.list_recent(10).await.unwrap().len(), 2);
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_process_recorded_match_and_remove() {
    init_test_env();
    let db = TestDatabase::new().await.unwrap();
    let players = db.seed_players(&NAMES).await.unwrap();
    let ladder = db.ladder(LadderConfig::default()).await.unwrap();

    let client = db.get_client().await.unwrap();
    let recorded: Match = client.record_match(players[2].id, players[1].id, 2, 1).await.unwrap();
    ladder.process_match_result(&recorded).await.unwrap();
    assert_eq!(standing_names(&db).await, vec!["A", "C", "B", "D", "E"]);

    ladder.remove_player(players[0].id).await.unwrap();
    assert_eq!(standing_names(&db).await, vec!["C", "B", "D", "E"]);
    assert!(ladder.check_integrity().await.unwrap().is_dense());

    let history = ladder.history(10).await.unwrap();
    assert_eq!(history[0].winner_name.as_deref(), Some("C"));
}
