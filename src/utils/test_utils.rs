use crate::{
    error::StoreError,
    model::structures::{player::Player, rank_change::RankChange},
    store::LadderStore
};
use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration
};
use tokio::sync::Mutex;
use uuid::Uuid;

/// A ladder with the given names at ranks 1, 2, 3, ...
pub fn named_ladder(names: &[&str]) -> Vec<Player> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Player::new(name, i as i32 + 1))
        .collect()
}

/// Generates a dense ladder of `n` players with ids derived from `seed`, sorted by rank.
pub fn generate_ladder(n: i32, seed: u64) -> Vec<Player> {
    // Initialize seeded RNG for reproducible results
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (1..=n)
        .map(|rank| Player::with_id(Uuid::from_bytes(rng.random()), &format!("Player {}", rank), rank))
        .collect()
}

/// Random challenger/target rank pairs that satisfy the challenge rule, for benchmarks.
pub fn generate_challenges(n: i32, count: usize, max_spread: i32, seed: u64) -> Vec<(i32, i32)> {
    if n < 2 {
        panic!("A ladder needs at least 2 players for a challenge");
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (0..count)
        .map(|_| {
            let challenger = rng.random_range(2..=n);
            let target = rng.random_range((challenger - max_spread).max(1)..challenger);
            (challenger, target)
        })
        .collect()
}

pub fn player_named<'a>(ordering: &'a [Player], name: &str) -> &'a Player {
    ordering
        .iter()
        .find(|p| p.name == name)
        .unwrap_or_else(|| panic!("Expected player {} on the ladder", name))
}

/// Wraps a ladder store, recording every rank write and failing the listed
/// write attempts (1-based).
pub struct FaultInjectingStore<S> {
    inner: S,
    fail_on: Vec<usize>,
    atomic: bool,
    write_delay: Option<Duration>,
    attempts: AtomicUsize,
    writes: Mutex<Vec<(Uuid, i32)>>,
    atomic_commits: AtomicUsize
}

impl<S: LadderStore> FaultInjectingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_on: Vec::new(),
            atomic: true,
            write_delay: None,
            attempts: AtomicUsize::new(0),
            writes: Mutex::new(Vec::new()),
            atomic_commits: AtomicUsize::new(0)
        }
    }

    pub fn failing_on(inner: S, writes: &[usize]) -> Self {
        Self {
            fail_on: writes.to_vec(),
            ..Self::new(inner)
        }
    }

    /// Reports no atomic commit support, whatever the inner store can do
    pub fn without_atomic_commit(self) -> Self {
        Self { atomic: false, ..self }
    }

    /// Sleeps before every rank write so concurrent commits get a chance to interleave
    pub fn with_write_delay(self, delay: Duration) -> Self {
        Self {
            write_delay: Some(delay),
            ..self
        }
    }

    /// Successful single-player rank writes, in order
    pub async fn writes(&self) -> Vec<(Uuid, i32)> {
        self.writes.lock().await.clone()
    }

    pub fn atomic_commits(&self) -> usize {
        self.atomic_commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: LadderStore> LadderStore for FaultInjectingStore<S> {
    async fn list_players_by_rank(&self) -> Result<Vec<Player>, StoreError> {
        self.inner.list_players_by_rank().await
    }

    async fn set_player_rank(&self, player_id: Uuid, rank: i32) -> Result<(), StoreError> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }

        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on.contains(&attempt) {
            return Err(StoreError::Injected(attempt));
        }

        self.inner.set_player_rank(player_id, rank).await?;
        self.writes.lock().await.push((player_id, rank));
        Ok(())
    }

    async fn insert_player(&self, name: &str, rank: i32) -> Result<Player, StoreError> {
        self.inner.insert_player(name, rank).await
    }

    async fn rename_player(&self, player_id: Uuid, name: &str) -> Result<Player, StoreError> {
        self.inner.rename_player(player_id, name).await
    }

    async fn delete_player(&self, player_id: Uuid) -> Result<(), StoreError> {
        self.inner.delete_player(player_id).await
    }

    fn supports_atomic_commit(&self) -> bool {
        self.atomic && self.inner.supports_atomic_commit()
    }

    async fn apply_rank_changes_atomically(&self, changes: &[RankChange]) -> Result<(), StoreError> {
        self.atomic_commits.fetch_add(1, Ordering::SeqCst);
        self.inner.apply_rank_changes_atomically(changes).await
    }
}
