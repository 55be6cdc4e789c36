use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use itertools::Itertools;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{LadderStore, MatchStore};
use crate::{
    error::StoreError,
    model::structures::{ladder_match::Match, player::Player, rank_change::RankChange}
};

#[derive(Default)]
struct MemoryState {
    players: IndexMap<Uuid, Player>,
    matches: Vec<Match>
}

impl MemoryState {
    fn holder_of(&self, rank: i32, except: Uuid) -> Option<Uuid> {
        self.players
            .values()
            .find(|p| p.rank == rank && p.id != except)
            .map(|p| p.id)
    }
}

/// In-process ladder and match log. Rank writes are checked against the same
/// unique-rank constraint a database would enforce.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Starts from an existing ladder. Ranks are taken as given, duplicates included.
    pub fn with_players(players: Vec<Player>) -> MemoryStore {
        let state = MemoryState {
            players: players.into_iter().map(|p| (p.id, p)).collect(),
            matches: Vec::new()
        };

        MemoryStore {
            state: Mutex::new(state)
        }
    }
}

#[async_trait]
impl LadderStore for MemoryStore {
    async fn list_players_by_rank(&self) -> Result<Vec<Player>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.players.values().cloned().sorted_by_key(|p| p.rank).collect())
    }

    async fn set_player_rank(&self, player_id: Uuid, rank: i32) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;

        if let Some(holder) = state.holder_of(rank, player_id) {
            return Err(StoreError::RankConflict { rank, holder });
        }

        let player = state
            .players
            .get_mut(&player_id)
            .ok_or(StoreError::PlayerNotFound(player_id))?;
        player.rank = rank;
        player.updated_at = Utc::now();

        Ok(())
    }

    async fn insert_player(&self, name: &str, rank: i32) -> Result<Player, StoreError> {
        let mut state = self.state.lock().await;
        let player = Player::new(name, rank);

        if let Some(holder) = state.holder_of(rank, player.id) {
            return Err(StoreError::RankConflict { rank, holder });
        }

        state.players.insert(player.id, player.clone());
        Ok(player)
    }

    async fn rename_player(&self, player_id: Uuid, name: &str) -> Result<Player, StoreError> {
        let mut state = self.state.lock().await;
        let player = state
            .players
            .get_mut(&player_id)
            .ok_or(StoreError::PlayerNotFound(player_id))?;

        player.name = name.to_string();
        player.updated_at = Utc::now();

        Ok(player.clone())
    }

    async fn delete_player(&self, player_id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;

        state
            .players
            .shift_remove(&player_id)
            .map(|_| ())
            .ok_or(StoreError::PlayerNotFound(player_id))
    }

    fn supports_atomic_commit(&self) -> bool {
        true
    }

    async fn apply_rank_changes_atomically(&self, changes: &[RankChange]) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;

        if let Some(missing) = changes.iter().find(|c| !state.players.contains_key(&c.player_id)) {
            return Err(StoreError::PlayerNotFound(missing.player_id));
        }

        // Check the final state before touching anything
        let mut ranks: HashMap<Uuid, i32> = state.players.values().map(|p| (p.id, p.rank)).collect();
        for change in changes {
            ranks.insert(change.player_id, change.new_rank);
        }

        let mut holders: HashMap<i32, Uuid> = HashMap::new();
        for (id, rank) in &ranks {
            if let Some(holder) = holders.insert(*rank, *id) {
                return Err(StoreError::RankConflict { rank: *rank, holder });
            }
        }

        let now = Utc::now();
        for change in changes {
            if let Some(player) = state.players.get_mut(&change.player_id) {
                player.rank = change.new_rank;
                player.updated_at = now;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn record_match(
        &self,
        winner_id: Uuid,
        loser_id: Uuid,
        winner_score: i32,
        loser_score: i32
    ) -> Result<Match, StoreError> {
        let mut state = self.state.lock().await;
        let match_ = Match::new(winner_id, loser_id, winner_score, loser_score);

        state.matches.push(match_.clone());
        Ok(match_)
    }

    async fn find_recent(
        &self,
        winner_id: Uuid,
        loser_id: Uuid,
        since: DateTime<Utc>
    ) -> Result<Vec<Match>, StoreError> {
        let state = self.state.lock().await;

        Ok(state
            .matches
            .iter()
            .filter(|m| m.winner_id == winner_id && m.loser_id == loser_id && m.created_at >= since)
            .cloned()
            .collect())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Match>, StoreError> {
        let state = self.state.lock().await;

        Ok(state
            .matches
            .iter()
            .rev()
            .sorted_by_key(|m| std::cmp::Reverse(m.created_at))
            .take(limit)
            .cloned()
            .collect())
    }
}
