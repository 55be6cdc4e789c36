pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::StoreError,
    model::structures::{ladder_match::Match, player::Player, rank_change::RankChange}
};

pub use memory::MemoryStore;

/// Persistent home of the ladder. Writes target one player at a time and
/// stores are expected to reject two players holding the same rank.
#[async_trait]
pub trait LadderStore: Send + Sync {
    /// All players, ascending by rank
    async fn list_players_by_rank(&self) -> Result<Vec<Player>, StoreError>;

    async fn set_player_rank(&self, player_id: Uuid, rank: i32) -> Result<(), StoreError>;

    /// Worst rank on the ladder, 0 when it is empty
    async fn max_rank(&self) -> Result<i32, StoreError> {
        let players = self.list_players_by_rank().await?;
        Ok(players.iter().map(|p| p.rank).max().unwrap_or(0))
    }

    async fn insert_player(&self, name: &str, rank: i32) -> Result<Player, StoreError>;

    async fn rename_player(&self, player_id: Uuid, name: &str) -> Result<Player, StoreError>;

    async fn delete_player(&self, player_id: Uuid) -> Result<(), StoreError>;

    /// Whether `apply_rank_changes_atomically` is available
    fn supports_atomic_commit(&self) -> bool {
        false
    }

    /// Applies every change or none of them.
    async fn apply_rank_changes_atomically(&self, _changes: &[RankChange]) -> Result<(), StoreError> {
        Err(StoreError::Unsupported("atomic rank commit"))
    }
}

/// Append-only audit log of results.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn record_match(
        &self,
        winner_id: Uuid,
        loser_id: Uuid,
        winner_score: i32,
        loser_score: i32
    ) -> Result<Match, StoreError>;

    /// Matches with this exact winner and loser created at or after `since`
    async fn find_recent(&self, winner_id: Uuid, loser_id: Uuid, since: DateTime<Utc>)
        -> Result<Vec<Match>, StoreError>;

    /// Newest first
    async fn list_recent(&self, limit: usize) -> Result<Vec<Match>, StoreError>;
}
