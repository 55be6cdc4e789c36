use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::rank_change::RankChange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// The winner was ranked below the loser and takes their slot
    Upset,
    /// The winner was already ranked above the loser
    NoChange
}

/// The rank changes produced by a single match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub match_id: Uuid,
    pub outcome: MatchOutcome,
    /// Winner first, then loser, then shifted players by ascending old rank
    pub changes: Vec<RankChange>
}

impl Resolution {
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn new_rank_of(&self, player_id: Uuid) -> Option<i32> {
        self.changes
            .iter()
            .find(|c| c.player_id == player_id)
            .map(|c| c.new_rank)
    }
}
