use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RankChange {
    pub player_id: Uuid,
    pub old_rank: i32,
    pub new_rank: i32
}

impl RankChange {
    pub fn new(player_id: Uuid, old_rank: i32, new_rank: i32) -> RankChange {
        RankChange {
            player_id,
            old_rank,
            new_rank
        }
    }

    /// The change that puts the player back where it was
    pub fn reversed(&self) -> RankChange {
        RankChange::new(self.player_id, self.new_rank, self.old_rank)
    }
}

/// A single store write issued while committing a set of rank changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankWrite {
    /// Parks the player on a placeholder rank above the ladder
    Stage { player_id: Uuid, rank: i32 },
    Final { player_id: Uuid, rank: i32 }
}

impl RankWrite {
    pub fn player_id(&self) -> Uuid {
        match self {
            RankWrite::Stage { player_id, .. } | RankWrite::Final { player_id, .. } => *player_id
        }
    }

    pub fn rank(&self) -> i32 {
        match self {
            RankWrite::Stage { rank, .. } | RankWrite::Final { rank, .. } => *rank
        }
    }
}
