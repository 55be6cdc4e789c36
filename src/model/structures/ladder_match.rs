use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recorded result. Matches are never updated once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    pub winner_id: Uuid,
    pub loser_id: Uuid,
    pub winner_score: i32,
    pub loser_score: i32,
    pub created_at: DateTime<Utc>
}

impl Match {
    pub fn new(winner_id: Uuid, loser_id: Uuid, winner_score: i32, loser_score: i32) -> Match {
        Match {
            id: Uuid::new_v4(),
            winner_id,
            loser_id,
            winner_score,
            loser_score,
            created_at: Utc::now()
        }
    }
}

/// A history entry. Names are `None` once the player has been removed from the ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    #[serde(flatten)]
    pub match_: Match,
    pub winner_name: Option<String>,
    pub loser_name: Option<String>
}
