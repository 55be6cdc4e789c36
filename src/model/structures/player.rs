use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    /// Position on the ladder, 1 is the top
    pub rank: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>
}

impl Player {
    pub fn new(name: &str, rank: i32) -> Player {
        Player::with_id(Uuid::new_v4(), name, rank)
    }

    pub fn with_id(id: Uuid, name: &str, rank: i32) -> Player {
        let now = Utc::now();

        Player {
            id,
            name: name.to_string(),
            rank,
            created_at: now,
            updated_at: now
        }
    }
}
