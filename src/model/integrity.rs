use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::structures::player::Player;

/// What is wrong with a ladder whose ranks are not exactly `1..=N`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RankIntegrity {
    pub player_count: usize,
    /// Ranks held by more than one player
    pub duplicates: Vec<i32>,
    /// Ranks in `1..=N` held by nobody
    pub gaps: Vec<i32>,
    /// Ranks outside `1..=N`, e.g. placeholders left by an interrupted commit
    pub out_of_range: Vec<i32>
}

impl RankIntegrity {
    pub fn is_dense(&self) -> bool {
        self.duplicates.is_empty() && self.gaps.is_empty() && self.out_of_range.is_empty()
    }
}

pub fn check_integrity(players: &[Player]) -> RankIntegrity {
    let n = players.len() as i32;
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();

    for p in players {
        *counts.entry(p.rank).or_default() += 1;
    }

    RankIntegrity {
        player_count: players.len(),
        duplicates: counts.iter().filter(|(_, c)| **c > 1).map(|(r, _)| *r).collect(),
        gaps: (1..=n).filter(|r| !counts.contains_key(r)).collect(),
        out_of_range: counts.keys().filter(|r| **r < 1 || **r > n).copied().collect()
    }
}
