use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    config::LadderConfig,
    error::{LadderError, StoreError},
    model::{
        constants::SAMPLE_PLAYER_NAMES,
        integrity::{check_integrity, RankIntegrity},
        resolver::{find_player, resolve, staged_writes, temp_rank_base},
        structures::{
            commit_strategy::CommitStrategy,
            ladder_match::{Match, MatchSummary},
            player::Player,
            rank_change::RankChange,
            resolution::Resolution
        },
        validation::{challengeable, check_challenge, validate_result}
    },
    store::{LadderStore, MatchStore}
};

/// A recorded match together with what it did to the ladder
#[derive(Debug, Clone, Serialize)]
pub struct MatchSubmission {
    #[serde(rename = "match")]
    pub match_: Match,
    pub resolution: Resolution
}

/// Entry point for everything that reads or changes the ladder.
///
/// Every operation that writes ranks holds `write_lock` for its whole duration,
/// so resolutions never interleave their writes. Clones share the stores and the lock.
pub struct Ladder<L, M> {
    ladder_store: Arc<L>,
    match_store: Arc<M>,
    config: LadderConfig,
    write_lock: Arc<Mutex<()>>
}

impl<L, M> Clone for Ladder<L, M> {
    fn clone(&self) -> Self {
        Self {
            ladder_store: Arc::clone(&self.ladder_store),
            match_store: Arc::clone(&self.match_store),
            config: self.config.clone(),
            write_lock: Arc::clone(&self.write_lock)
        }
    }
}

impl<L: LadderStore, M: MatchStore> Ladder<L, M> {
    pub fn new(ladder_store: Arc<L>, match_store: Arc<M>, config: LadderConfig) -> Self {
        Self {
            ladder_store,
            match_store,
            config,
            write_lock: Arc::new(Mutex::new(()))
        }
    }

    pub fn ladder_store(&self) -> &Arc<L> {
        &self.ladder_store
    }

    pub async fn standings(&self) -> Result<Vec<Player>, LadderError> {
        Ok(self.ladder_store.list_players_by_rank().await?)
    }

    pub async fn check_integrity(&self) -> Result<RankIntegrity, LadderError> {
        Ok(check_integrity(&self.standings().await?))
    }

    /// The most recent `limit` matches, newest first, with player names where the
    /// players are still on the ladder
    pub async fn history(&self, limit: usize) -> Result<Vec<MatchSummary>, LadderError> {
        let names: HashMap<Uuid, String> = self
            .standings()
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();
        let matches = self.match_store.list_recent(limit).await?;

        Ok(matches
            .into_iter()
            .map(|m| MatchSummary {
                winner_name: names.get(&m.winner_id).cloned(),
                loser_name: names.get(&m.loser_id).cloned(),
                match_: m
            })
            .collect())
    }

    pub async fn challengeable(&self, player_id: Uuid) -> Result<Vec<Player>, LadderError> {
        let ordering = self.standings().await?;
        let challenger = find_player(&ordering, player_id)?;

        Ok(challengeable(challenger, &ordering, self.config.max_challenge_spread)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Adds a player at the bottom of the ladder
    pub async fn add_player(&self, name: &str) -> Result<Player, LadderError> {
        let name = clean_name(name)?;
        let _guard = self.write_lock.lock().await;

        let rank = self.ladder_store.max_rank().await? + 1;
        let player = self.ladder_store.insert_player(name, rank).await?;

        info!("Added {} at rank {}", player.name, player.rank);
        Ok(player)
    }

    pub async fn rename_player(&self, player_id: Uuid, name: &str) -> Result<Player, LadderError> {
        let name = clean_name(name)?;

        self.ladder_store
            .rename_player(player_id, name)
            .await
            .map_err(|e| match e {
                StoreError::PlayerNotFound(player_id) => LadderError::ParticipantNotFound { player_id },
                e => e.into()
            })
    }

    /// Removes a player, then closes the gap by moving everyone below up one slot.
    /// Returns the rank changes made to the remaining players.
    pub async fn remove_player(&self, player_id: Uuid) -> Result<Vec<RankChange>, LadderError> {
        let _guard = self.write_lock.lock().await;

        let ordering = self.ladder_store.list_players_by_rank().await?;
        let removed = find_player(&ordering, player_id)?;
        let changes = ordering
            .iter()
            .filter(|p| p.rank > removed.rank)
            .map(|p| RankChange::new(p.id, p.rank, p.rank - 1))
            .collect_vec();

        self.ladder_store.delete_player(player_id).await?;
        info!("Removed {} from rank {}", removed.name, removed.rank);

        if self.use_atomic_commit() {
            self.ladder_store.apply_rank_changes_atomically(&changes).await?;
        } else {
            // Each player moves into the slot vacated just before it
            for change in &changes {
                self.write_rank(change.player_id, change.new_rank).await?;
            }
        }

        Ok(changes)
    }

    /// Administrative re-rank. `assignments` must place every current player on
    /// exactly one of the ranks `1..=N`.
    pub async fn reorder(&self, assignments: &[(Uuid, i32)]) -> Result<Vec<RankChange>, LadderError> {
        let _guard = self.write_lock.lock().await;

        let ordering = self.ladder_store.list_players_by_rank().await?;
        let changes = reorder_changes(&ordering, assignments)?;

        self.commit(&changes, &ordering).await?;
        info!("Reordered ladder, {} players moved", changes.len());

        Ok(changes)
    }

    /// Fills an empty ladder with sample players
    pub async fn seed_sample_players(&self) -> Result<Vec<Player>, LadderError> {
        let _guard = self.write_lock.lock().await;

        let existing = self.ladder_store.list_players_by_rank().await?;
        if !existing.is_empty() {
            return Err(LadderError::LadderNotEmpty(existing.len()));
        }

        let mut players = Vec::with_capacity(SAMPLE_PLAYER_NAMES.len());
        for (i, name) in SAMPLE_PLAYER_NAMES.iter().enumerate() {
            players.push(self.ladder_store.insert_player(name, i as i32 + 1).await?);
        }

        info!("Seeded {} sample players", players.len());
        Ok(players)
    }

    /// # Match submission
    ///
    /// The full flow for a newly played match:
    /// 1. Check the result itself (distinct players, valid scores).
    /// 2. Check the challenge against the current ladder (direction and spread).
    /// 3. Reject the result if the same winner beat the same loser within the cooldown.
    /// 4. Record the match, then re-rank the ladder from it.
    ///
    /// Nothing is written unless steps 1-3 pass.
    pub async fn submit_match(
        &self,
        winner_id: Uuid,
        loser_id: Uuid,
        winner_score: i32,
        loser_score: i32
    ) -> Result<MatchSubmission, LadderError> {
        validate_result(winner_id, loser_id, winner_score, loser_score)?;

        let _guard = self.write_lock.lock().await;

        let ordering = self.ladder_store.list_players_by_rank().await?;
        let winner = find_player(&ordering, winner_id)?;
        let loser = find_player(&ordering, loser_id)?;
        check_challenge(winner.rank, loser.rank, self.config.max_challenge_spread)?;

        self.ensure_not_duplicate(winner_id, loser_id).await?;

        let match_ = self
            .match_store
            .record_match(winner_id, loser_id, winner_score, loser_score)
            .await?;
        info!(
            "Recorded match {}: {} beat {} {}-{}",
            match_.id, winner.name, loser.name, winner_score, loser_score
        );

        let resolution = self.resolve_and_commit(&match_, &ordering).await?;

        Ok(MatchSubmission { match_, resolution })
    }

    /// Re-ranks the ladder from an already recorded match. The ladder is read
    /// fresh under the write lock.
    pub async fn process_match_result(&self, match_: &Match) -> Result<Resolution, LadderError> {
        let _guard = self.write_lock.lock().await;

        let ordering = self.ladder_store.list_players_by_rank().await?;
        self.resolve_and_commit(match_, &ordering).await
    }

    async fn ensure_not_duplicate(&self, winner_id: Uuid, loser_id: Uuid) -> Result<(), LadderError> {
        let cooldown = self.config.duplicate_cooldown;
        if cooldown.is_zero() {
            return Ok(());
        }

        let since = chrono::Duration::from_std(cooldown)
            .ok()
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let recent = self.match_store.find_recent(winner_id, loser_id, since).await?;

        if !recent.is_empty() {
            warn!("Rejected duplicate match {} over {}", winner_id, loser_id);
            return Err(LadderError::DuplicateMatch {
                winner_id,
                loser_id,
                cooldown_secs: cooldown.as_secs()
            });
        }

        Ok(())
    }

    async fn resolve_and_commit(&self, match_: &Match, ordering: &[Player]) -> Result<Resolution, LadderError> {
        let resolution = resolve(match_, ordering)?;

        if resolution.is_noop() {
            info!("Match {} leaves the ladder unchanged", match_.id);
            return Ok(resolution);
        }

        self.commit(&resolution.changes, ordering).await?;
        info!("Match {} moved {} players", match_.id, resolution.changes.len());

        Ok(resolution)
    }

    fn use_atomic_commit(&self) -> bool {
        if self.config.commit_strategy != CommitStrategy::Atomic {
            return false;
        }

        if !self.ladder_store.supports_atomic_commit() {
            warn!("Store cannot commit ranks atomically, falling back to staged writes");
            return false;
        }

        true
    }

    /// # Rank commit
    ///
    /// Writes `changes` (computed against `ordering`) to the ladder store.
    ///
    /// With the atomic strategy the store applies everything in one transaction.
    /// Otherwise the changes are staged: every affected player is parked on a
    /// placeholder rank above the ladder, then written to its final rank. A failed
    /// write stops the sequence. If compensation is enabled, every affected player
    /// is then put back on its old rank the same way, using a fresh block of
    /// placeholders.
    async fn commit(&self, changes: &[RankChange], ordering: &[Player]) -> Result<(), LadderError> {
        if changes.is_empty() {
            return Ok(());
        }

        if self.use_atomic_commit() {
            self.ladder_store.apply_rank_changes_atomically(changes).await?;
            return Ok(());
        }

        // Compensation stages into a second block right after the first
        let blocks = if self.config.compensate_on_failure { 2 } else { 1 };
        let temp_base = temp_rank_base(ordering, self.config.temp_rank_offset, blocks * changes.len())?;
        let failure = match self.write_staged(changes, temp_base).await {
            Ok(()) => return Ok(()),
            Err(failure) => failure
        };

        if !self.config.compensate_on_failure {
            return Err(failure);
        }

        warn!("Restoring {} players to their previous ranks", changes.len());
        let restore = changes.iter().map(RankChange::reversed).collect_vec();

        match self.write_staged(&restore, temp_base + changes.len() as i32).await {
            Ok(()) => Err(failure),
            Err(compensation) => {
                error!("Ladder left inconsistent: {}", compensation);
                Err(LadderError::CompensationFailed {
                    failure: Box::new(failure),
                    compensation: Box::new(compensation)
                })
            }
        }
    }

    async fn write_staged(&self, changes: &[RankChange], temp_base: i32) -> Result<(), LadderError> {
        for write in staged_writes(changes, temp_base) {
            self.write_rank(write.player_id(), write.rank()).await?;
        }

        Ok(())
    }

    async fn write_rank(&self, player_id: Uuid, rank: i32) -> Result<(), LadderError> {
        debug!("Setting rank {} for player {}", rank, player_id);

        self.ladder_store
            .set_player_rank(player_id, rank)
            .await
            .map_err(|source| {
                error!("Failed to set rank {} for player {}: {}", rank, player_id, source);
                LadderError::StoreWriteFailure {
                    player_id,
                    rank,
                    source
                }
            })
    }
}

fn clean_name(name: &str) -> Result<&str, LadderError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LadderError::InvalidPlayerName);
    }

    Ok(name)
}

/// Validates an administrative reorder and returns the changes for players
/// whose rank actually moves, sorted by new rank.
fn reorder_changes(ordering: &[Player], assignments: &[(Uuid, i32)]) -> Result<Vec<RankChange>, LadderError> {
    let n = ordering.len();
    if assignments.len() != n {
        return Err(LadderError::InvalidReorder(format!(
            "expected {} assignments, got {}",
            n,
            assignments.len()
        )));
    }

    let mut new_ranks: HashMap<Uuid, i32> = HashMap::with_capacity(n);
    for (player_id, rank) in assignments {
        if *rank < 1 || *rank as usize > n {
            return Err(LadderError::InvalidReorder(format!("rank {} is outside 1..={}", rank, n)));
        }
        if new_ranks.insert(*player_id, *rank).is_some() {
            return Err(LadderError::InvalidReorder(format!("player {} assigned twice", player_id)));
        }
    }

    if let Some(rank) = new_ranks.values().duplicates().next() {
        return Err(LadderError::InvalidReorder(format!("rank {} assigned twice", rank)));
    }

    let mut changes = Vec::new();
    for player in ordering {
        let new_rank = *new_ranks
            .get(&player.id)
            .ok_or_else(|| LadderError::InvalidReorder(format!("player {} has no rank", player.id)))?;

        if new_rank != player.rank {
            changes.push(RankChange::new(player.id, player.rank, new_rank));
        }
    }

    changes.sort_by_key(|c| c.new_rank);
    Ok(changes)
}
