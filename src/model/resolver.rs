use std::cmp::Reverse;

use itertools::Itertools;
use tracing::debug;

use crate::{
    error::LadderError,
    model::{
        structures::{
            ladder_match::Match,
            player::Player,
            rank_change::{RankChange, RankWrite},
            resolution::{MatchOutcome, Resolution}
        },
        validation::validate_result
    }
};

/// # Ladder re-ranking
///
/// Turns a single match result into the rank changes it causes on `ordering`,
/// the full ladder as read at the start of processing.
///
/// If the winner was already ranked above the loser nothing moves. Otherwise the
/// winner takes the loser's slot `Rl`, the loser drops to `Rl + 1`, and every player
/// strictly between the two (old ranks `Rl + 1 .. Rw - 1`) drops one slot. Players
/// above `Rl` or below the winner's old slot `Rw` keep their rank, so a dense ladder
/// stays dense.
///
/// The changes are returned in commit order: winner, loser, then the shifted
/// players by ascending old rank.
pub fn resolve(match_: &Match, ordering: &[Player]) -> Result<Resolution, LadderError> {
    validate_result(match_.winner_id, match_.loser_id, match_.winner_score, match_.loser_score)?;

    let winner = find_player(ordering, match_.winner_id)?;
    let loser = find_player(ordering, match_.loser_id)?;

    if winner.rank < loser.rank {
        debug!(
            "{} (#{}) beat {} (#{}), ladder unchanged",
            winner.name, winner.rank, loser.name, loser.rank
        );

        return Ok(Resolution {
            match_id: match_.id,
            outcome: MatchOutcome::NoChange,
            changes: Vec::new()
        });
    }

    let winner_old_rank = winner.rank;
    let loser_old_rank = loser.rank;

    let mut changes = vec![
        RankChange::new(winner.id, winner_old_rank, loser_old_rank),
        RankChange::new(loser.id, loser_old_rank, loser_old_rank + 1)
    ];

    let shifted = ordering
        .iter()
        .filter(|p| p.id != winner.id && p.id != loser.id)
        .filter(|p| p.rank > loser_old_rank && p.rank < winner_old_rank)
        .sorted_by_key(|p| p.rank)
        .map(|p| RankChange::new(p.id, p.rank, p.rank + 1));

    changes.extend(shifted);

    debug!(
        "{} (#{}) upset {} (#{}), {} players move",
        winner.name,
        winner_old_rank,
        loser.name,
        loser_old_rank,
        changes.len()
    );

    Ok(Resolution {
        match_id: match_.id,
        outcome: MatchOutcome::Upset,
        changes
    })
}

pub fn find_player(ordering: &[Player], player_id: uuid::Uuid) -> Result<&Player, LadderError> {
    ordering
        .iter()
        .find(|p| p.id == player_id)
        .ok_or(LadderError::ParticipantNotFound { player_id })
}

/// First rank of a block of `needed` placeholder ranks for a commit against `ordering`.
/// Fails when the block would run past `i32::MAX`.
pub fn temp_rank_base(ordering: &[Player], offset: i32, needed: usize) -> Result<i32, LadderError> {
    let max_rank = max_rank(ordering);

    max_rank
        .checked_add(offset)
        .filter(|base| i32::try_from(needed).ok().and_then(|n| base.checked_add(n)).is_some())
        .ok_or(LadderError::PlaceholderOverflow {
            max_rank,
            offset,
            needed
        })
}

pub fn max_rank(ordering: &[Player]) -> i32 {
    ordering.iter().map(|p| p.rank).max().unwrap_or(0)
}

/// The store writes that commit `changes` without two players ever sharing a rank.
///
/// Every affected player is first parked on a placeholder rank (`temp_base`,
/// `temp_base + 1`, ...), visiting the highest old rank first. Only then is each
/// player written to its final rank, in the order the changes are given.
pub fn staged_writes(changes: &[RankChange], temp_base: i32) -> Vec<RankWrite> {
    let staged = changes
        .iter()
        .sorted_by_key(|c| Reverse(c.old_rank))
        .zip(temp_base..)
        .map(|(c, rank)| RankWrite::Stage {
            player_id: c.player_id,
            rank
        });

    let finals = changes.iter().map(|c| RankWrite::Final {
        player_id: c.player_id,
        rank: c.new_rank
    });

    staged.chain(finals).collect()
}

/// Applies `changes` to a copy of `ordering`, returning it sorted by rank.
pub fn apply_changes(ordering: &[Player], changes: &[RankChange]) -> Vec<Player> {
    ordering
        .iter()
        .cloned()
        .map(|mut p| {
            if let Some(change) = changes.iter().find(|c| c.player_id == p.id) {
                p.rank = change.new_rank;
            }
            p
        })
        .sorted_by_key(|p| p.rank)
        .collect()
}
