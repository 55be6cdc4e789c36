use crate::{error::InvalidMatch, model::structures::player::Player};
use uuid::Uuid;

/// Checks the parts of a result that do not depend on the ladder: distinct
/// players and a winner who actually scored more.
pub fn validate_result(
    winner_id: Uuid,
    loser_id: Uuid,
    winner_score: i32,
    loser_score: i32
) -> Result<(), InvalidMatch> {
    if winner_id == loser_id {
        return Err(InvalidMatch::SamePlayer);
    }

    if winner_score < 0 || loser_score < 0 {
        return Err(InvalidMatch::NegativeScore {
            winner_score,
            loser_score
        });
    }

    if winner_score <= loser_score {
        return Err(InvalidMatch::ScoreNotHigher {
            winner_score,
            loser_score
        });
    }

    Ok(())
}

/// A challenger may only play someone ranked above them, and no more than
/// `max_spread` slots above.
pub fn check_challenge(winner_rank: i32, loser_rank: i32, max_spread: i32) -> Result<(), InvalidMatch> {
    if winner_rank <= loser_rank {
        return Err(InvalidMatch::ChallengeDirection {
            winner_rank,
            loser_rank
        });
    }

    if winner_rank - loser_rank > max_spread {
        return Err(InvalidMatch::ChallengeSpread {
            winner_rank,
            loser_rank,
            max_spread
        });
    }

    Ok(())
}

/// Players the challenger may currently challenge, best ranked first.
/// `ordering` must be sorted by rank.
pub fn challengeable<'a>(challenger: &Player, ordering: &'a [Player], max_spread: i32) -> Vec<&'a Player> {
    ordering
        .iter()
        .filter(|p| p.id != challenger.id && check_challenge(challenger.rank, p.rank, max_spread).is_ok())
        .collect()
}
