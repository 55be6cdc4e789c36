use thiserror::Error;
use uuid::Uuid;

/// Failures raised by a ladder or match store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("rank {rank} is already held by player {holder}")]
    RankConflict { rank: i32, holder: Uuid },

    #[error("player {0} does not exist")]
    PlayerNotFound(Uuid),

    #[error("expected to update {expected} players but {updated} were found")]
    StaleSnapshot { expected: usize, updated: usize },

    #[error("operation not supported by this store: {0}")]
    Unsupported(&'static str),

    #[error("injected failure on rank write #{0}")]
    Injected(usize)
}

/// Reasons a submitted result is rejected before anything is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidMatch {
    #[error("winner and loser must be different players")]
    SamePlayer,

    #[error("scores cannot be negative (winner {winner_score}, loser {loser_score})")]
    NegativeScore { winner_score: i32, loser_score: i32 },

    #[error("winner score {winner_score} must be higher than loser score {loser_score}")]
    ScoreNotHigher { winner_score: i32, loser_score: i32 },

    #[error("rank {winner_rank} cannot challenge rank {loser_rank}: only players ranked above can be challenged")]
    ChallengeDirection { winner_rank: i32, loser_rank: i32 },

    #[error("rank {winner_rank} cannot challenge rank {loser_rank}: at most {max_spread} ranks above")]
    ChallengeSpread {
        winner_rank: i32,
        loser_rank: i32,
        max_spread: i32
    }
}

#[derive(Debug, Error)]
pub enum LadderError {
    #[error("player {player_id} is not on the ladder")]
    ParticipantNotFound { player_id: Uuid },

    #[error("failed to set rank {rank} for player {player_id}: {source}")]
    StoreWriteFailure {
        player_id: Uuid,
        rank: i32,
        #[source]
        source: StoreError
    },

    #[error("invalid match: {0}")]
    InvalidMatch(#[from] InvalidMatch),

    #[error("a match between {winner_id} and {loser_id} was recorded in the last {cooldown_secs} seconds")]
    DuplicateMatch {
        winner_id: Uuid,
        loser_id: Uuid,
        cooldown_secs: u64
    },

    #[error("player name must not be empty")]
    InvalidPlayerName,

    #[error("invalid reorder: {0}")]
    InvalidReorder(String),

    #[error("ladder already has {0} players")]
    LadderNotEmpty(usize),

    #[error("rank commit failed ({failure}) and restoring the previous ranks failed too ({compensation})")]
    CompensationFailed {
        failure: Box<LadderError>,
        compensation: Box<LadderError>
    },

    #[error("no room for {needed} placeholder ranks {offset} above rank {max_rank}")]
    PlaceholderOverflow { max_rank: i32, offset: i32, needed: usize },

    #[error(transparent)]
    Store(#[from] StoreError)
}
