pub mod commit_strategy;
pub mod ladder_match;
pub mod player;
pub mod rank_change;
pub mod resolution;
