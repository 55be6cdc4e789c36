use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt};

/// How a set of rank changes reaches the ladder store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CommitStrategy {
    /// One write per player, parked on placeholder ranks first
    #[default]
    Staged,
    /// All changes in one store transaction
    Atomic
}

impl TryFrom<&str> for CommitStrategy {
    type Error = ();

    fn try_from(v: &str) -> Result<Self, Self::Error> {
        match v.trim().to_ascii_lowercase().as_str() {
            "staged" => Ok(CommitStrategy::Staged),
            "atomic" => Ok(CommitStrategy::Atomic),
            _ => Err(())
        }
    }
}

impl fmt::Display for CommitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitStrategy::Staged => write!(f, "staged"),
            CommitStrategy::Atomic => write!(f, "atomic")
        }
    }
}
