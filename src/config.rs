use serde::{Deserialize, Serialize};
use std::{env, time::Duration};

use crate::{
    args::Args,
    model::{
        constants::{DUPLICATE_COOLDOWN_SECS, MAX_CHALLENGE_SPREAD, MAX_TEMP_RANK_OFFSET, TEMP_RANK_OFFSET},
        structures::commit_strategy::CommitStrategy
    }
};

/// Rules and commit behaviour of the ladder service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderConfig {
    /// How many slots above themselves a player may challenge
    pub max_challenge_spread: i32,
    /// Window in which a repeated winner/loser pair is rejected. Zero disables the check.
    pub duplicate_cooldown: Duration,
    /// Distance between the bottom of the ladder and the first placeholder rank
    pub temp_rank_offset: i32,
    pub commit_strategy: CommitStrategy,
    /// Restore the previous ranks when a staged commit fails part way
    pub compensate_on_failure: bool
}

impl LadderConfig {
    /// Creates a configuration from environment variables, using defaults for
    /// anything missing or unparseable
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_challenge_spread: env::var("LADDER_MAX_SPREAD")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &i32| *v > 0)
                .unwrap_or(defaults.max_challenge_spread),
            duplicate_cooldown: env::var("LADDER_DUPLICATE_COOLDOWN_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.duplicate_cooldown),
            temp_rank_offset: env::var("LADDER_TEMP_RANK_OFFSET")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &i32| (1..=MAX_TEMP_RANK_OFFSET).contains(v))
                .unwrap_or(defaults.temp_rank_offset),
            commit_strategy: env::var("LADDER_COMMIT_STRATEGY")
                .ok()
                .and_then(|v| CommitStrategy::try_from(v.as_str()).ok())
                .unwrap_or(defaults.commit_strategy),
            compensate_on_failure: env::var("LADDER_COMPENSATE")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.compensate_on_failure)
        }
    }

    /// Environment configuration with command line flags taking precedence
    pub fn from_args(args: &Args) -> Self {
        let mut config = Self::from_env();

        if let Some(spread) = args.max_spread {
            config.max_challenge_spread = spread;
        }
        if let Some(secs) = args.cooldown_secs {
            config.duplicate_cooldown = Duration::from_secs(secs);
        }
        if let Some(strategy) = args.commit_strategy {
            config.commit_strategy = strategy;
        }
        if args.compensate {
            config.compensate_on_failure = true;
        }

        config
    }
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            max_challenge_spread: MAX_CHALLENGE_SPREAD,
            duplicate_cooldown: Duration::from_secs(DUPLICATE_COOLDOWN_SECS),
            temp_rank_offset: TEMP_RANK_OFFSET,
            commit_strategy: CommitStrategy::Staged,
            compensate_on_failure: false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;

    const VARS: [&str; 5] = [
        "LADDER_MAX_SPREAD",
        "LADDER_DUPLICATE_COOLDOWN_SECS",
        "LADDER_TEMP_RANK_OFFSET",
        "LADDER_COMMIT_STRATEGY",
        "LADDER_COMPENSATE"
    ];

    fn cleanup_env_vars() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let config = LadderConfig::default();

        assert_eq!(config.max_challenge_spread, 3);
        assert_eq!(config.duplicate_cooldown, Duration::from_secs(300));
        assert_eq!(config.temp_rank_offset, 1000);
        assert_eq!(config.commit_strategy, CommitStrategy::Staged);
        assert!(!config.compensate_on_failure);
    }

    #[test]
    #[serial]
    fn test_from_env_without_vars() {
        cleanup_env_vars();

        assert_eq!(LadderConfig::from_env(), LadderConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_with_vars() {
        cleanup_env_vars();

        env::set_var("LADDER_MAX_SPREAD", "5");
        env::set_var("LADDER_DUPLICATE_COOLDOWN_SECS", "0");
        env::set_var("LADDER_TEMP_RANK_OFFSET", "500");
        env::set_var("LADDER_COMMIT_STRATEGY", "atomic");
        env::set_var("LADDER_COMPENSATE", "true");

        let config = LadderConfig::from_env();

        assert_eq!(config.max_challenge_spread, 5);
        assert_eq!(config.duplicate_cooldown, Duration::ZERO);
        assert_eq!(config.temp_rank_offset, 500);
        assert_eq!(config.commit_strategy, CommitStrategy::Atomic);
        assert!(config.compensate_on_failure);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_garbage() {
        cleanup_env_vars();

        env::set_var("LADDER_MAX_SPREAD", "-2");
        env::set_var("LADDER_COMMIT_STRATEGY", "eventually");
        env::set_var("LADDER_TEMP_RANK_OFFSET", "0");

        let config = LadderConfig::from_env();

        assert_eq!(config.max_challenge_spread, 3);
        assert_eq!(config.commit_strategy, CommitStrategy::Staged);
        assert_eq!(config.temp_rank_offset, 1000);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_caps_temp_rank_offset() {
        cleanup_env_vars();

        env::set_var("LADDER_TEMP_RANK_OFFSET", "2147483647");
        assert_eq!(LadderConfig::from_env().temp_rank_offset, 1000);

        env::set_var("LADDER_TEMP_RANK_OFFSET", "1000000");
        assert_eq!(LadderConfig::from_env().temp_rank_offset, 1_000_000);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_args_override_env() {
        cleanup_env_vars();
        env::set_var("LADDER_MAX_SPREAD", "5");

        let args = Args::try_parse_from([
            "club-ladder",
            "--connection-string",
            "postgresql://localhost/ladder",
            "--max-spread",
            "2",
            "--commit-strategy",
            "atomic",
            "--compensate",
            "standings"
        ])
        .unwrap();
        let config = LadderConfig::from_args(&args);

        assert_eq!(config.max_challenge_spread, 2);
        assert_eq!(config.commit_strategy, CommitStrategy::Atomic);
        assert!(config.compensate_on_failure);

        cleanup_env_vars();
    }
}
