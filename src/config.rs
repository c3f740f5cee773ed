//! Tunables for a chase run.
//!
//! Defaults reproduce the pacing of the original game. The terminal driver
//! lets a handful of them be overridden from the environment.

use std::str::FromStr;
use std::time::Duration;

use crate::error::{ChaseError, Result};

pub const MIN_DIMENSION: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ChaseConfig {
    /// Grid columns. Odd, at least 5.
    pub width: usize,
    /// Grid rows. Odd, at least 5.
    pub height: usize,

    /// Captures needed to win the run.
    pub max_rounds: u32,
    /// Starting time budget, also the cap for bonuses.
    pub time_budget: Duration,
    /// Time added after each capture that is not the last.
    pub time_bonus: Duration,
    /// Pause between a capture and the next round. The budget does not drain.
    pub intermission: Duration,

    /// Player speed in cells per second.
    pub player_speed: f32,
    /// Capture happens when player and agent are closer than this, in cells.
    pub capture_radius: f32,

    // === AGENT PACING ===
    /// Interval at round 0, before any decrement.
    pub base_move_interval: Duration,
    /// Interval reduction per round.
    pub move_interval_decrement: Duration,
    /// The agent never decides faster than this.
    pub min_move_interval: Duration,

    // === MAZE ===
    /// Extra openings punched into every maze.
    pub base_extra_openings: usize,
    /// Additional openings per round number.
    pub extra_openings_per_round: usize,
}

impl Default for ChaseConfig {
    fn default() -> Self {
        Self {
            width: 21,
            height: 15,
            max_rounds: 3,
            time_budget: Duration::from_millis(50_000),
            time_bonus: Duration::from_millis(10_000),
            intermission: Duration::from_millis(1_000),
            player_speed: 7.0,
            capture_radius: 1.0,
            base_move_interval: Duration::from_millis(280),
            move_interval_decrement: Duration::from_millis(60),
            min_move_interval: Duration::from_millis(100),
            base_extra_openings: 10,
            extra_openings_per_round: 5,
        }
    }
}

impl ChaseConfig {
    /// Defaults overridden by `MAZE_CHASE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(width) = env_setting("MAZE_CHASE_WIDTH")? {
            config.width = width;
        }
        if let Some(height) = env_setting("MAZE_CHASE_HEIGHT")? {
            config.height = height;
        }
        if let Some(rounds) = env_setting("MAZE_CHASE_ROUNDS")? {
            config.max_rounds = rounds;
        }
        if let Some(ms) = env_setting::<u64>("MAZE_CHASE_TIME_MS")? {
            config.time_budget = Duration::from_millis(ms);
        }
        if let Some(speed) = env_setting("MAZE_CHASE_SPEED")? {
            config.player_speed = speed;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !valid_dimension(self.width) || !valid_dimension(self.height) {
            return Err(ChaseError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.max_rounds == 0 {
            return Err(ChaseError::InvalidSetting {
                key: "max_rounds",
                value: self.max_rounds.to_string(),
            });
        }
        if !(self.player_speed > 0.0) {
            return Err(ChaseError::InvalidSetting {
                key: "player_speed",
                value: self.player_speed.to_string(),
            });
        }
        Ok(())
    }
}

fn valid_dimension(n: usize) -> bool {
    n >= MIN_DIMENSION && n % 2 == 1
}

/// Reads and parses one environment variable. Unset is `Ok(None)`.
pub fn env_setting<T: FromStr>(key: &'static str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ChaseError::InvalidSetting { key, value: raw }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ChaseConfig::default().validate().is_ok());
    }

    #[test]
    fn even_width_is_rejected() {
        let config = ChaseConfig {
            width: 20,
            ..ChaseConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ChaseError::InvalidDimensions { width: 20, height: 15 })
        ));
    }

    #[test]
    fn tiny_height_is_rejected() {
        let config = ChaseConfig {
            height: 3,
            ..ChaseConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_rounds_is_rejected() {
        let config = ChaseConfig {
            max_rounds: 0,
            ..ChaseConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ChaseError::InvalidSetting { key: "max_rounds", .. })
        ));
    }

    #[test]
    fn unparseable_variable_is_an_invalid_setting() {
        std::env::set_var("MAZE_CHASE_TEST_GARBAGE_ROUNDS", "abc");
        let result: Result<Option<u32>> = env_setting("MAZE_CHASE_TEST_GARBAGE_ROUNDS");
        match result {
            Err(ChaseError::InvalidSetting { key, value }) => {
                assert_eq!(key, "MAZE_CHASE_TEST_GARBAGE_ROUNDS");
                assert_eq!(value, "abc");
            }
            other => panic!("expected InvalidSetting, got {other:?}"),
        }
    }

    #[test]
    fn padded_variable_still_parses() {
        std::env::set_var("MAZE_CHASE_TEST_PADDED_WIDTH", " 31 ");
        let value: Option<usize> = env_setting("MAZE_CHASE_TEST_PADDED_WIDTH").unwrap();
        assert_eq!(value, Some(31));
    }

    #[test]
    fn unset_variable_reads_as_none() {
        let value: Option<u32> = env_setting("MAZE_CHASE_TEST_NEVER_SET").unwrap();
        assert_eq!(value, None);
    }
}
