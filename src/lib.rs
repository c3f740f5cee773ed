//! Maze chase: catch the fleeing agent before the clock runs out.

pub mod agent;
pub mod components;
pub mod config;
pub mod error;
pub mod level;
pub mod player;
pub mod round;

pub use agent::Agent;
pub use components::{Cell, Dir, Grid, Pos};
pub use config::ChaseConfig;
pub use error::{ChaseError, Result};
pub use player::Player;
pub use round::{Phase, RoundController, RoundEvent, RoundState};
