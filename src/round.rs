//! Round progression for a chase run.
//!
//! The controller owns every piece of mutable state. Each frame the driver
//! calls [`RoundController::tick`] with the elapsed time and gets back the
//! events that happened, which is where UI and sound hook in.

use std::time::Duration;

use rand::Rng;

use crate::agent::Agent;
use crate::components::{Cell, Dir, Grid, Pos};
use crate::config::ChaseConfig;
use crate::level;
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    /// Paused after a capture; the next round starts when this runs out.
    Intermission { remaining: Duration },
    Victory,
    Defeat,
}

impl Phase {
    pub fn is_over(self) -> bool {
        matches!(self, Phase::Victory | Phase::Defeat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    RoundStarted { round: u32 },
    PlayerStepped { pos: Pos },
    AgentMoved { dir: Dir, pos: Pos },
    Caught { round: u32 },
    Victory,
    Defeat,
}

#[derive(Debug, Clone)]
pub struct RoundState {
    pub round: u32,
    pub time_left: Duration,
    pub grid: Grid,
    pub player: Player,
    pub agent: Agent,
    pub phase: Phase,
}

pub struct RoundController<R: Rng> {
    config: ChaseConfig,
    rng: R,
    state: RoundState,
}

impl<R: Rng> RoundController<R> {
    /// Builds the controller and starts round 1. The config must already be
    /// validated.
    pub fn new(config: ChaseConfig, rng: R) -> Self {
        let grid = Grid::filled(config.width, config.height, Cell::Wall);
        let state = RoundState {
            round: 1,
            time_left: config.time_budget,
            player: Player::new(level::START, config.player_speed),
            agent: Agent::new(level::far_corner(&grid), level::move_interval(&config, 1)),
            grid,
            phase: Phase::Running,
        };
        let mut controller = Self { config, rng, state };
        controller.start_round();
        controller
    }

    /// Regenerates the maze for the current round and resets both entities.
    /// A finished run stays finished; see [`RoundController::restart`].
    pub fn start_round(&mut self) -> Option<RoundEvent> {
        if self.state.phase.is_over() {
            return None;
        }
        let round = self.state.round;
        let grid = level::generate(
            self.config.width,
            self.config.height,
            level::extra_openings(&self.config, round),
            &mut self.rng,
        );
        let interval = level::move_interval(&self.config, round);

        self.state.player = Player::new(level::START, self.config.player_speed);
        self.state.agent = Agent::new(level::far_corner(&grid), interval);
        self.state.grid = grid;
        self.state.phase = Phase::Running;

        tracing::info!(
            round,
            max_rounds = self.config.max_rounds,
            interval_ms = interval.as_millis() as u64,
            time_left_ms = self.state.time_left.as_millis() as u64,
            "round started"
        );
        Some(RoundEvent::RoundStarted { round })
    }

    /// Throws the current run away and starts again from round 1 with a full
    /// time budget, whatever phase the run was in.
    pub fn restart(&mut self) -> Option<RoundEvent> {
        self.state.round = 1;
        self.state.time_left = self.config.time_budget;
        self.state.phase = Phase::Running;
        tracing::info!("run restarted");
        self.start_round()
    }

    pub fn request_direction(&mut self, dir: Dir) {
        if self.state.phase == Phase::Running {
            self.state.player.request_direction(dir, &self.state.grid);
        }
    }

    pub fn tick(&mut self, elapsed: Duration) -> Vec<RoundEvent> {
        let mut events = Vec::new();
        match self.state.phase {
            Phase::Running => self.tick_running(elapsed, &mut events),
            Phase::Intermission { remaining } => {
                let remaining = remaining.saturating_sub(elapsed);
                if remaining.is_zero() {
                    events.extend(self.start_round());
                } else {
                    self.state.phase = Phase::Intermission { remaining };
                }
            }
            Phase::Victory | Phase::Defeat => {}
        }
        events
    }

    fn tick_running(&mut self, elapsed: Duration, events: &mut Vec<RoundEvent>) {
        self.state.time_left = self.state.time_left.saturating_sub(elapsed);
        if self.state.time_left.is_zero() {
            events.extend(self.on_timeout());
            return;
        }

        let state = &mut self.state;
        if let Some(pos) = state.player.advance(elapsed, &state.grid) {
            events.push(RoundEvent::PlayerStepped { pos });
        }

        if state.agent.accumulate(elapsed) {
            if let Some(dir) = state.agent.take_turn(&state.grid, state.player.pos) {
                events.push(RoundEvent::AgentMoved {
                    dir,
                    pos: state.agent.pos,
                });
            }
        }

        if self.is_capture() {
            events.extend(self.on_capture());
        }
    }

    fn is_capture(&self) -> bool {
        let (px, py) = self.state.player.continuous_pos();
        let dx = px - self.state.agent.pos.x as f32;
        let dy = py - self.state.agent.pos.y as f32;
        (dx * dx + dy * dy).sqrt() < self.config.capture_radius
    }

    /// Ends the current round in the player's favour. Only a running round
    /// can be won.
    pub fn on_capture(&mut self) -> Vec<RoundEvent> {
        if self.state.phase != Phase::Running {
            return Vec::new();
        }
        let round = self.state.round;
        let mut events = vec![RoundEvent::Caught { round }];
        tracing::info!(round, "agent caught");

        if round >= self.config.max_rounds {
            self.state.phase = Phase::Victory;
            tracing::info!(
                time_left_ms = self.state.time_left.as_millis() as u64,
                "run won"
            );
            events.push(RoundEvent::Victory);
            return events;
        }

        self.state.time_left =
            (self.state.time_left + self.config.time_bonus).min(self.config.time_budget);
        self.state.round += 1;
        if self.config.intermission.is_zero() {
            events.extend(self.start_round());
        } else {
            self.state.phase = Phase::Intermission {
                remaining: self.config.intermission,
            };
        }
        events
    }

    /// Ends the run in defeat. Does nothing once the run is over.
    pub fn on_timeout(&mut self) -> Option<RoundEvent> {
        if self.state.phase.is_over() {
            return None;
        }
        self.state.time_left = Duration::ZERO;
        self.state.phase = Phase::Defeat;
        tracing::info!(round = self.state.round, "out of time");
        Some(RoundEvent::Defeat)
    }

    pub fn config(&self) -> &ChaseConfig {
        &self.config
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    // Staging hook for tests; drivers go through the lifecycle calls.
    #[doc(hidden)]
    pub fn state_mut(&mut self) -> &mut RoundState {
        &mut self.state
    }

    pub fn grid(&self) -> &Grid {
        &self.state.grid
    }

    pub fn player(&self) -> &Player {
        &self.state.player
    }

    pub fn agent(&self) -> &Agent {
        &self.state.agent
    }

    pub fn round(&self) -> u32 {
        self.state.round
    }

    pub fn max_rounds(&self) -> u32 {
        self.config.max_rounds
    }

    pub fn time_left(&self) -> Duration {
        self.state.time_left
    }

    /// Remaining time as a share of the full budget, for the timer bar.
    pub fn time_fraction(&self) -> f32 {
        if self.config.time_budget.is_zero() {
            return 0.0;
        }
        (self.state.time_left.as_secs_f32() / self.config.time_budget.as_secs_f32())
            .clamp(0.0, 1.0)
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn controller(config: ChaseConfig) -> RoundController<ChaCha8Rng> {
        RoundController::new(config, ChaCha8Rng::seed_from_u64(42))
    }

    #[test]
    fn first_round_places_entities_in_opposite_corners() {
        let ctl = controller(ChaseConfig::default());
        assert_eq!(ctl.round(), 1);
        assert_eq!(ctl.phase(), Phase::Running);
        assert_eq!(ctl.player().pos, Pos::new(1, 1));
        assert_eq!(ctl.agent().pos, Pos::new(19, 13));
        assert_eq!(ctl.agent().move_interval, Duration::from_millis(220));
        assert_eq!(ctl.time_left(), Duration::from_millis(50_000));
    }

    #[test]
    fn time_drains_while_running() {
        let mut ctl = controller(ChaseConfig::default());
        ctl.tick(Duration::from_millis(16));
        assert_eq!(ctl.time_left(), Duration::from_millis(49_984));
    }

    #[test]
    fn capture_grants_capped_bonus_and_pauses() {
        let mut ctl = controller(ChaseConfig::default());
        ctl.state_mut().time_left = Duration::from_millis(45_000);
        let events = ctl.on_capture();
        assert_eq!(events, vec![RoundEvent::Caught { round: 1 }]);
        assert_eq!(ctl.round(), 2);
        assert_eq!(ctl.time_left(), Duration::from_millis(50_000));
        assert_eq!(
            ctl.phase(),
            Phase::Intermission {
                remaining: Duration::from_millis(1_000)
            }
        );

        // The budget is frozen during the pause.
        assert!(ctl.tick(Duration::from_millis(600)).is_empty());
        assert_eq!(ctl.time_left(), Duration::from_millis(50_000));

        let events = ctl.tick(Duration::from_millis(400));
        assert_eq!(events, vec![RoundEvent::RoundStarted { round: 2 }]);
        assert_eq!(ctl.phase(), Phase::Running);
        assert_eq!(ctl.agent().move_interval, Duration::from_millis(160));
        assert_eq!(ctl.player().pos, Pos::new(1, 1));
    }

    #[test]
    fn zero_intermission_starts_next_round_immediately() {
        let mut ctl = controller(ChaseConfig {
            intermission: Duration::ZERO,
            ..ChaseConfig::default()
        });
        let events = ctl.on_capture();
        assert_eq!(
            events,
            vec![
                RoundEvent::Caught { round: 1 },
                RoundEvent::RoundStarted { round: 2 }
            ]
        );
        assert_eq!(ctl.phase(), Phase::Running);
    }

    #[test]
    fn last_capture_wins_the_run() {
        let mut ctl = controller(ChaseConfig {
            max_rounds: 1,
            ..ChaseConfig::default()
        });
        let events = ctl.on_capture();
        assert_eq!(events, vec![RoundEvent::Caught { round: 1 }, RoundEvent::Victory]);
        assert_eq!(ctl.phase(), Phase::Victory);
        assert!(ctl.tick(Duration::from_millis(16)).is_empty());
    }

    #[test]
    fn input_is_ignored_outside_running() {
        let mut ctl = controller(ChaseConfig::default());
        assert_eq!(ctl.on_timeout(), Some(RoundEvent::Defeat));
        ctl.request_direction(Dir::Right);
        assert_eq!(ctl.player().next, None);
    }

    #[test]
    fn restart_begins_a_fresh_run() {
        let mut ctl = controller(ChaseConfig::default());
        ctl.on_capture();
        ctl.tick(Duration::from_millis(1_000));
        ctl.state_mut().time_left = Duration::from_millis(1);
        ctl.tick(Duration::from_millis(5));
        assert_eq!(ctl.phase(), Phase::Defeat);

        assert_eq!(ctl.restart(), Some(RoundEvent::RoundStarted { round: 1 }));
        assert_eq!(ctl.phase(), Phase::Running);
        assert_eq!(ctl.round(), 1);
        assert_eq!(ctl.time_left(), Duration::from_millis(50_000));
        assert_eq!(ctl.player().pos, Pos::new(1, 1));
        assert_eq!(ctl.agent().move_interval, Duration::from_millis(220));
    }

    #[test]
    fn time_fraction_tracks_budget() {
        let mut ctl = controller(ChaseConfig::default());
        ctl.state_mut().time_left = Duration::from_millis(10_000);
        assert!((ctl.time_fraction() - 0.2).abs() < 1e-6);
    }
}
