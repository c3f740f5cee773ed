//! The fleeing agent the player has to catch.
//!
//! Decisions are taken at a fixed interval, not every frame. Each decision
//! scores the legal neighbours and moves to the best one.

use std::time::Duration;

use crate::components::{Dir, Grid, Pos};

pub const DISTANCE_WEIGHT: i64 = 10;
pub const FLEE_BONUS: i64 = 300;
pub const APPROACH_PENALTY: i64 = -200;
pub const EXIT_BONUS: i64 = 50;
pub const BACKTRACK_PENALTY: i64 = -5000;
pub const DEAD_END_PENALTY: i64 = -2000;

#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub pos: Pos,
    pub last_pos: Option<Pos>,
    pub move_interval: Duration,
    pub timer: Duration,
}

impl Agent {
    pub fn new(pos: Pos, move_interval: Duration) -> Self {
        Self {
            pos,
            last_pos: None,
            move_interval,
            timer: Duration::ZERO,
        }
    }

    /// Adds `dt` to the decision timer. Returns `true` when a decision is due,
    /// in which case the timer restarts from zero.
    pub fn accumulate(&mut self, dt: Duration) -> bool {
        self.timer += dt;
        if self.timer >= self.move_interval {
            self.timer = Duration::ZERO;
            true
        } else {
            false
        }
    }

    /// Picks the next move without changing any state.
    pub fn decide(&self, grid: &Grid, player: Pos) -> Option<Dir> {
        let moves = grid.legal_moves(self.pos);
        match moves.as_slice() {
            [] => None,
            [only] => Some(*only),
            _ => {
                let mut best: Option<(Dir, i64)> = None;
                for dir in moves.iter().copied() {
                    let score = self.score_move(grid, player, dir);
                    if best.map_or(true, |(_, top)| score > top) {
                        best = Some((dir, score));
                    }
                }
                best.map(|(dir, _)| dir)
            }
        }
    }

    /// Heuristic value of stepping in `dir`. Assumes the move is legal.
    pub fn score_move(&self, grid: &Grid, player: Pos, dir: Dir) -> i64 {
        let Some(target) = grid.step(self.pos, dir) else {
            return i64::MIN;
        };

        let mut score = target.squared_distance(player) * DISTANCE_WEIGHT;

        let (mx, my) = dir.delta();
        let threat_x = self.pos.x as i64 - player.x as i64;
        let threat_y = self.pos.y as i64 - player.y as i64;
        let dot = mx as i64 * threat_x + my as i64 * threat_y;
        if dot > 0 {
            score += FLEE_BONUS;
        } else if dot < 0 {
            score += APPROACH_PENALTY;
        }

        let exits = grid.exits(target);
        score += exits as i64 * EXIT_BONUS;

        if self.last_pos == Some(target) {
            score += BACKTRACK_PENALTY;
        }
        if exits <= 1 {
            score += DEAD_END_PENALTY;
        }
        score
    }

    pub fn step(&mut self, grid: &Grid, dir: Dir) {
        if let Some(next) = grid.step(self.pos, dir) {
            self.last_pos = Some(self.pos);
            self.pos = next;
        }
    }

    pub fn take_turn(&mut self, grid: &Grid, player: Pos) -> Option<Dir> {
        let dir = self.decide(grid, player)?;
        self.step(grid, dir);
        tracing::debug!(?dir, x = self.pos.x, y = self.pos.y, "agent moved");
        Some(dir)
    }
}
