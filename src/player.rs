use std::time::Duration;

use crate::components::{Dir, Grid, Pos};

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub pos: Pos,
    /// Direction of the step in progress, if any.
    pub current: Option<Dir>,
    /// Fraction of the current step covered, in `[0, 1)`.
    pub progress: f32,
    /// Buffered request, adopted when the current step lands.
    pub next: Option<Dir>,
    /// Cells per second.
    pub speed: f32,
}

impl Player {
    pub fn new(pos: Pos, speed: f32) -> Self {
        Self {
            pos,
            current: None,
            progress: 0.0,
            next: None,
            speed,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.current.is_none()
    }

    /// Buffers a direction. When settled, a request into a wall is dropped.
    /// Mid-step requests are checked against the cell the step lands on.
    pub fn request_direction(&mut self, dir: Dir, grid: &Grid) {
        if self.is_settled() && !grid.can_move(self.pos, dir) {
            return;
        }
        self.next = Some(dir);
    }

    /// Moves the player along by `dt`. Returns the new cell when a step lands.
    pub fn advance(&mut self, dt: Duration, grid: &Grid) -> Option<Pos> {
        if self.current.is_none() {
            if let Some(dir) = self.next.filter(|d| grid.can_move(self.pos, *d)) {
                self.current = Some(dir);
                self.progress = 0.0;
            }
        }

        let dir = self.current?;
        self.progress += self.speed * dt.as_secs_f32();
        if self.progress < 1.0 {
            return None;
        }

        // Overshoot past the cell is dropped.
        self.progress = 0.0;
        self.current = None;
        if let Some(next) = grid.step(self.pos, dir) {
            self.pos = next;
        }
        match self.next {
            Some(buffered) if grid.can_move(self.pos, buffered) => self.current = Some(buffered),
            _ => self.next = None,
        }
        Some(self.pos)
    }

    /// Interpolated `(x, y)` in cell units.
    pub fn continuous_pos(&self) -> (f32, f32) {
        let (x, y) = (self.pos.x as f32, self.pos.y as f32);
        match self.current {
            Some(dir) => {
                let (dx, dy) = dir.delta();
                (x + dx as f32 * self.progress, y + dy as f32 * self.progress)
            }
            None => (x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> Grid {
        Grid::from_ascii(&["#######", "#.....#", "#.#####", "#######"])
    }

    #[test]
    fn request_into_wall_is_dropped() {
        let grid = corridor();
        let mut player = Player::new(Pos::new(1, 1), 7.0);
        player.request_direction(Dir::Up, &grid);
        assert_eq!(player.next, None);
        assert_eq!(player.advance(Duration::from_millis(500), &grid), None);
        assert_eq!(player.pos, Pos::new(1, 1));
        assert!(player.is_settled());
    }

    #[test]
    fn wall_request_keeps_existing_buffer() {
        let grid = corridor();
        let mut player = Player::new(Pos::new(1, 1), 7.0);
        player.next = Some(Dir::Right);
        player.request_direction(Dir::Left, &grid);
        assert_eq!(player.next, Some(Dir::Right));
    }

    #[test]
    fn interpolates_then_lands() {
        let grid = corridor();
        let mut player = Player::new(Pos::new(1, 1), 2.0);
        player.request_direction(Dir::Right, &grid);
        assert_eq!(player.advance(Duration::from_millis(250), &grid), None);
        let (x, y) = player.continuous_pos();
        assert!((x - 1.5).abs() < 1e-4);
        assert!((y - 1.0).abs() < 1e-4);

        assert_eq!(player.advance(Duration::from_millis(250), &grid), Some(Pos::new(2, 1)));
        assert_eq!(player.progress, 0.0);
        // Still holding right, so the next step chains without a pause.
        assert_eq!(player.current, Some(Dir::Right));
    }

    #[test]
    fn buffer_clears_at_the_end_of_a_corridor() {
        let grid = corridor();
        let mut player = Player::new(Pos::new(4, 1), 10.0);
        player.request_direction(Dir::Right, &grid);
        assert_eq!(player.advance(Duration::from_millis(100), &grid), Some(Pos::new(5, 1)));
        assert_eq!(player.current, None);
        assert_eq!(player.next, None);
        assert_eq!(player.advance(Duration::from_millis(100), &grid), None);
        assert_eq!(player.pos, Pos::new(5, 1));
    }

    #[test]
    fn turn_requested_mid_step_is_taken_at_the_junction() {
        let grid = corridor();
        let mut player = Player::new(Pos::new(2, 1), 10.0);
        player.request_direction(Dir::Left, &grid);
        player.advance(Duration::from_millis(50), &grid);
        player.request_direction(Dir::Down, &grid);
        assert_eq!(player.advance(Duration::from_millis(50), &grid), Some(Pos::new(1, 1)));
        assert_eq!(player.current, Some(Dir::Down));
    }

    #[test]
    fn overshoot_does_not_skip_cells() {
        let grid = corridor();
        let mut player = Player::new(Pos::new(1, 1), 7.0);
        player.request_direction(Dir::Right, &grid);
        assert_eq!(player.advance(Duration::from_secs(2), &grid), Some(Pos::new(2, 1)));
    }
}
