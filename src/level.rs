use std::time::Duration;

use rand::Rng;

use crate::components::{Cell, Grid, Pos};
use crate::config::{ChaseConfig, MIN_DIMENSION};

pub const START: Pos = Pos::new(1, 1);

// Two-cell hops between rooms, in carving order: up, right, down, left.
const HOPS: [(isize, isize); 4] = [(0, -2), (2, 0), (0, 2), (-2, 0)];

/// Carves a perfect maze from `(1,1)` by randomized depth-first search, then
/// punches up to `extra_openings` random interior walls to add loops.
///
/// Panics if either dimension is even or smaller than 5.
pub fn generate(width: usize, height: usize, extra_openings: usize, rng: &mut impl Rng) -> Grid {
    assert!(
        width >= MIN_DIMENSION && height >= MIN_DIMENSION && width % 2 == 1 && height % 2 == 1,
        "maze dimensions must be odd and at least {MIN_DIMENSION}, got {width}x{height}"
    );

    let mut grid = Grid::filled(width, height, Cell::Wall);
    carve_tree(&mut grid, rng);
    let opened = open_extra_walls(&mut grid, extra_openings, rng);

    tracing::debug!(
        width,
        height,
        extra_openings,
        opened,
        floor = grid.floor_cells().len(),
        "generated maze"
    );
    grid
}

fn carve_tree(grid: &mut Grid, rng: &mut impl Rng) {
    let (width, height) = (grid.width() as isize, grid.height() as isize);
    let mut stack = vec![START];
    grid.set(START, Cell::Floor);

    while let Some(&current) = stack.last() {
        let mut neighbors = Vec::with_capacity(4);
        for (dx, dy) in HOPS {
            let nx = current.x as isize + dx;
            let ny = current.y as isize + dy;
            if nx <= 0 || ny <= 0 || nx >= width - 1 || ny >= height - 1 {
                continue;
            }
            let next = Pos::new(nx as usize, ny as usize);
            if !grid.is_floor(next) {
                neighbors.push((next, dx / 2, dy / 2));
            }
        }

        if neighbors.is_empty() {
            stack.pop();
            continue;
        }

        let (next, wx, wy) = neighbors[rng.gen_range(0..neighbors.len())];
        let between = Pos::new(
            (current.x as isize + wx) as usize,
            (current.y as isize + wy) as usize,
        );
        grid.set(between, Cell::Floor);
        grid.set(next, Cell::Floor);
        stack.push(next);
    }
}

// Picks are never re-rolled, so fewer cells may open than asked. A pick with
// no floor neighbour (a pillar between four closed walls) stays a wall,
// otherwise it would be an unreachable island.
fn open_extra_walls(grid: &mut Grid, attempts: usize, rng: &mut impl Rng) -> usize {
    let mut opened = 0;
    for _ in 0..attempts {
        let pos = Pos::new(
            rng.gen_range(1..grid.width() - 1),
            rng.gen_range(1..grid.height() - 1),
        );
        if !grid.is_floor(pos) && grid.exits(pos) > 0 {
            grid.set(pos, Cell::Floor);
            opened += 1;
        }
    }
    opened
}

/// Where the agent spawns: the room in the far corner from [`START`].
pub fn far_corner(grid: &Grid) -> Pos {
    Pos::new(grid.width() - 2, grid.height() - 2)
}

pub fn extra_openings(config: &ChaseConfig, round: u32) -> usize {
    config.base_extra_openings + config.extra_openings_per_round * round as usize
}

pub fn move_interval(config: &ChaseConfig, round: u32) -> Duration {
    config
        .base_move_interval
        .saturating_sub(config.move_interval_decrement * round)
        .max(config.min_move_interval)
}
