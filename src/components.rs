#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Floor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn squared_distance(self, other: Pos) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx * dx + dy * dy
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    /// Enumeration order used wherever ties are broken.
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

/// Wall/floor occupancy table indexed `[row][col]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn filled(width: usize, height: usize, cell: Cell) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![cell; width]; height],
        }
    }

    /// Builds a grid from rows of text: `#` is a wall, anything else is floor.
    /// Rows shorter than the first are padded with walls.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut grid = Self::filled(width, height, Cell::Wall);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().take(width).enumerate() {
                if ch != '#' {
                    grid.cells[y][x] = Cell::Floor;
                }
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    pub fn get(&self, pos: Pos) -> Option<Cell> {
        self.cells.get(pos.y).and_then(|row| row.get(pos.x)).copied()
    }

    pub fn set(&mut self, pos: Pos, cell: Cell) {
        self.cells[pos.y][pos.x] = cell;
    }

    pub fn is_floor(&self, pos: Pos) -> bool {
        self.get(pos) == Some(Cell::Floor)
    }

    /// Neighbour of `pos` in `dir`, or `None` when it falls off the grid.
    pub fn step(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let nx = pos.x as isize + dx;
        let ny = pos.y as isize + dy;
        if nx < 0 || ny < 0 {
            return None;
        }
        let (nx, ny) = (nx as usize, ny as usize);
        if nx >= self.width || ny >= self.height {
            return None;
        }
        Some(Pos { x: nx, y: ny })
    }

    pub fn can_move(&self, pos: Pos, dir: Dir) -> bool {
        self.step(pos, dir).is_some_and(|next| self.is_floor(next))
    }

    /// Legal moves from `pos` in enumeration order.
    pub fn legal_moves(&self, pos: Pos) -> Vec<Dir> {
        Dir::ALL
            .into_iter()
            .filter(|dir| self.can_move(pos, *dir))
            .collect()
    }

    pub fn exits(&self, pos: Pos) -> usize {
        Dir::ALL
            .into_iter()
            .filter(|dir| self.can_move(pos, *dir))
            .count()
    }

    pub fn floor_cells(&self) -> Vec<Pos> {
        let mut cells = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.cells[y][x] == Cell::Floor {
                    cells.push(Pos { x, y });
                }
            }
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_round_trips_walls_and_floors() {
        let grid = Grid::from_ascii(&["#####", "#. .#", "#####"]);
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.height(), 3);
        assert!(grid.is_floor(Pos::new(1, 1)));
        assert!(grid.is_floor(Pos::new(2, 1)));
        assert!(!grid.is_floor(Pos::new(0, 1)));
        assert_eq!(grid.floor_cells().len(), 3);
    }

    #[test]
    fn step_off_the_edge_is_none() {
        let grid = Grid::filled(3, 3, Cell::Floor);
        assert_eq!(grid.step(Pos::new(0, 0), Dir::Up), None);
        assert_eq!(grid.step(Pos::new(2, 2), Dir::Right), None);
        assert_eq!(grid.step(Pos::new(1, 1), Dir::Left), Some(Pos::new(0, 1)));
    }

    #[test]
    fn legal_moves_follow_enumeration_order() {
        let grid = Grid::from_ascii(&["#.#", "...", "#.#"]);
        assert_eq!(
            grid.legal_moves(Pos::new(1, 1)),
            vec![Dir::Up, Dir::Down, Dir::Left, Dir::Right]
        );
        assert_eq!(grid.exits(Pos::new(0, 1)), 1);
    }

    #[test]
    fn squared_distance_is_symmetric() {
        let a = Pos::new(1, 1);
        let b = Pos::new(4, 5);
        assert_eq!(a.squared_distance(b), 25);
        assert_eq!(b.squared_distance(a), 25);
    }
}
