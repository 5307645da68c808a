//! Maze generation: randomized depth-first carving over the odd-indexed
//! chambers, followed by an optional braiding pass that knocks out
//! redundant walls so the maze has loops.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;
use tracing::debug;

use crate::components::{Cell, Dir, Tile, Vec2};

pub const DEFAULT_BRAID: f64 = 0.15;

/// Occupancy grid of `(2 * height + 1)` rows by `(2 * width + 1)` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Maze {
    grid: Vec<Vec<Tile>>,
    cols: usize,
    rows: usize,
}

impl Maze {
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn start(&self) -> Cell {
        Cell::new(1, 1)
    }

    pub fn end(&self) -> Cell {
        Cell::new(self.cols - 2, self.rows - 2)
    }

    pub fn tile(&self, cell: Cell) -> Option<Tile> {
        self.grid.get(cell.y).and_then(|row| row.get(cell.x)).copied()
    }

    /// Signed lookup; anything outside the grid is `None`.
    pub fn tile_at(&self, x: i64, y: i64) -> Option<Tile> {
        if x < 0 || y < 0 {
            return None;
        }
        self.tile(Cell::new(x as usize, y as usize))
    }

    pub fn is_wall(&self, cell: Cell) -> bool {
        self.tile(cell) == Some(Tile::Wall)
    }

    /// Odd/odd cells: the nodes the carving walks over.
    pub fn chambers(&self) -> impl Iterator<Item = Cell> + '_ {
        (1..self.rows)
            .step_by(2)
            .flat_map(move |y| (1..self.cols).step_by(2).map(move |x| Cell::new(x, y)))
    }

    pub fn path_cells(&self) -> Vec<Cell> {
        let mut cells = Vec::new();
        for (y, row) in self.grid.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                if *tile == Tile::Path {
                    cells.push(Cell::new(x, y));
                }
            }
        }
        cells
    }

    /// Uniform pick among path cells other than start and end.
    pub fn random_free_cell(&self, rng: &mut impl Rng) -> Option<Cell> {
        let start = self.start();
        let end = self.end();
        let candidates: Vec<Cell> = self
            .path_cells()
            .into_iter()
            .filter(|c| *c != start && *c != end)
            .collect();
        candidates.choose(rng).copied()
    }

    /// Breadth-first flood over path cells starting at `from`.
    pub fn reachable_from(&self, from: Cell) -> Vec<Vec<bool>> {
        let mut seen = vec![vec![false; self.cols]; self.rows];
        if self.tile(from) != Some(Tile::Path) {
            return seen;
        }
        let mut q = VecDeque::new();
        seen[from.y][from.x] = true;
        q.push_back(from);
        while let Some(pos) = q.pop_front() {
            for dir in Dir::ALL {
                let (dx, dy) = dir.delta();
                let nx = pos.x as i64 + dx as i64;
                let ny = pos.y as i64 + dy as i64;
                if self.tile_at(nx, ny) != Some(Tile::Path) {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                if seen[ny][nx] {
                    continue;
                }
                seen[ny][nx] = true;
                q.push_back(Cell::new(nx, ny));
            }
        }
        seen
    }

    pub fn world_size(&self, cell_size: f32) -> Vec2 {
        Vec2::new(self.cols as f32 * cell_size, self.rows as f32 * cell_size)
    }

    pub fn cell_center(&self, cell: Cell, cell_size: f32) -> Vec2 {
        Vec2::new(
            cell.x as f32 * cell_size + cell_size / 2.0,
            cell.y as f32 * cell_size + cell_size / 2.0,
        )
    }

    /// Grid cell containing a world position, or `None` outside the grid.
    pub fn cell_at(&self, pos: Vec2, cell_size: f32) -> Option<Cell> {
        let x = (pos.x / cell_size).floor() as i64;
        let y = (pos.y / cell_size).floor() as i64;
        self.tile_at(x, y).map(|_| Cell::new(x as usize, y as usize))
    }

    #[cfg(test)]
    pub(crate) fn from_rows(rows: &[&str]) -> Self {
        let grid: Vec<Vec<Tile>> = rows
            .iter()
            .map(|r| {
                r.chars()
                    .map(|c| if c == '#' { Tile::Wall } else { Tile::Path })
                    .collect()
            })
            .collect();
        let cols = grid.first().map_or(0, Vec::len);
        Self {
            rows: grid.len(),
            cols,
            grid,
        }
    }
}

/// Carves a `width` x `height` chamber maze. Zero dimensions are treated as 1.
pub fn generate_maze(rng: &mut impl Rng, width: usize, height: usize, braid: f64) -> Maze {
    let width = width.max(1);
    let height = height.max(1);
    let cols = width * 2 + 1;
    let rows = height * 2 + 1;
    let mut grid = vec![vec![Tile::Wall; cols]; rows];

    let start = Cell::new(1, 1);
    grid[start.y][start.x] = Tile::Path;
    let mut stack = vec![start];

    while let Some(&current) = stack.last() {
        let unvisited: Vec<Cell> = Dir::ALL
            .iter()
            .filter_map(|&dir| chamber_neighbor(current, dir, cols, rows))
            .filter(|n| grid[n.y][n.x] == Tile::Wall)
            .collect();

        match unvisited.choose(rng) {
            Some(&next) => {
                carve_between(&mut grid, current, next);
                grid[next.y][next.x] = Tile::Path;
                stack.push(next);
            }
            None => {
                stack.pop();
            }
        }
    }

    if braid > 0.0 {
        braid_maze(&mut grid, braid, rng);
    }

    let maze = Maze { grid, cols, rows };
    debug!(
        cols,
        rows,
        braid,
        paths = maze.path_cells().len(),
        "generated maze"
    );
    maze
}

fn chamber_neighbor(cell: Cell, dir: Dir, cols: usize, rows: usize) -> Option<Cell> {
    let (dx, dy) = dir.delta();
    let nx = cell.x as isize + dx * 2;
    let ny = cell.y as isize + dy * 2;
    if nx < 0 || ny < 0 || nx as usize >= cols || ny as usize >= rows {
        return None;
    }
    Some(Cell::new(nx as usize, ny as usize))
}

fn carve_between(grid: &mut [Vec<Tile>], from: Cell, to: Cell) {
    let wall_x = (from.x + to.x) / 2;
    let wall_y = (from.y + to.y) / 2;
    grid[wall_y][wall_x] = Tile::Path;
}

// Single row-major sweep; a wall opened earlier in the sweep can make a
// later cell eligible, but cells already passed are not revisited.
fn braid_maze(grid: &mut [Vec<Tile>], braid: f64, rng: &mut impl Rng) {
    let rows = grid.len();
    let cols = grid.first().map_or(0, Vec::len);
    if rows < 3 || cols < 3 {
        return;
    }
    for y in 1..rows - 1 {
        for x in 1..cols - 1 {
            if grid[y][x] != Tile::Wall {
                continue;
            }
            let horizontal = grid[y][x - 1] == Tile::Path && grid[y][x + 1] == Tile::Path;
            let vertical = grid[y - 1][x] == Tile::Path && grid[y + 1][x] == Tile::Path;
            if (horizontal || vertical) && rng.gen::<f64>() < braid {
                grid[y][x] = Tile::Path;
            }
        }
    }
}
