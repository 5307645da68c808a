use crate::components::{Tile, Vec2};
use crate::maze::Maze;

/// Exact circle vs. wall-cell overlap.
///
/// Only cells under the circle's bounding box are visited. For each wall
/// cell the closest point of its square to `center` is found by clamping,
/// and the circle collides when that point lies strictly inside the radius.
/// Cells outside the grid never collide.
pub fn circle_hits_wall(maze: &Maze, cell_size: f32, center: Vec2, radius: f32) -> bool {
    let last_col = maze.cols() as i64 - 1;
    let last_row = maze.rows() as i64 - 1;
    let start_col = (((center.x - radius) / cell_size).floor() as i64).max(0);
    let end_col = (((center.x + radius) / cell_size).floor() as i64).min(last_col);
    let start_row = (((center.y - radius) / cell_size).floor() as i64).max(0);
    let end_row = (((center.y + radius) / cell_size).floor() as i64).min(last_row);

    for y in start_row..=end_row {
        for x in start_col..=end_col {
            if maze.tile_at(x, y) != Some(Tile::Wall) {
                continue;
            }
            let wall_x = x as f32 * cell_size;
            let wall_y = y as f32 * cell_size;
            let closest = Vec2::new(
                center.x.max(wall_x).min(wall_x + cell_size),
                center.y.max(wall_y).min(wall_y + cell_size),
            );
            if center.distance_squared(closest) < radius * radius {
                return true;
            }
        }
    }
    false
}
