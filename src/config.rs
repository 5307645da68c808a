use anyhow::{ensure, Result};
use std::time::Duration;

use crate::components::Vec2;
use crate::maze::DEFAULT_BRAID;

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_MAZE_W: usize = 20;
pub const DEFAULT_MAZE_H: usize = 14;
pub const DEFAULT_CELL_SIZE: f32 = 40.0;
pub const DEFAULT_SPEED: f32 = 10.0;
pub const DEFAULT_CAPTURE_MULTIPLIER: f32 = 2.0;
pub const DEFAULT_VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

// ============================================================================
// Session Configuration
// ============================================================================

/// Everything a session needs at start. Sizes are in world pixels,
/// `speed` is pixels per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub maze_width: usize,
    pub maze_height: usize,
    pub braid: f64,
    pub cell_size: f32,
    pub speed: f32,
    pub player_radius: f32,
    pub collectible_radius: f32,
    pub capture_multiplier: f32,
    pub viewport: Vec2,
    pub collectible: bool,
    pub time_limit: Option<Duration>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::with_cell_size(DEFAULT_CELL_SIZE)
    }
}

impl GameConfig {
    /// Defaults with radii derived from `cell_size` (player a third of a
    /// cell, collectible a quarter).
    pub fn with_cell_size(cell_size: f32) -> Self {
        Self {
            maze_width: DEFAULT_MAZE_W,
            maze_height: DEFAULT_MAZE_H,
            braid: DEFAULT_BRAID,
            cell_size,
            speed: DEFAULT_SPEED,
            player_radius: cell_size / 3.0,
            collectible_radius: cell_size / 4.0,
            capture_multiplier: DEFAULT_CAPTURE_MULTIPLIER,
            viewport: DEFAULT_VIEWPORT,
            collectible: true,
            time_limit: None,
        }
    }

    pub fn capture_radius(&self) -> f32 {
        self.player_radius * self.capture_multiplier
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.maze_width > 0 && self.maze_height > 0,
            "maze dimensions must be positive, got {}x{}",
            self.maze_width,
            self.maze_height
        );
        ensure!(
            (0.0..=1.0).contains(&self.braid),
            "braid probability must be within [0, 1], got {}",
            self.braid
        );
        for (name, value) in [
            ("cell size", self.cell_size),
            ("speed", self.speed),
            ("player radius", self.player_radius),
            ("collectible radius", self.collectible_radius),
            ("capture multiplier", self.capture_multiplier),
            ("viewport width", self.viewport.x),
            ("viewport height", self.viewport.y),
        ] {
            ensure!(value.is_finite() && value > 0.0, "{name} must be positive, got {value}");
        }
        // Collision is only tested at the destination of each step, so a
        // step as long as a wall cell could skip over it.
        ensure!(
            self.speed < self.cell_size,
            "speed {} must be below the cell size {}",
            self.speed,
            self.cell_size
        );
        ensure!(
            self.player_radius * 2.0 < self.cell_size,
            "player radius {} does not fit in a {} px corridor",
            self.player_radius,
            self.cell_size
        );
        Ok(())
    }
}
