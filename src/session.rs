//! One game from maze generation to win or time-up. Restarting builds a
//! fresh session in place; nothing is shared between sessions.

use anyhow::{ensure, Result};
use rand::Rng;
use std::time::Duration;
use tracing::info;

use crate::assets::Preload;
use crate::camera::Camera;
use crate::components::{Cell, Collectible, Player, Vec2};
use crate::config::GameConfig;
use crate::maze::{generate_maze, Maze};
use crate::navigation::{NavEvent, NavState, Navigator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Won,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Collected,
    WinBlocked,
    Won,
    TimeUp,
}

impl From<NavEvent> for GameEvent {
    fn from(event: NavEvent) -> Self {
        match event {
            NavEvent::Collected => GameEvent::Collected,
            NavEvent::WinBlocked => GameEvent::WinBlocked,
            NavEvent::Won => GameEvent::Won,
        }
    }
}

/// Per-frame view for the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub player: Player,
    pub camera: Camera,
    pub collectible: Option<Collectible>,
    pub start: Cell,
    pub end: Cell,
    pub status: Status,
    pub nav_state: NavState,
    pub frozen: bool,
    pub elapsed: Duration,
}

pub struct Session {
    config: GameConfig,
    maze: Maze,
    nav: Navigator,
    status: Status,
    elapsed: Duration,
}

impl Session {
    /// Validates `config` and refuses to start while any asset is pending.
    pub fn start(config: GameConfig, preload: &Preload, rng: &mut impl Rng) -> Result<Self> {
        config.validate()?;
        ensure!(
            preload.is_ready(),
            "assets not ready, still waiting on {:?}",
            preload.pending()
        );
        Ok(Self::build(config, rng))
    }

    fn build(config: GameConfig, rng: &mut impl Rng) -> Self {
        let maze = generate_maze(rng, config.maze_width, config.maze_height, config.braid);
        let collectible = if config.collectible {
            maze.random_free_cell(rng).map(|cell| {
                Collectible::new(
                    maze.cell_center(cell, config.cell_size),
                    config.collectible_radius,
                )
            })
        } else {
            None
        };
        let nav = Navigator::new(&maze, &config, collectible);
        info!(
            cols = maze.cols(),
            rows = maze.rows(),
            collectible = collectible.is_some(),
            "session started"
        );
        Self {
            config,
            maze,
            nav,
            status: Status::Running,
            elapsed: Duration::ZERO,
        }
    }

    /// New maze, same configuration.
    pub fn restart(&mut self, rng: &mut impl Rng) {
        *self = Self::build(self.config.clone(), rng);
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.config
            .time_limit
            .map(|limit| limit.saturating_sub(self.elapsed))
    }

    pub fn start_follow(&mut self, pos: Vec2) -> bool {
        self.status == Status::Running && self.nav.start_follow(pos)
    }

    pub fn update_follow(&mut self, pos: Vec2) {
        self.nav.update_follow(pos);
    }

    pub fn stop_follow(&mut self) {
        self.nav.stop_follow();
    }

    pub fn set_frozen(&mut self, frozen: bool) {
        self.nav.set_frozen(frozen);
    }

    pub fn is_frozen(&self) -> bool {
        self.nav.is_frozen()
    }

    /// Advances one frame. `dt` only feeds the clock; movement is a fixed
    /// step per call. Time keeps running while frozen.
    pub fn tick(&mut self, dt: Duration) -> Vec<GameEvent> {
        if self.status != Status::Running {
            return Vec::new();
        }
        self.elapsed += dt;

        let mut events: Vec<GameEvent> = self
            .nav
            .tick(&self.maze)
            .into_iter()
            .map(GameEvent::from)
            .collect();

        if self.nav.has_won() {
            self.status = Status::Won;
            info!(elapsed_ms = self.elapsed.as_millis() as u64, "maze solved");
        } else if self
            .config
            .time_limit
            .is_some_and(|limit| self.elapsed >= limit)
        {
            self.status = Status::GameOver;
            self.nav.stop_follow();
            events.push(GameEvent::TimeUp);
            info!(elapsed_ms = self.elapsed.as_millis() as u64, "time is up");
        }
        events
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            player: *self.nav.player(),
            camera: *self.nav.camera(),
            collectible: self.nav.collectible().copied(),
            start: self.maze.start(),
            end: self.maze.end(),
            status: self.status,
            nav_state: self.nav.state(),
            frozen: self.nav.is_frozen(),
            elapsed: self.elapsed,
        }
    }
}
