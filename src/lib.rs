//! Drag-to-navigate maze game core.
//!
//! - `maze`: randomized depth-first carving with braiding
//! - `navigation`: follow state machine, sliding movement, win checks
//! - `collision`: circle vs. wall-cell overlap
//! - `camera`: viewport clamping
//! - `session`: one owned game, from start to win or time-up

pub mod assets;
pub mod camera;
pub mod collision;
pub mod components;
pub mod config;
pub mod maze;
pub mod navigation;
pub mod session;

pub use assets::Preload;
pub use components::{Cell, Collectible, Player, Tile, Vec2};
pub use config::GameConfig;
pub use maze::{generate_maze, Maze};
pub use navigation::{NavEvent, NavState, Navigator};
pub use session::{GameEvent, Session, Snapshot, Status};
