//! Drag-to-move navigation: the player seeks a target point at a fixed
//! step per tick, sliding along walls by resolving each axis separately.

use tracing::{debug, info};

use crate::camera::Camera;
use crate::collision::circle_hits_wall;
use crate::components::{Cell, Collectible, Player, Vec2};
use crate::config::GameConfig;
use crate::maze::Maze;

// Closer than this the player counts as standing on the target.
const ARRIVE_DISTANCE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Idle,
    Seeking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    Collected,
    /// End cell reached while the collectible is still out.
    WinBlocked,
    Won,
}

#[derive(Debug, Clone)]
pub struct Navigator {
    player: Player,
    target: Vec2,
    following: bool,
    frozen: bool,
    won: bool,
    on_end: bool,
    camera: Camera,
    world: Vec2,
    end: Cell,
    collectible: Option<Collectible>,
    cell_size: f32,
    speed: f32,
    capture_radius: f32,
}

impl Navigator {
    /// Places the player at the center of the maze's start cell.
    pub fn new(maze: &Maze, config: &GameConfig, collectible: Option<Collectible>) -> Self {
        let pos = maze.cell_center(maze.start(), config.cell_size);
        let world = maze.world_size(config.cell_size);
        let mut camera = Camera::new(config.viewport);
        camera.follow(pos, world);
        Self {
            player: Player {
                pos,
                radius: config.player_radius,
            },
            target: pos,
            following: false,
            frozen: false,
            won: false,
            on_end: false,
            camera,
            world,
            end: maze.end(),
            collectible,
            cell_size: config.cell_size,
            speed: config.speed,
            capture_radius: config.capture_radius(),
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn world_size(&self) -> Vec2 {
        self.world
    }

    pub fn collectible(&self) -> Option<&Collectible> {
        self.collectible.as_ref()
    }

    pub fn state(&self) -> NavState {
        if self.following {
            NavState::Seeking
        } else {
            NavState::Idle
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn has_won(&self) -> bool {
        self.won
    }

    /// Grabs the player if `pos` lies within the capture radius of it.
    pub fn start_follow(&mut self, pos: Vec2) -> bool {
        if self.won || self.player.pos.distance(pos) >= self.capture_radius {
            return false;
        }
        self.following = true;
        self.target = pos;
        debug!(x = pos.x, y = pos.y, "follow started");
        true
    }

    pub fn update_follow(&mut self, pos: Vec2) {
        if self.following {
            self.target = pos;
        }
    }

    // The target is left as is; only start_follow re-enters seeking.
    pub fn stop_follow(&mut self) {
        if self.following {
            debug!("follow stopped");
        }
        self.following = false;
    }

    /// External pause, e.g. while a modal owns the screen. Can be held
    /// indefinitely.
    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    pub fn is_colliding(&self, maze: &Maze, pos: Vec2) -> bool {
        circle_hits_wall(maze, self.cell_size, pos, self.player.radius)
    }

    pub fn player_cell(&self, maze: &Maze) -> Option<Cell> {
        maze.cell_at(self.player.pos, self.cell_size)
    }

    /// One simulation step. Returns what happened as a result of the move.
    pub fn tick(&mut self, maze: &Maze) -> Vec<NavEvent> {
        let mut events = Vec::new();
        if !self.following || self.frozen || self.won {
            return events;
        }

        let delta = self.target - self.player.pos;
        let distance = delta.length();
        if distance <= ARRIVE_DISTANCE {
            return events;
        }
        let step = delta / distance * self.speed.min(distance);

        let mut moved = false;
        let next_x = Vec2::new(self.player.pos.x + step.x, self.player.pos.y);
        if !self.is_colliding(maze, next_x) {
            self.player.pos = next_x;
            moved = true;
        }
        let next_y = Vec2::new(self.player.pos.x, self.player.pos.y + step.y);
        if !self.is_colliding(maze, next_y) {
            self.player.pos = next_y;
            moved = true;
        }

        if moved {
            self.camera.follow(self.player.pos, self.world);
            if self.check_collectible() {
                events.push(NavEvent::Collected);
            }
            if let Some(event) = self.check_win(maze) {
                events.push(event);
            }
        }
        events
    }

    /// One-shot: true only on the tick the pickup happens.
    pub fn check_collectible(&mut self) -> bool {
        let Some(item) = self.collectible.as_mut() else {
            return false;
        };
        if item.collected || !item.touches(&self.player) {
            return false;
        }
        item.collected = true;
        info!(x = item.pos.x, y = item.pos.y, "collectible picked up");
        true
    }

    // Blocked wins fire once per visit to the end cell.
    fn check_win(&mut self, maze: &Maze) -> Option<NavEvent> {
        if self.player_cell(maze) != Some(self.end) {
            self.on_end = false;
            return None;
        }
        let entered = !self.on_end;
        self.on_end = true;

        if self.collectible.is_some_and(|c| !c.collected) {
            return entered.then_some(NavEvent::WinBlocked);
        }
        self.won = true;
        self.following = false;
        info!(x = self.end.x, y = self.end.y, "end cell reached");
        Some(NavEvent::Won)
    }

    #[cfg(test)]
    pub(crate) fn place_player(&mut self, pos: Vec2) {
        self.player.pos = pos;
        self.target = pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL: f32 = 40.0;

    fn config() -> GameConfig {
        GameConfig {
            viewport: Vec2::new(200.0, 120.0),
            ..GameConfig::with_cell_size(CELL)
        }
    }

    fn corridor() -> Maze {
        Maze::from_rows(&["#######", "#.....#", "#######"])
    }

    fn room() -> Maze {
        Maze::from_rows(&[
            "#######", //
            "#.....#",
            "#.....#",
            "#.....#",
            "#######",
        ])
    }

    fn run(nav: &mut Navigator, maze: &Maze, ticks: usize) -> Vec<NavEvent> {
        (0..ticks).flat_map(|_| nav.tick(maze)).collect()
    }

    #[test]
    fn capture_radius_gates_follow() {
        let maze = room();
        let config = GameConfig {
            player_radius: 13.3,
            ..config()
        };
        let mut nav = Navigator::new(&maze, &config, None);
        nav.place_player(Vec2::new(100.0, 100.0));

        assert!(!nav.start_follow(Vec2::new(130.0, 100.0)));
        assert_eq!(nav.state(), NavState::Idle);

        assert!(nav.start_follow(Vec2::new(126.0, 100.0)));
        assert_eq!(nav.state(), NavState::Seeking);
        assert_eq!(nav.target(), Vec2::new(126.0, 100.0));
    }

    #[test]
    fn update_only_applies_while_following() {
        let maze = room();
        let mut nav = Navigator::new(&maze, &config(), None);
        let start = nav.player().pos;
        nav.update_follow(Vec2::new(200.0, 100.0));
        assert_eq!(nav.target(), start);

        assert!(nav.start_follow(start));
        nav.update_follow(Vec2::new(200.0, 100.0));
        assert_eq!(nav.target(), Vec2::new(200.0, 100.0));

        nav.stop_follow();
        assert_eq!(nav.state(), NavState::Idle);
        // Stale target is kept but ignored.
        assert_eq!(nav.target(), Vec2::new(200.0, 100.0));
        assert!(run(&mut nav, &maze, 5).is_empty());
        assert_eq!(nav.player().pos, start);
    }

    #[test]
    fn step_is_capped_by_speed_and_distance() {
        let maze = room();
        let mut nav = Navigator::new(&maze, &config(), None);
        let start = nav.player().pos;
        assert!(nav.start_follow(start));
        nav.update_follow(start + Vec2::new(25.0, 0.0));

        nav.tick(&maze);
        assert_eq!(nav.player().pos, start + Vec2::new(10.0, 0.0));
        nav.tick(&maze);
        nav.tick(&maze);
        assert_eq!(nav.player().pos, start + Vec2::new(25.0, 0.0));
        // Arrived: further ticks leave it in place and still seeking.
        nav.tick(&maze);
        assert_eq!(nav.player().pos, start + Vec2::new(25.0, 0.0));
        assert_eq!(nav.state(), NavState::Seeking);
    }

    #[test]
    fn fastest_valid_speed_cannot_skip_a_wall() {
        let maze = Maze::from_rows(&["#####", "#.#.#", "#####"]);
        let config = GameConfig {
            speed: CELL - 1.0,
            ..config()
        };
        config.validate().unwrap();
        let mut nav = Navigator::new(&maze, &config, None);
        let start = nav.player().pos;
        assert!(nav.start_follow(start));
        nav.update_follow(Vec2::new(140.0, 60.0));

        run(&mut nav, &maze, 5);
        assert_eq!(nav.player().pos, start);
        assert_eq!(nav.player_cell(&maze), Some(Cell::new(1, 1)));
    }

    #[test]
    fn within_one_pixel_counts_as_arrived() {
        let maze = room();
        let mut nav = Navigator::new(&maze, &config(), None);
        let start = nav.player().pos;
        assert!(nav.start_follow(start));
        nav.update_follow(start + Vec2::new(0.8, 0.0));
        nav.tick(&maze);
        assert_eq!(nav.player().pos, start);
    }

    #[test]
    fn slides_along_wall_when_one_axis_is_blocked() {
        let maze = corridor();
        let mut nav = Navigator::new(&maze, &config(), None);
        let start = Vec2::new(60.0, 66.0);
        nav.place_player(start);
        assert!(nav.start_follow(start));
        nav.update_follow(Vec2::new(100.0, 106.0));

        nav.tick(&maze);
        let pos = nav.player().pos;
        assert!((pos.x - (60.0 + 40.0 / 56.5685 * 10.0)).abs() < 1e-3, "{pos:?}");
        assert_eq!(pos.y, 66.0);
        assert!(!nav.is_colliding(&maze, pos));
    }

    #[test]
    fn diagonal_drag_ends_hugging_the_wall() {
        let maze = corridor();
        let mut nav = Navigator::new(&maze, &config(), None);
        let start = nav.player().pos;
        assert!(nav.start_follow(start));
        nav.update_follow(Vec2::new(180.0, 110.0));
        run(&mut nav, &maze, 60);

        let pos = nav.player().pos;
        assert!((pos.x - 180.0).abs() < 1.0, "{pos:?}");
        assert!(pos.y < 80.0 - nav.player().radius + 1e-3, "{pos:?}");
        assert!(!nav.is_colliding(&maze, pos));
    }

    #[test]
    fn boxed_in_player_does_not_move() {
        let maze = Maze::from_rows(&["###", "#.#", "###"]);
        let mut nav = Navigator::new(&maze, &config(), None);
        let start = nav.player().pos;
        let camera = *nav.camera();
        assert!(nav.start_follow(start));
        nav.update_follow(Vec2::new(200.0, 200.0));
        assert!(run(&mut nav, &maze, 10).is_empty());
        assert_eq!(nav.player().pos, start);
        assert_eq!(*nav.camera(), camera);
    }

    #[test]
    fn frozen_skips_ticks() {
        let maze = room();
        let mut nav = Navigator::new(&maze, &config(), None);
        let start = nav.player().pos;
        assert!(nav.start_follow(start));
        nav.update_follow(start + Vec2::new(40.0, 0.0));
        nav.set_frozen(true);
        run(&mut nav, &maze, 100);
        assert_eq!(nav.player().pos, start);
        assert_eq!(nav.state(), NavState::Seeking);

        nav.set_frozen(false);
        nav.tick(&maze);
        assert_eq!(nav.player().pos, start + Vec2::new(10.0, 0.0));
    }

    #[test]
    fn camera_tracks_and_stays_clamped() {
        let maze = room();
        let mut nav = Navigator::new(&maze, &config(), None);
        assert_eq!(nav.camera().offset, Vec2::ZERO);
        let start = nav.player().pos;
        assert!(nav.start_follow(start));
        nav.update_follow(Vec2::new(210.0, 100.0));
        for _ in 0..40 {
            nav.tick(&maze);
            let offset = nav.camera().offset;
            assert!(offset.x >= 0.0 && offset.x <= 280.0 - 200.0, "{offset:?}");
            assert!(offset.y >= 0.0 && offset.y <= 200.0 - 120.0, "{offset:?}");
        }
        let offset = nav.camera().offset;
        assert_eq!(offset.x, 80.0);
        assert!((offset.y - 40.0).abs() < 1e-3, "{offset:?}");
    }

    #[test]
    fn reaching_end_without_collectible_wins() {
        let maze = corridor();
        let mut nav = Navigator::new(&maze, &config(), None);
        let start = nav.player().pos;
        assert!(nav.start_follow(start));
        nav.update_follow(Vec2::new(220.0, 60.0));
        let events = run(&mut nav, &maze, 30);
        assert_eq!(events, vec![NavEvent::Won]);
        assert!(nav.has_won());
        assert_eq!(nav.state(), NavState::Idle);
        assert!(!nav.start_follow(nav.player().pos));
    }

    #[test]
    fn end_is_blocked_until_collected() {
        let maze = corridor();
        let item = Collectible::new(Vec2::new(140.0, 60.0), 10.0);
        let mut nav = Navigator::new(&maze, &config(), Some(item));

        // Jump past the collectible straight to the end cell.
        nav.place_player(Vec2::new(200.0, 60.0));
        assert!(nav.start_follow(Vec2::new(200.0, 60.0)));
        nav.update_follow(Vec2::new(225.0, 60.0));
        let events = run(&mut nav, &maze, 5);
        assert_eq!(events, vec![NavEvent::WinBlocked]);
        assert!(!nav.has_won());
        assert_eq!(nav.state(), NavState::Seeking);

        // Walk back over the collectible and return.
        nav.update_follow(Vec2::new(100.0, 60.0));
        let events = run(&mut nav, &maze, 20);
        assert_eq!(events, vec![NavEvent::Collected]);
        assert!(nav.collectible().is_some_and(|c| c.collected));

        nav.update_follow(Vec2::new(220.0, 60.0));
        let events = run(&mut nav, &maze, 20);
        assert_eq!(events, vec![NavEvent::Won]);
    }

    #[test]
    fn blocked_win_fires_once_per_visit() {
        let maze = corridor();
        let item = Collectible::new(Vec2::new(60.0, 60.0), 1.0);
        let mut nav = Navigator::new(&maze, &config(), Some(item));
        nav.place_player(Vec2::new(170.0, 60.0));
        assert!(nav.start_follow(Vec2::new(170.0, 60.0)));

        // Wander around inside the end cell.
        let mut wander = Vec::new();
        for x in [205.0, 215.0, 210.0, 220.0] {
            nav.update_follow(Vec2::new(x, 60.0));
            wander.extend(run(&mut nav, &maze, 3));
        }
        assert_eq!(wander, vec![NavEvent::WinBlocked]);
        nav.update_follow(Vec2::new(170.0, 60.0));
        let leave = run(&mut nav, &maze, 10);
        assert!(leave.is_empty());

        nav.update_follow(Vec2::new(210.0, 60.0));
        let back = run(&mut nav, &maze, 10);
        assert_eq!(back, vec![NavEvent::WinBlocked]);
    }

    #[test]
    fn collectible_pickup_is_idempotent() {
        let maze = room();
        let item = Collectible::new(Vec2::new(100.0, 60.0), 10.0);
        let mut nav = Navigator::new(&maze, &config(), Some(item));
        nav.place_player(Vec2::new(100.0, 60.0));
        assert!(nav.check_collectible());
        assert!(!nav.check_collectible());
        assert!(!nav.check_collectible());
    }
}
