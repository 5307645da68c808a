use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{self, Stdout, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use maze_drag::camera::Camera;
use maze_drag::components::Dir;
use maze_drag::config::{DEFAULT_CELL_SIZE, DEFAULT_MAZE_H, DEFAULT_MAZE_W};
use maze_drag::maze::DEFAULT_BRAID;
use maze_drag::{Cell, GameConfig, GameEvent, Preload, Session, Snapshot, Status, Tile, Vec2};

const CELL_W: usize = 2;
const HUD_ROWS: u16 = 2;
const DEFAULT_TICK_MS: u64 = 16;
const DEFAULT_RENDER_FPS: u64 = 60;
const PLAYER_GLYPH: (&str, &str) = ("😃", "@@");
const ITEM_GLYPH: (&str, &str) = ("💎", "<>");

// ============================================================================
// CLI Argument Parsing
// ============================================================================

#[derive(Parser)]
#[command(author, version, about = "Drag the avatar out of a generated maze", long_about = None)]
struct Args {
    /// Maze width in chambers
    #[arg(long, default_value_t = DEFAULT_MAZE_W)]
    width: usize,

    /// Maze height in chambers
    #[arg(long, default_value_t = DEFAULT_MAZE_H)]
    height: usize,

    /// Chance of knocking out each redundant wall
    #[arg(long, default_value_t = DEFAULT_BRAID)]
    braid: f64,

    /// Simulation step in milliseconds
    #[arg(long, env = "MAZE_TICK_MS", default_value_t = DEFAULT_TICK_MS)]
    tick_ms: u64,

    /// Redraw rate
    #[arg(long, env = "MAZE_FPS", default_value_t = DEFAULT_RENDER_FPS)]
    fps: u64,

    /// Give up after this many seconds
    #[arg(long)]
    time_limit: Option<u64>,

    /// Play without the item that unlocks the exit
    #[arg(long, default_value_t = false)]
    no_collectible: bool,

    /// Use plain ASCII sprites
    #[arg(long, env = "MAZE_ASCII", default_value_t = false)]
    ascii: bool,

    #[arg(long)]
    seed: Option<u64>,

    /// Write logs here (filtered by RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// ============================================================================
// Rendering State
// ============================================================================

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Item,
    Wall,
    Empty,
    Start,
    End,
}

#[derive(Clone, Copy, PartialEq)]
struct ScreenCell {
    glyph: Glyph,
    color: Color,
}

struct Sprites {
    player: &'static str,
    item: &'static str,
}

struct Renderer {
    sprites: Sprites,
    view_cols: usize,
    view_rows: usize,
    last: Vec<ScreenCell>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    fn new(sprites: Sprites, view_cols: usize, view_rows: usize) -> Self {
        Self {
            sprites,
            view_cols,
            view_rows,
            last: vec![
                ScreenCell {
                    glyph: Glyph::Empty,
                    color: Color::Reset,
                };
                view_cols * view_rows
            ],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: HUD_ROWS,
        }
    }

    // Terminal position to world pixels. The drawing snaps the camera to
    // whole cells, so the mapping has to use the snapped offset too.
    fn screen_to_world(&self, session: &Session, column: u16, row: u16) -> Vec2 {
        let cell = session.config().cell_size;
        let maze = session.maze();
        let camera = session.navigator().camera();
        let (first, _) = camera.visible_cells(cell, maze.cols(), maze.rows());
        let snapped = Camera {
            offset: Vec2::new(first.x as f32, first.y as f32) * cell,
            ..*camera
        };
        let sx = f32::from(column) - f32::from(self.origin_x);
        let sy = f32::from(row) - f32::from(self.origin_y);
        let screen = Vec2::new(
            sx / CELL_W as f32 * cell + cell / (2.0 * CELL_W as f32),
            sy * cell + cell / 2.0,
        );
        snapped.screen_to_world(screen)
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        init_tracing(path)?;
    }

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &args);

    stdout.execute(Show)?;
    stdout.execute(DisableMouseCapture)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn init_tracing(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(stdout: &mut Stdout, args: &Args) -> Result<()> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (term_w, term_h) = terminal::size()?;
    let view_cols = (usize::from(term_w) / CELL_W).max(1);
    let view_rows = usize::from(term_h.saturating_sub(HUD_ROWS + 1)).max(1);

    let mut preload = Preload::new(["player", "item"]);
    let sprites = Sprites {
        player: load_sprite(&mut preload, "player", PLAYER_GLYPH, args.ascii),
        item: load_sprite(&mut preload, "item", ITEM_GLYPH, args.ascii),
    };

    let config = GameConfig {
        maze_width: args.width,
        maze_height: args.height,
        braid: args.braid,
        viewport: Vec2::new(
            view_cols as f32 * DEFAULT_CELL_SIZE,
            view_rows as f32 * DEFAULT_CELL_SIZE,
        ),
        collectible: !args.no_collectible,
        time_limit: args.time_limit.map(Duration::from_secs),
        ..GameConfig::with_cell_size(DEFAULT_CELL_SIZE)
    };
    let mut session = Session::start(config, &preload, &mut rng)?;
    let mut renderer = Renderer::new(sprites, view_cols, view_rows);
    let mut message = String::from("Grab the avatar with the mouse or use the arrow keys.");

    let tick_time = Duration::from_millis(args.tick_ms.max(1));
    let frame_time = Duration::from_micros(1_000_000 / args.fps.max(1));
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) => {
                    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                        continue;
                    }
                    match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Char('r') => {
                            // The old session is dropped before the next tick.
                            session.restart(&mut rng);
                            last_tick = Instant::now();
                            renderer.needs_full = true;
                            message = String::from("New maze.");
                        }
                        KeyCode::Char('p') => {
                            let frozen = !session.is_frozen();
                            session.set_frozen(frozen);
                            message = if frozen { "Paused." } else { "Resumed." }.to_string();
                        }
                        KeyCode::Esc | KeyCode::Char(' ') => session.stop_follow(),
                        KeyCode::Up | KeyCode::Char('k') => nudge(&mut session, Dir::Up),
                        KeyCode::Down | KeyCode::Char('j') => nudge(&mut session, Dir::Down),
                        KeyCode::Left | KeyCode::Char('h') => nudge(&mut session, Dir::Left),
                        KeyCode::Right | KeyCode::Char('l') => nudge(&mut session, Dir::Right),
                        _ => {}
                    }
                }
                Event::Mouse(mouse) => handle_mouse(&mut session, &renderer, mouse),
                Event::Resize(..) => renderer.needs_full = true,
                _ => {}
            }
        }

        let since_tick = last_tick.elapsed();
        if since_tick >= tick_time {
            last_tick = Instant::now();
            for ev in session.tick(since_tick) {
                message = describe(ev, &session);
            }
        }
        render(stdout, &session, &mut renderer, &message)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn load_sprite(
    preload: &mut Preload,
    key: &str,
    (fancy, plain): (&'static str, &'static str),
    ascii: bool,
) -> &'static str {
    if !ascii && UnicodeWidthStr::width(fancy) == CELL_W {
        preload.loaded(key);
        fancy
    } else {
        preload.failed(key);
        plain
    }
}

fn handle_mouse(session: &mut Session, renderer: &Renderer, mouse: MouseEvent) {
    let pos = renderer.screen_to_world(session, mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            session.start_follow(pos);
        }
        MouseEventKind::Drag(MouseButton::Left) => session.update_follow(pos),
        MouseEventKind::Up(MouseButton::Left) => session.stop_follow(),
        _ => {}
    }
}

// Keyboard stand-in for a drag: grab the avatar and pull it one cell over.
fn nudge(session: &mut Session, dir: Dir) {
    let pos = session.navigator().player().pos;
    let (dx, dy) = dir.delta();
    let step = Vec2::new(dx as f32, dy as f32) * session.config().cell_size;
    if session.start_follow(pos) {
        session.update_follow(pos + step);
    }
}

fn describe(event: GameEvent, session: &Session) -> String {
    match event {
        GameEvent::Collected => "Got it! Now find the exit.".to_string(),
        GameEvent::WinBlocked => "The exit is locked. Find the item first.".to_string(),
        GameEvent::Won => format!(
            "You made it out in {:.1}s! (r to play again)",
            session.elapsed().as_secs_f32()
        ),
        GameEvent::TimeUp => "Time is up. (r to try again)".to_string(),
    }
}

// ============================================================================
// Drawing
// ============================================================================

fn render(stdout: &mut Stdout, session: &Session, renderer: &mut Renderer, message: &str) -> io::Result<()> {
    let needed_w = (renderer.view_cols * CELL_W) as u16;
    let needed_h = renderer.view_rows as u16 + HUD_ROWS;

    stdout.queue(MoveTo(0, 0))?;
    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }
    if renderer.needs_full {
        stdout.queue(Clear(ClearType::All))?;
    }

    let snap = session.snapshot();
    let hud = hud_line(&snap, session, renderer) + "\n" + message;
    if renderer.needs_full || hud != renderer.last_hud {
        for (i, line) in hud.lines().enumerate() {
            stdout.queue(MoveTo(renderer.origin_x, i as u16))?;
            stdout.queue(SetForegroundColor(Color::White))?;
            stdout.queue(Clear(ClearType::CurrentLine))?;
            stdout.queue(Print(fit_width(line, usize::from(term_w))))?;
            stdout.queue(ResetColor)?;
        }
        renderer.last_hud = hud;
    }

    let maze = session.maze();
    let cell_size = session.config().cell_size;
    let (first, _) = snap
        .camera
        .visible_cells(cell_size, maze.cols(), maze.rows());
    let player_cell = maze.cell_at(snap.player.pos, cell_size);
    let item_cell = snap
        .collectible
        .filter(|c| !c.collected)
        .and_then(|c| maze.cell_at(c.pos, cell_size));

    for sy in 0..renderer.view_rows {
        for sx in 0..renderer.view_cols {
            let pos = Cell::new(first.x + sx, first.y + sy);
            let cell = if Some(pos) == player_cell {
                ScreenCell { glyph: Glyph::Player, color: Color::Yellow }
            } else if Some(pos) == item_cell {
                ScreenCell { glyph: Glyph::Item, color: Color::Cyan }
            } else if pos == snap.start {
                ScreenCell { glyph: Glyph::Start, color: Color::Green }
            } else if pos == snap.end {
                ScreenCell { glyph: Glyph::End, color: Color::Blue }
            } else {
                match maze.tile(pos) {
                    Some(Tile::Wall) => ScreenCell { glyph: Glyph::Wall, color: Color::DarkGrey },
                    Some(Tile::Path) | None => ScreenCell { glyph: Glyph::Empty, color: Color::Reset },
                }
            };
            let idx = sy * renderer.view_cols + sx;
            if renderer.needs_full || cell != renderer.last[idx] {
                renderer.last[idx] = cell;
                draw_cell(stdout, renderer, sx, sy, cell)?;
            }
        }
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

fn hud_line(snap: &Snapshot, session: &Session, renderer: &Renderer) -> String {
    let time = match session.remaining() {
        Some(left) => format!("Left: {:.1}s", left.as_secs_f32()),
        None => format!("Time: {:.1}s", snap.elapsed.as_secs_f32()),
    };
    let item = match snap.collectible {
        Some(c) if c.collected => format!("Item: {}", renderer.sprites.item),
        Some(_) => "Item: --".to_string(),
        None => String::new(),
    };
    let status = match (snap.status, snap.frozen) {
        (Status::Won, _) => "WON",
        (Status::GameOver, _) => "GAME OVER",
        (Status::Running, true) => "PAUSED",
        (Status::Running, false) => "",
    };
    format!("{time}  {item}  {status}  (drag {}, p pause, r restart, q quit)", renderer.sprites.player)
}

// A wrapped HUD line would spill into the maze rows, which are only
// redrawn where cells change.
fn fit_width(line: &str, width: usize) -> &str {
    let mut used = 0;
    for (i, ch) in line.char_indices() {
        used += UnicodeWidthChar::width(ch).unwrap_or(0);
        if used > width {
            return &line[..i];
        }
    }
    line
}

fn draw_cell(stdout: &mut Stdout, renderer: &Renderer, x: usize, y: usize, cell: ScreenCell) -> io::Result<()> {
    let text = match cell.glyph {
        Glyph::Player => renderer.sprites.player,
        Glyph::Item => renderer.sprites.item,
        Glyph::Wall => "██",
        Glyph::Empty => "  ",
        Glyph::Start => "░░",
        Glyph::End => "▒▒",
    };
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(cell.color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hud_lines_are_cut_to_the_terminal() {
        assert_eq!(fit_width("Time: 1.0s  Item: --", 8), "Time: 1.");
        assert_eq!(fit_width("short", 80), "short");
        assert_eq!(fit_width("", 0), "");
    }

    #[test]
    fn wide_glyphs_are_not_split() {
        let line = "drag 😃, q quit";
        assert_eq!(fit_width(line, 6), "drag ");
        assert_eq!(fit_width(line, 7), "drag 😃");
        assert!(UnicodeWidthStr::width(fit_width(line, 10)) <= 10);
    }
}
