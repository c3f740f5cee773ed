use std::io::{self, Stdout, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use maze_chase::{Cell, Grid, Phase, Pos, RoundController};
use rand::Rng;
use unicode_width::UnicodeWidthStr;

const CELL_W: usize = 2;
const TIMER_BAR_W: usize = 20;
const TIMER_DANGER: f32 = 0.2;

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Agent,
    Wall,
    Floor,
}

#[derive(Clone, Copy, PartialEq)]
struct ScreenCell {
    glyph: Glyph,
    color: Color,
}

pub struct Renderer {
    last: Vec<ScreenCell>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            last: vec![
                ScreenCell {
                    glyph: Glyph::Floor,
                    color: Color::Reset,
                };
                width * height
            ],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }
}

pub fn render<R: Rng>(
    stdout: &mut Stdout,
    game: &RoundController<R>,
    renderer: &mut Renderer,
) -> io::Result<()> {
    let grid = game.grid();
    stdout.queue(MoveTo(0, 0))?;

    let (origin_x, origin_y) = match board_layout(grid)? {
        Layout::Fits { origin_x, origin_y } => (origin_x, origin_y),
        Layout::TooSmall { needed, current } => {
            stdout.queue(Clear(ClearType::All))?;
            let msg = format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed.0, needed.1, current.0, current.1
            );
            stdout.queue(Print(msg))?;
            stdout.flush()?;
            renderer.needs_full = true;
            return Ok(());
        }
    };
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }

    let (hud, hud_color) = hud_line(game);
    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(hud_color))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&hud))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    let player = player_cell(game);
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let pos = Pos::new(x, y);
            let cell = cell_for(game, player, pos);
            let idx = y * grid.width() + x;
            if renderer.needs_full || cell != renderer.last[idx] {
                renderer.last[idx] = cell;
                draw_cell(stdout, renderer, x, y, cell)?;
            }
        }
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

enum Layout {
    Fits { origin_x: u16, origin_y: u16 },
    TooSmall { needed: (u16, u16), current: (u16, u16) },
}

// Board centred in the terminal, one row left above it for the HUD.
fn board_layout(grid: &Grid) -> io::Result<Layout> {
    let needed_h = (grid.height() + 2) as u16;
    let needed_w = (grid.width() * CELL_W) as u16;
    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        return Ok(Layout::TooSmall {
            needed: (needed_w, needed_h),
            current: (term_w, term_h),
        });
    }
    Ok(Layout::Fits {
        origin_x: (term_w - needed_w) / 2,
        origin_y: (term_h - needed_h) / 2 + 1,
    })
}

fn hud_line<R: Rng>(game: &RoundController<R>) -> (String, Color) {
    let fraction = game.time_fraction();
    let filled = ((fraction * TIMER_BAR_W as f32).round() as usize).min(TIMER_BAR_W);
    let bar = format!("{}{}", "#".repeat(filled), ".".repeat(TIMER_BAR_W - filled));
    let status = match game.phase() {
        Phase::Intermission { .. } => "  CAUGHT! Next round...",
        _ => "",
    };
    let hud = format!(
        "Round {}/{}  Time {:>4.1}s [{}]{}  (q to quit)",
        game.round(),
        game.max_rounds(),
        game.time_left().as_secs_f32(),
        bar,
        status
    );
    let color = if fraction < TIMER_DANGER {
        Color::Red
    } else {
        Color::White
    };
    (hud, color)
}

// The player is drawn on whichever cell the interpolated position rounds to.
fn player_cell<R: Rng>(game: &RoundController<R>) -> Pos {
    let (x, y) = game.player().continuous_pos();
    Pos::new(x.round().max(0.0) as usize, y.round().max(0.0) as usize)
}

fn cell_for<R: Rng>(game: &RoundController<R>, player: Pos, pos: Pos) -> ScreenCell {
    if pos == player {
        return ScreenCell {
            glyph: Glyph::Player,
            color: Color::Cyan,
        };
    }
    if pos == game.agent().pos {
        return ScreenCell {
            glyph: Glyph::Agent,
            color: Color::Yellow,
        };
    }
    match game.grid().get(pos) {
        Some(Cell::Floor) => ScreenCell {
            glyph: Glyph::Floor,
            color: Color::Reset,
        },
        _ => ScreenCell {
            glyph: Glyph::Wall,
            color: Color::Blue,
        },
    }
}

fn draw_cell(
    stdout: &mut Stdout,
    renderer: &Renderer,
    x: usize,
    y: usize,
    cell: ScreenCell,
) -> io::Result<()> {
    let text = match cell.glyph {
        Glyph::Player => "😃",
        Glyph::Agent => "⭐",
        Glyph::Wall => "██",
        Glyph::Floor => "  ",
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

pub fn render_end_screen<R: Rng>(stdout: &mut Stdout, game: &RoundController<R>) -> io::Result<()> {
    let grid = game.grid();
    match board_layout(grid)? {
        Layout::Fits { origin_x, origin_y } => {
            stdout.queue(MoveTo(origin_x, origin_y + grid.height() as u16))?;
        }
        Layout::TooSmall { needed, .. } => {
            stdout.queue(MoveTo(0, needed.1))?;
        }
    }
    let msg = match game.phase() {
        Phase::Victory => format!(
            "VICTORY - all {} rounds won with {:.1}s left (r to play again, q to quit)",
            game.max_rounds(),
            game.time_left().as_secs_f32()
        ),
        _ => format!(
            "TIME'S UP - reached round {}/{} (r to play again, q to quit)",
            game.round(),
            game.max_rounds()
        ),
    };
    stdout.queue(Print(msg))?;
    stdout.flush()
}
