use std::fs::File;
use std::io::{self, Stdout};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use maze_chase::config::env_setting;
use maze_chase::{ChaseConfig, Dir, Result, RoundController, RoundEvent};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

mod render;

use render::{render, render_end_screen, Renderer};

const DEFAULT_RENDER_FPS: u64 = 60;

fn main() -> Result<()> {
    init_logging()?;
    let config = ChaseConfig::from_env()?;
    let render_fps = env_setting::<u64>("MAZE_CHASE_FPS")?
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RENDER_FPS);
    let rng = match env_setting::<u64>("MAZE_CHASE_SEED")? {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, config, rng, render_fps);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

// The raw terminal owns stdout, so logs only go to a file when asked for.
fn init_logging() -> Result<()> {
    let Ok(path) = std::env::var("MAZE_CHASE_LOG") else {
        return Ok(());
    };
    let file = File::create(&path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("maze_chase=info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    tracing::info!(log = %path, "maze chase starting");
    Ok(())
}

fn run(stdout: &mut Stdout, config: ChaseConfig, rng: ChaCha8Rng, render_fps: u64) -> Result<()> {
    let mut renderer = Renderer::new(config.width, config.height);
    let mut game = RoundController::new(config, rng);
    let frame_time = Duration::from_micros(1_000_000 / render_fps);
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    code => {
                        if let Some(dir) = dir_for_key(code) {
                            game.request_direction(dir);
                        }
                    }
                }
            }
        }

        let elapsed = last_frame.elapsed();
        last_frame = Instant::now();
        for event in game.tick(elapsed) {
            if let RoundEvent::RoundStarted { .. } = event {
                renderer.invalidate();
            }
        }
        render(stdout, &game, &mut renderer)?;

        if game.phase().is_over() {
            render_end_screen(stdout, &game)?;
            match wait_for_end_choice()? {
                EndChoice::Quit => return Ok(()),
                EndChoice::Restart => {
                    stdout.execute(Clear(ClearType::All))?;
                    game.restart();
                    renderer.invalidate();
                    last_frame = Instant::now();
                    continue;
                }
            }
        }

        let spent = frame_start.elapsed();
        if spent < frame_time {
            thread::sleep(frame_time - spent);
        }
    }
}

fn dir_for_key(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(Dir::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Dir::Down),
        KeyCode::Left | KeyCode::Char('h') => Some(Dir::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(Dir::Right),
        _ => None,
    }
}

enum EndChoice {
    Restart,
    Quit,
}

fn wait_for_end_choice() -> Result<EndChoice> {
    loop {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('r') => return Ok(EndChoice::Restart),
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(EndChoice::Quit),
                    _ => {}
                }
            }
        }
    }
}
