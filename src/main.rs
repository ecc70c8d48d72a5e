use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use elder_shooter::compute::{init_state, tick};
use elder_shooter::display::{record_trails, render, CellSize, Surface, TerminalSurface};
use elder_shooter::input::{InputAction, InputAdapter};
use elder_shooter::{Canvas, Tuning};

/// Terminal arcade shooter: hold off the waves and bring down the golden elders.
#[derive(Parser, Debug)]
#[command(name = "elder_shooter", version, about)]
struct Cli {
    /// JSON file overriding the default tuning values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for elder spawn positions (random when omitted).
    #[arg(long)]
    seed: Option<u64>,
    /// Frames per second; speeds are expressed per frame.
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// Pixels covered by one terminal column.
    #[arg(long, default_value_t = 8.0)]
    cell_width: f32,
    /// Pixels covered by one terminal row.
    #[arg(long, default_value_t = 16.0)]
    cell_height: f32,
    /// Where log output goes; the terminal itself belongs to the game.
    #[arg(long, default_value = "elder_shooter.log")]
    log_file: PathBuf,
}

// ── Logging ───────────────────────────────────────────────────────────────────

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits.  Once the game is over `tick` stops changing
/// anything and the end screen is redrawn every frame.
fn game_loop<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    tuning: Tuning,
    cell: CellSize,
    frame_time: Duration,
    rng: &mut StdRng,
) -> anyhow::Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut surface = TerminalSurface::new(out, cols, rows, cell);
    let mut input = InputAdapter::new(cell);

    // One monotonic clock for the whole session, sampled once per frame.
    let start = Instant::now();
    let mut state = init_state(tuning, Canvas::from(surface.size()), 0, rng);
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        let now = start.elapsed().as_millis() as u64;
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(event) = rx.try_recv() {
            match input.handle_event(&event, frame) {
                Some(InputAction::Quit) => {
                    log::info!("Quit at level {} with score {}", state.level, state.score);
                    return Ok(());
                }
                Some(InputAction::Resize(cols, rows)) => {
                    log::debug!("Terminal resized to {}x{}", cols, rows);
                    surface.resize(cols, rows);
                }
                None => {}
            }
        }

        let canvas = Canvas::from(surface.size());
        let snapshot = input.snapshot(frame, state.player.center());
        tick(&mut state, &snapshot, canvas, now, rng);
        record_trails(&mut state, now);
        render(&mut surface, &state, now)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;

    let tuning = match &cli.config {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let seed = cli.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let cell = CellSize::new(cli.cell_width, cli.cell_height);
    let frame_time = Duration::from_secs_f64(1.0 / cli.fps.max(1) as f64);
    log::info!("Elder Shooter starting (seed {}, {} fps)", seed, cli.fps);

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = game_loop(&mut out, &rx, tuning, cell, frame_time, &mut rng);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(err) = &result {
        log::error!("Exiting with error: {:#}", err);
    }
    result
}
