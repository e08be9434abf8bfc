use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use glam::Vec2;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use vantage_common::ViewerConfig;
use vantage_input::{KeyCode, MouseButton};
use vantage_kernel::{FrameOutcome, ManualClock, ManualFrames, Viewer};
use vantage_render::{Camera, DrawLog, HeadlessBackend, HeadlessOptions};

#[derive(Parser)]
#[command(name = "vantage-cli", about = "CLI tool for the vantage viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Viewer configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run the viewer core headless for a number of frames
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u32,
        /// Seconds between frames
        #[arg(long, default_value = "0.016")]
        dt: f32,
        /// Keys held for the whole run (e.g. KeyW, ArrowLeft)
        #[arg(long = "hold", value_name = "KEY")]
        held: Vec<KeyCode>,
        /// Drag the mouse by DX,DY pixels before the first frame
        #[arg(long, value_parser = parse_drag, value_name = "DX,DY")]
        drag: Option<Vec2>,
        /// Make shader loading fail so every frame uses the fallback
        #[arg(long)]
        fail_shaders: bool,
        /// Print a line per draw call
        #[arg(long)]
        trace: bool,
    },
    /// Print the effective configuration as YAML
    Config,
}

fn parse_drag(s: &str) -> Result<Vec2, String> {
    let (x, y) = s.split_once(',').ok_or("expected DX,DY")?;
    let parse = |v: &str| v.trim().parse::<f32>().map_err(|e| format!("{v:?}: {e}"));
    Ok(Vec2::new(parse(x)?, parse(y)?))
}

/// The whole run must fit on the clock: `dt` non-negative and finite, and
/// `frames * dt` representable as a time offset.
fn check_step(dt: f32, frames: u32) -> Result<Duration> {
    if !(dt.is_finite() && dt >= 0.0) {
        bail!("--dt must be a non-negative number of seconds");
    }
    let step = Duration::try_from_secs_f32(dt).context("--dt is out of range")?;
    let total = step
        .checked_mul(frames)
        .context("--frames times --dt is out of range")?;
    if Instant::now().checked_add(total).is_none() {
        bail!("--frames times --dt is out of range");
    }
    Ok(step)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => ViewerConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("vantage-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("kernel: {}", vantage_kernel::crate_info());
            println!("render: {}", vantage_render::crate_info());
            println!("input: {}", vantage_input::crate_info());
        }
        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
        Commands::Simulate {
            frames,
            dt,
            held,
            drag,
            fail_shaders,
            trace,
        } => {
            check_step(dt, frames)?;
            simulate(config, frames, dt, &held, drag, fail_shaders, trace)?;
        }
    }

    Ok(())
}

fn simulate(
    config: ViewerConfig,
    frames: u32,
    dt: f32,
    held: &[KeyCode],
    drag: Option<Vec2>,
    fail_shaders: bool,
    trace: bool,
) -> Result<()> {
    let log = DrawLog::new();
    let options = HeadlessOptions {
        shaders: if fail_shaders {
            Vec::new()
        } else {
            HeadlessOptions::default().shaders
        },
        ..HeadlessOptions::default()
    };

    let requester = ManualFrames::new();
    let clock = ManualClock::new();
    let mut viewer: Viewer<HeadlessBackend, ManualFrames, ManualClock> =
        Viewer::with_clock(config, requester.clone(), clock.clone());
    pollster::block_on(viewer.initialize(HeadlessBackend::connect(options, log.clone())))?;
    tracing::info!(frames, dt, held = held.len(), fail_shaders, "simulation started");

    for key in held {
        viewer.on_key(*key, true);
    }
    if let Some(delta) = drag {
        // Moving the cursor from (dx, dy) to the origin yields a delta of (dx, dy).
        viewer.on_mouse_button(MouseButton::Left, true);
        viewer.on_mouse_move(delta.x, delta.y);
        viewer.on_mouse_move(0.0, 0.0);
        viewer.on_mouse_button(MouseButton::Left, false);
    }

    for frame in 0..frames {
        if !clock.advance_secs(dt) {
            bail!("clock overflow at frame {frame}");
        }
        let Some(token) = requester.take_next() else {
            bail!("frame loop stopped requesting frames at frame {frame}");
        };
        let outcome = viewer.on_frame(token);
        if trace {
            match (outcome, log.last()) {
                (FrameOutcome::Rendered(_), Some(call)) => println!("{frame:>5} {}", call.describe()),
                (outcome, _) => println!("{frame:>5} {outcome:?}"),
            }
        }
    }
    viewer.stop();
    tracing::info!(
        frames = viewer.stats().frames,
        faults = viewer.stats().faults,
        "simulation finished"
    );

    let Some(camera) = viewer.camera() else {
        bail!("viewer has no camera");
    };
    let p = camera.position();
    let stats = viewer.stats();
    println!("frames:    {}", stats.frames);
    println!("primary:   {}", stats.primary_frames);
    println!("fallback:  {}", stats.fallback_frames);
    println!("faults:    {}", stats.faults);
    println!("position:  ({:.3}, {:.3}, {:.3})", p.x, p.y, p.z);
    println!("yaw/pitch: {:.4} / {:.4} rad", camera.yaw(), camera.pitch());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_parses_pair() {
        assert_eq!(parse_drag("10, -4.5").unwrap(), Vec2::new(10.0, -4.5));
        assert!(parse_drag("10").is_err());
        assert!(parse_drag("a,1").is_err());
    }

    #[test]
    fn step_accepts_ordinary_values() {
        assert_eq!(check_step(0.5, 60).unwrap(), Duration::from_millis(500));
        assert_eq!(check_step(0.0, 10).unwrap(), Duration::ZERO);
    }

    #[test]
    fn step_rejects_unusable_values() {
        assert!(check_step(-0.1, 1).is_err());
        assert!(check_step(f32::NAN, 1).is_err());
        assert!(check_step(f32::INFINITY, 1).is_err());
        assert!(check_step(1e30, 1).is_err());
        assert!(check_step(1e12, u32::MAX).is_err());
    }
}
