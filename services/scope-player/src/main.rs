//! Radar scope player.
//!
//! Drives a [`RadarScope`] at a fixed tick rate from a procedural echo
//! source:
//! - Feeds a new sensor frame every `--frame-interval` seconds of scope time
//! - Logs sweep completions and periodic statistics
//! - Optionally writes flattened PNG snapshots to `--output-dir`

mod source;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use scope_common::ScopeConfig;
use scope_renderer::{png, RadarScope, SweepEvent};

use source::EchoSource;

#[derive(Parser, Debug)]
#[command(name = "scope-player")]
#[command(about = "Run the radar scope against a procedural echo source")]
struct Args {
    /// JSON configuration file (defaults plus SCOPE_* overrides when absent)
    #[arg(short, long, env = "SCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Scope time to simulate, in seconds
    #[arg(short, long, default_value = "30")]
    duration: f32,

    /// Ticks per second of scope time
    #[arg(long, default_value = "60")]
    fps: u32,

    /// Seconds between sensor frames
    #[arg(long, default_value = "4")]
    frame_interval: f32,

    /// Resolution of generated sensor frames (defaults to the display resolution)
    #[arg(long)]
    sensor_resolution: Option<usize>,

    /// Number of storm cells in the echo source
    #[arg(long, default_value = "8")]
    cells: usize,

    /// Seed for the echo source
    #[arg(long, default_value = "1")]
    seed: u64,

    /// Directory for PNG snapshots
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Write a snapshot every N ticks (requires --output-dir)
    #[arg(long, default_value = "60")]
    snapshot_every: u64,

    /// Override the display range in nautical miles
    #[arg(long)]
    range_nm: Option<f32>,

    /// Rotate the heading by this many degrees per second
    #[arg(long, default_value = "0")]
    heading_rate: f32,

    /// Sleep between ticks to run at wall-clock speed
    #[arg(long)]
    realtime: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    info!("Starting radar scope player");

    let config = load_config(&args)?;
    for problem in config.validate() {
        warn!(problem = %problem, "Configuration problem, value will be clamped");
    }

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating snapshot directory {}", dir.display()))?;
    }

    let mut scope = RadarScope::initialize(&config);
    scope.subscribe(|event| {
        if let SweepEvent::Complete = event {
            debug!("Sweep complete");
        }
    });

    let sensor_size = args
        .sensor_resolution
        .unwrap_or(scope.config().display_resolution);
    let mut echoes = EchoSource::new(sensor_size, args.cells, args.seed);

    run(&args, &mut scope, &mut echoes)?;

    let stats = scope.shutdown();
    info!(
        frames_generated = echoes.frames_generated(),
        stats = %serde_json::to_string(&stats)?,
        "Player finished"
    );
    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Defaults, then the config file, then `SCOPE_*` variables, then flags.
fn load_config(args: &Args) -> Result<ScopeConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = ScopeConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?;
            info!(path = %path.display(), "Loaded configuration file");
            config.apply_env();
            config
        }
        None => ScopeConfig::from_env(),
    };

    if let Some(range_nm) = args.range_nm {
        config.range_nm = range_nm;
    }
    Ok(config)
}

fn run(args: &Args, scope: &mut RadarScope, echoes: &mut EchoSource) -> Result<()> {
    let fps = args.fps.max(1);
    let dt = 1.0 / fps as f32;
    let total_ticks = (args.duration.max(0.0) * fps as f32).round() as u64;
    let frame_interval = args.frame_interval.max(dt);

    info!(
        ticks = total_ticks,
        fps,
        frame_interval,
        progressive = scope.config().use_progressive_reveal,
        "Running scope"
    );

    let mut since_frame = frame_interval;
    let mut heading = scope.config().heading_degrees;
    let mut composite = Vec::new();
    let started = Instant::now();

    for tick in 0..total_ticks {
        let tick_started = Instant::now();

        if since_frame >= frame_interval {
            let frame = echoes.next_frame(since_frame)?;
            scope.on_sensor_frame(frame);
            since_frame = 0.0;
        }

        if args.heading_rate != 0.0 {
            heading += args.heading_rate * dt;
            scope.on_heading_changed(heading);
        }

        scope.tick(dt);
        since_frame += dt;

        if let Some(dir) = &args.output_dir {
            if args.snapshot_every > 0 && tick % args.snapshot_every == 0 {
                scope.composite_into(&mut composite);
                let size = scope.config().display_resolution;
                let bytes = png::encode_auto(&composite, size, size)?;
                let path = dir.join(format!("scope_{:06}.png", tick));
                std::fs::write(&path, &bytes)
                    .with_context(|| format!("writing snapshot {}", path.display()))?;
                debug!(path = %path.display(), bytes = bytes.len(), "Wrote snapshot");
            }
        }

        // Hosts upload published layers here; the player only drains them.
        let _ = scope.publish();

        if (tick + 1) % fps as u64 == 0 {
            let stats = scope.stats();
            info!(
                scope_secs = (tick + 1) as f32 * dt,
                angle = scope.angle(),
                sweeps = stats.sweeps_completed,
                active_returns = scope.returns().active_returns(),
                "Progress"
            );
        }

        if args.realtime {
            let budget = Duration::from_secs_f32(dt);
            if let Some(remaining) = budget.checked_sub(tick_started.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
    }

    info!(elapsed_ms = started.elapsed().as_millis() as u64, "Run complete");
    Ok(())
}
