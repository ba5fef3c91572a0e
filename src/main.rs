//! daudio: run a playback session headlessly.
//!
//! Usage:
//!   daudio path/to/session.toml
//!   daudio path/to/session.toml --duration 30 --tick-rate 120
//!   daudio path/to/session.toml --realtime

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use da_master::Controller;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Run a daudio session file
#[derive(Parser, Debug)]
#[command(name = "daudio")]
#[command(version)]
struct Args {
    /// Session file (TOML)
    session: PathBuf,

    /// Seconds of session time to run
    #[arg(short, long, default_value_t = 10.0)]
    duration: f32,

    /// Ticks per second
    #[arg(short, long, default_value_t = 60.0)]
    tick_rate: f32,

    /// Pace ticks against the wall clock instead of running flat out
    #[arg(long)]
    realtime: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daudio=info,da_engine=info,da_master=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut ctrl = Controller::load(&args.session)
        .with_context(|| format!("Failed to load session {}", args.session.display()))?;

    let config = ctrl.config();
    println!("Session:  {}", args.session.display());
    println!("Clips:    {}", config.clips.len());
    println!("Presets:  {}", config.presets.len());
    println!("Targets:  {}", config.targets.len());
    println!("Cues:     {}", config.cues.len());
    println!("Pool:     {} voices (auto-expand: {})", config.manager.pool_size, config.manager.auto_expand);
    println!();

    let report = if args.realtime {
        play_realtime(&mut ctrl, args.duration, args.tick_rate)?
    } else {
        info!(duration = args.duration, tick_rate = args.tick_rate, "rendering session");
        ctrl.render(args.duration, args.tick_rate).context("Session run failed")?
    };

    println!("{report}");
    Ok(())
}

fn play_realtime(ctrl: &mut Controller, duration: f32, tick_rate: f32) -> Result<da_master::SessionReport> {
    ctrl.play(duration, tick_rate).context("Failed to start session")?;
    println!("Playing...");

    while ctrl.is_playing() {
        if let Some(elapsed) = ctrl.elapsed() {
            print!("\rTime: {:6.2}s / {:.2}s", elapsed, duration);
            let _ = std::io::stdout().flush();
        }
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
    println!("\rDone.                         ");

    ctrl.stop().context("Session thread produced no report")
}
