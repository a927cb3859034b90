//! gesture_gallery — interactive entry point.

use std::path::PathBuf;

use clap::Parser;
use gesture_gallery::app::run;
use gesture_gallery::config::AppConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gesture_gallery", about = "Hand-gesture controlled photo galaxy", version)]
struct Cli {
    /// RON config file; every field is optional.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-lines landmark stream to use as the hand source (`-` for stdin).
    #[arg(short, long)]
    landmarks: Option<PathBuf>,

    /// Fixed RNG seed for reproducible layouts.
    #[arg(long)]
    seed: Option<u64>,

    /// Background particle count.
    #[arg(long)]
    particles: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_gallery=info,gallery_state=info".into()),
        )
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Multiverse Gallery — gesture photo galaxy           ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Hand source: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Hand source: keyboard + mouse simulation  (use --features leap for hardware)");
    println!();

    let mut cfg = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None       => AppConfig::default(),
    };
    if cli.seed.is_some() {
        cfg.seed = cli.seed;
    }
    if let Some(n) = cli.particles {
        cfg.motion.particle_count = n;
    }

    info!(
        seed = ?cfg.seed,
        particles = cfg.motion.particle_count,
        cooldown_ms = cfg.intent.cooldown_ms,
        "starting"
    );

    run(cfg, cli.landmarks)
}
