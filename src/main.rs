//! Headless demo: run a session with synthetic frame timestamps and save
//! rendered frames as PNG files.

mod raster;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use pixelflock::{
    MorphConfig, MorphSession, PointerState, ReconstructionConfig, ReconstructionSession,
    SourceImage, SurfaceSize,
};
use raster::Canvas;
use std::fs;
use std::path::{Path, PathBuf};

/// Milliseconds per frame at 60 Hz.
const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Parser)]
#[command(name = "pixelflock")]
#[command(
    about = "Render particle image reconstruction and morph animations to PNG frames",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Surface width in pixels
    #[arg(long, default_value_t = 800, global = true)]
    width: u32,

    /// Surface height in pixels
    #[arg(long, default_value_t = 600, global = true)]
    height: u32,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 600, global = true)]
    frames: u64,

    /// Save every Nth frame
    #[arg(long, default_value_t = 30, global = true)]
    every: u64,

    /// Override the particle count
    #[arg(long, global = true)]
    particles: Option<usize>,

    /// RNG seed for reproducible output
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "frames", global = true)]
    out: PathBuf,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild one image from particles
    Reconstruct {
        /// Source image
        image: PathBuf,
    },

    /// Morph back and forth between two images
    Morph {
        /// Image shown first
        a: PathBuf,

        /// Image morphed into
        b: PathBuf,

        /// Request a transition at this time in milliseconds (repeatable)
        #[arg(long = "trigger-at")]
        trigger_at: Vec<f64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger(env_logger::Env::default(), cli.verbose).init();

    fs::create_dir_all(&cli.out)
        .with_context(|| format!("Failed to create output directory {}", cli.out.display()))?;
    let surface = SurfaceSize::new(cli.width, cli.height);

    match &cli.command {
        Commands::Reconstruct { image } => reconstruct(&cli, surface, image),
        Commands::Morph { a, b, trigger_at } => morph(&cli, surface, a, b, trigger_at),
    }
}

fn reconstruct(cli: &Cli, surface: SurfaceSize, path: &Path) -> Result<()> {
    let mut config = match &cli.config {
        Some(file) => ReconstructionConfig::load(file)
            .with_context(|| format!("Failed to load config {}", file.display()))?,
        None => ReconstructionConfig::default(),
    };
    if let Some(count) = cli.particles {
        config = config.with_particle_count(count);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    let image = open_image(path)?;
    let mut session = ReconstructionSession::start(surface, image, config)?;
    let mut canvas = Canvas::new(surface);
    let pointer = PointerState::outside();

    for i in 0..cli.frames {
        let frame = session.tick(i as f64 * FRAME_MS, &pointer);
        if should_save(cli, i) {
            canvas.draw(&frame);
            save(cli, &canvas, i)?;
        }
    }

    println!(
        "Rendered {} frames ({} particles, settled: {})",
        cli.frames,
        session.field().len(),
        session.is_settled()
    );
    Ok(())
}

fn morph(cli: &Cli, surface: SurfaceSize, a: &Path, b: &Path, triggers: &[f64]) -> Result<()> {
    let mut config = match &cli.config {
        Some(file) => MorphConfig::load(file)
            .with_context(|| format!("Failed to load config {}", file.display()))?,
        None => MorphConfig::default(),
    };
    if let Some(count) = cli.particles {
        config = config.with_particle_count(count);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    let mut session = MorphSession::start(surface, open_image(a)?, open_image(b)?, config)?;
    let mut canvas = Canvas::new(surface);

    let mut triggers = triggers.to_vec();
    triggers.sort_by(|x, y| x.total_cmp(y));
    let mut pending = triggers.into_iter().peekable();

    for i in 0..cli.frames {
        let now = i as f64 * FRAME_MS;
        while pending.next_if(|&at| at <= now).is_some() {
            session.request_transition();
        }
        let frame = session.tick(now);
        if should_save(cli, i) {
            canvas.draw(&frame);
            save(cli, &canvas, i)?;
        }
    }

    println!(
        "Rendered {} frames ({} particles, final phase {})",
        cli.frames,
        session.field().len(),
        session.phase().name()
    );
    Ok(())
}

fn open_image(path: &Path) -> Result<SourceImage> {
    SourceImage::open(path).with_context(|| format!("Failed to open image {}", path.display()))
}

/// Level forced by `-v` flags, if any.
fn verbosity_level(verbose: u8) -> Option<LevelFilter> {
    match verbose {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    }
}

/// Logger reading `env`, defaulting to `warn`. `-v` flags override both.
fn logger(env: env_logger::Env<'_>, verbose: u8) -> env_logger::Builder {
    let mut builder = env_logger::Builder::from_env(env.default_filter_or("warn"));
    if let Some(level) = verbosity_level(verbose) {
        builder.filter_level(level);
    }
    builder
}

fn should_save(cli: &Cli, frame: u64) -> bool {
    frame % cli.every.max(1) == 0 || frame + 1 == cli.frames
}

fn save(cli: &Cli, canvas: &Canvas, frame: u64) -> Result<()> {
    let path = cli.out.join(format!("frame_{frame:05}.png"));
    canvas
        .image()
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::debug!("Saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unset_env() -> env_logger::Env<'static> {
        env_logger::Env::new().filter("PIXELFLOCK_TEST_UNSET_LOG")
    }

    #[test]
    fn test_default_level_is_warn() {
        assert_eq!(logger(unset_env(), 0).build().filter(), LevelFilter::Warn);
    }

    #[test]
    fn test_verbose_flag_raises_logger_level() {
        assert_eq!(logger(unset_env(), 1).build().filter(), LevelFilter::Info);
        assert_eq!(logger(unset_env(), 2).build().filter(), LevelFilter::Debug);
        assert_eq!(logger(unset_env(), 7).build().filter(), LevelFilter::Trace);
    }

    #[test]
    fn test_should_save_every_nth_and_last() {
        let args = ["pixelflock", "--frames", "10", "--every", "4", "reconstruct", "x.png"];
        let cli = Cli::parse_from(args);
        let saved: Vec<u64> = (0..10).filter(|&i| should_save(&cli, i)).collect();
        assert_eq!(saved, vec![0, 4, 8, 9]);
    }
}
