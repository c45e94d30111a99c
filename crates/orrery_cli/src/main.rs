//! Orrery CLI
//!
//! Run the portfolio scene headless, dump its configuration, and replay the
//! typewriter reveal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use orrery_animation::TypeWriter;
use orrery_core::{RecordingContext, SceneRng, Size, Vec2};
use orrery_scene::{Scene, SceneConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod report;

use report::FrameReport;

#[derive(Parser)]
#[command(name = "orrery")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Orrery scene runner", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scene against a recording surface and report each frame
    Run {
        /// Number of frames to run
        #[arg(short, long, default_value = "120")]
        frames: u64,

        /// Frames per second of the simulated display
        #[arg(long, default_value = "60")]
        fps: f64,

        /// Surface width in pixels
        #[arg(long, default_value = "1280")]
        width: f32,

        /// Surface height in pixels
        #[arg(long, default_value = "720")]
        height: f32,

        /// Scene configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for every random source in the scene
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Report every Nth frame
        #[arg(long, default_value = "30")]
        every: u64,

        /// Emit one JSON object per reported frame
        #[arg(long)]
        json: bool,
    },

    /// Print the configuration as TOML
    Config {
        /// Start from this file instead of the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print only one section (field, orbit, meteors, rig, typewriter, cycles)
        #[arg(long)]
        section: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a configuration file
    Check {
        /// Scene configuration file (TOML)
        config: PathBuf,
    },

    /// Replay a typewriter reveal tick by tick
    Type {
        /// Text to reveal
        text: String,

        /// Seed for delay jitter and glitch rolls
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Scene configuration file for typewriter timing
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            frames,
            fps,
            width,
            height,
            config,
            seed,
            every,
            json,
        } => cmd_run(
            config.as_deref(),
            RunOptions {
                frames,
                fps,
                size: Size::new(width, height),
                seed,
                every,
                json,
            },
        ),

        Commands::Config {
            config,
            section,
            output,
        } => cmd_config(config.as_deref(), section.as_deref(), output.as_deref()),

        Commands::Check { config } => cmd_check(&config),

        Commands::Type { text, seed, config } => cmd_type(&text, seed, config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(SceneConfig::default()),
    }
}

struct RunOptions {
    frames: u64,
    fps: f64,
    size: Size,
    seed: u64,
    every: u64,
    json: bool,
}

fn cmd_run(config: Option<&Path>, options: RunOptions) -> Result<()> {
    if !(options.fps.is_finite() && options.fps > 0.0) {
        anyhow::bail!("fps must be positive, got {}", options.fps);
    }
    if options.size.is_empty() {
        anyhow::bail!(
            "surface must have a positive size, got {}x{}",
            options.size.width,
            options.size.height
        );
    }

    let config = load_config(config)?;
    let mut scene = Scene::build(&config, options.seed)?;
    let mut surface = RecordingContext::new(options.size);
    let every = options.every.max(1);

    info!(
        "Running {} frames at {} fps on a {}x{} surface",
        options.frames, options.fps, options.size.width, options.size.height
    );

    for i in 0..options.frames {
        let now = i as f64 / options.fps;

        // Sweep the pointer around the viewport so the rig has something to follow
        let angle = now as f32 * 0.5;
        scene.set_pointer(Vec2::new(angle.cos(), angle.sin() * 0.5));

        let Some(time) = scene.frame(now, Some(&mut surface)) else {
            continue;
        };

        let last = i + 1 == options.frames;
        if i % every != 0 && !last {
            continue;
        }

        let report = FrameReport::new(time, surface.commands(), scene.stats());
        if options.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!("{}", report.summary());
        }
    }

    Ok(())
}

fn cmd_config(config: Option<&Path>, section: Option<&str>, output: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;

    let text = match section {
        None => config.to_toml_string()?,
        Some("field") => toml::to_string_pretty(&config.field)?,
        Some("orbit") => toml::to_string_pretty(&config.orbit)?,
        Some("meteors") => toml::to_string_pretty(&config.meteors)?,
        Some("rig") => toml::to_string_pretty(&config.rig)?,
        Some("typewriter") => toml::to_string_pretty(&config.typewriter)?,
        Some("cycles") => toml::to_string_pretty(&config.cycles)?,
        Some(other) => anyhow::bail!(
            "Unknown section '{}'. Valid sections: field, orbit, meteors, rig, typewriter, cycles",
            other
        ),
    };

    match output {
        Some(path) => {
            fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote config to {}", path.display());
        }
        None => print!("{}", text),
    }

    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    let config = load_config(Some(path))?;
    println!(
        "{}: ok ({} particles, {} bodies, {} meteors, {} skills)",
        path.display(),
        config.field.count,
        config.orbit.bodies.len(),
        config.meteors.count,
        config.cycles.skills.len()
    );
    Ok(())
}

fn cmd_type(text: &str, seed: u64, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let mut writer = TypeWriter::new(text, config.typewriter.timing(), SceneRng::seeded(seed));

    writer.start(0.0);
    while let Some(due) = writer.next_due_ms() {
        writer.advance(due);
        println!(
            "{:>8.1} ms  {}{}",
            due,
            writer.displayed(),
            if writer.is_glitching() { "  [glitch]" } else { "" }
        );
    }

    println!(
        "{} characters in {:?}",
        writer.revealed(),
        writer.state()
    );
    Ok(())
}
