#![deny(unsafe_code)]
//! Headless driver for the quadfield engines.
//!
//! Subcommands:
//! - `render <engine>`: run an engine N frames, write a PNG
//! - `replay <seed.json>`: re-render a saved seed
//! - `list`: print available engines and palettes
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default `warn`).

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use quadfield_core::palette::DEFAULT_LUT_SIZE;
use quadfield_core::{ColorMap, Engine, ImageBuffer, Palette, PaletteLut, Seed};
use quadfield_engines::EngineKind;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Weight of the newest sample in the frame-time moving average.
const FRAME_TIME_SMOOTHING: f64 = 0.05;

#[derive(Parser)]
#[command(name = "quadfield", about = "Quadratic emitter field renderer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct PaletteArgs {
    /// Palette or LUT ramp name (see `list`).
    #[arg(short, long, default_value = "glow")]
    palette: String,

    /// Lookup table size for LUT ramps, a power of two.
    #[arg(long, default_value_t = DEFAULT_LUT_SIZE)]
    lut: usize,

    /// Output file path.
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Run an engine for N frames and write a PNG snapshot.
    Render {
        /// Engine name (e.g. "orbits").
        engine: String,

        /// Image width in pixels.
        #[arg(short = 'W', long, default_value_t = 512)]
        width: usize,

        /// Image height in pixels.
        #[arg(short = 'H', long, default_value_t = 512)]
        height: usize,

        /// Number of frames to simulate before the snapshot.
        #[arg(short, long, default_value_t = 100)]
        steps: usize,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[command(flatten)]
        palette: PaletteArgs,

        /// Engine parameters as a JSON object.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Also write the seed JSON next to the image.
        #[arg(long)]
        save_seed: bool,
    },
    /// Re-render a seed file written by `render --save-seed`.
    Replay {
        /// Path to the seed JSON.
        seed: PathBuf,

        #[command(flatten)]
        palette: PaletteArgs,
    },
    /// List available engines and palettes.
    List,
}

/// Timing summary of one headless run.
struct RunStats {
    frames: usize,
    mean_frame_secs: f64,
}

fn resolve_palette(name: &str, lut_size: usize) -> Result<Box<dyn ColorMap>, CliError> {
    if PaletteLut::list_names().contains(&name) {
        Ok(Box::new(PaletteLut::from_name(name, lut_size)?))
    } else {
        Ok(Box::new(Palette::from_name(name)?))
    }
}

/// Builds the seed's engine, runs its frames, and writes the final image.
fn render_seed(seed: &Seed, palette: &dyn ColorMap, output: &Path) -> Result<RunStats, CliError> {
    seed.validate()?;
    let mut engine =
        EngineKind::from_name(&seed.engine, seed.width, seed.height, seed.seed, &seed.params)?;

    let mut ema: Option<f64> = None;
    for _ in 0..seed.steps {
        let start = Instant::now();
        engine.step()?;
        let dt = start.elapsed().as_secs_f64();
        ema = Some(match ema {
            Some(avg) => avg + FRAME_TIME_SMOOTHING * (dt - avg),
            None => dt,
        });
    }
    let mean_frame_secs = ema.unwrap_or(0.0);
    tracing::info!(
        engine = %seed.engine,
        frames = seed.steps,
        mean_frame_ms = mean_frame_secs * 1e3,
        "simulation finished"
    );

    let mut image = ImageBuffer::new(seed.width, seed.height)?;
    engine.render_image(palette, &mut image)?;
    quadfield_engines::snapshot::write_image_png(&image, output)?;

    Ok(RunStats {
        frames: seed.steps,
        mean_frame_secs,
    })
}

fn report(json: bool, seed: &Seed, output: &Path, stats: &RunStats) -> Result<(), CliError> {
    if json {
        let info = serde_json::json!({
            "engine": seed.engine,
            "width": seed.width,
            "height": seed.height,
            "steps": stats.frames,
            "seed": seed.seed,
            "mean_frame_ms": stats.mean_frame_secs * 1e3,
            "output": output.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        eprintln!(
            "rendered {} ({}x{}, {} frames, seed {}) -> {}",
            seed.engine,
            seed.width,
            seed.height,
            stats.frames,
            seed.seed,
            output.display()
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let engines = EngineKind::list_engines();
            let palettes = Palette::list_names();
            let ramps = PaletteLut::list_names();
            if cli.json {
                let info = serde_json::json!({
                    "engines": engines,
                    "palettes": palettes,
                    "ramps": ramps,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Engines:");
                for name in engines {
                    println!("  {name}");
                }
                println!("Palettes:");
                println!("  {}", palettes.join(", "));
                println!("LUT ramps:");
                println!("  {}", ramps.join(", "));
            }
        }
        Command::Render {
            engine,
            width,
            height,
            steps,
            seed,
            palette,
            params,
            save_seed,
        } => {
            let params: serde_json::Value = serde_json::from_str(&params)
                .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
            let colors = resolve_palette(&palette.palette, palette.lut)?;
            let seed = Seed::new(&engine, width, height, seed)
                .with_params(params)
                .with_steps(steps);

            let stats = render_seed(&seed, colors.as_ref(), &palette.output)?;

            if save_seed {
                let path = palette.output.with_extension("json");
                std::fs::write(&path, serde_json::to_string_pretty(&seed)?)?;
                tracing::info!(path = %path.display(), "seed written");
            }
            report(cli.json, &seed, &palette.output, &stats)?;
        }
        Command::Replay { seed, palette } => {
            let text = std::fs::read_to_string(&seed)?;
            let seed: Seed = serde_json::from_str(&text)
                .map_err(|e| CliError::Input(format!("invalid seed file: {e}")))?;
            let colors = resolve_palette(&palette.palette, palette.lut)?;
            let stats = render_seed(&seed, colors.as_ref(), &palette.output)?;
            report(cli.json, &seed, &palette.output, &stats)?;
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&e.to_json()).unwrap_or_default()
            );
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn resolves_ramps_and_palettes() {
        assert!(resolve_palette("glow", 256).is_ok());
        assert!(resolve_palette("ocean", 256).is_ok());
        assert_eq!(resolve_palette("plaid", 256).err().map(|e| e.exit_code()), Some(12));
        assert_eq!(resolve_palette("ember", 100).err().map(|e| e.exit_code()), Some(12));
    }

    #[test]
    fn render_then_replay_writes_identical_images() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.png");
        let second = dir.path().join("second.png");
        let seed = Seed::new("orbits", 24, 16, 5).with_steps(3);
        let colors = resolve_palette("glow", 256).unwrap();

        let stats = render_seed(&seed, colors.as_ref(), &first).unwrap();
        assert_eq!(stats.frames, 3);

        let text = serde_json::to_string(&seed).unwrap();
        let replayed: Seed = serde_json::from_str(&text).unwrap();
        render_seed(&replayed, colors.as_ref(), &second).unwrap();

        assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    }

    #[test]
    fn invalid_seed_is_rejected_before_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("never.png");
        let seed = Seed::new("orbits", 0, 16, 5);
        let colors = resolve_palette("glow", 256).unwrap();
        assert!(render_seed(&seed, colors.as_ref(), &out).is_err());
        assert!(!out.exists());
    }
}
