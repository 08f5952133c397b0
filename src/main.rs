//! Elastic Arena entry point
//!
//! Loads settings, seeds the RNG, and writes one table per valid trial.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use elastic_arena::persistence::OutputDir;
use elastic_arena::{OutputFormat, Settings, TrialGenerator};

/// Generate training data from randomized elastic-ball trials
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON settings file (defaults are used for missing fields)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of valid trials to generate
    #[arg(short, long)]
    trials: Option<usize>,

    /// RNG seed for reproducible output
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: csv or json
    #[arg(short, long, value_parser = parse_format)]
    format: Option<OutputFormat>,
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    OutputFormat::from_str(s).ok_or_else(|| format!("unknown format `{s}` (expected csv or json)"))
}

// load here to keep main clean
fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(trials) = args.trials {
        settings.total_trials = trials;
    }
    if let Some(seed) = args.seed {
        settings.seed = Some(seed);
    }
    if let Some(output) = &args.output {
        settings.output_dir = output.clone();
    }
    if let Some(format) = args.format {
        settings.format = format;
    }
    settings.validate()?;
    Ok(settings)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = load_settings(&args).context("invalid settings")?;

    let seed = settings.seed.unwrap_or_else(|| rand::rng().random());
    log::info!("Elastic Arena starting (seed {seed})");
    log::info!(
        "{} trials, {} ball(s), steps {}..{}, dt {}",
        settings.total_trials,
        settings.ball_count,
        settings.min_steps,
        settings.max_steps,
        settings.time_delta
    );

    let out = OutputDir::create(&settings.output_dir).context("creating output directory")?;
    let format = settings.format;
    let mut generator = TrialGenerator::new(settings, Pcg32::seed_from_u64(seed))?;

    for trial in generator.by_ref() {
        let trial = trial?;
        out.save(trial.number, &trial.table, format)
            .with_context(|| format!("saving trial {}", trial.number))?;
    }

    let stats = generator.stats();
    log::info!(
        "Done: {} trials written to {} ({} attempts, {} discarded)",
        stats.produced,
        out.path().display(),
        stats.attempts,
        stats.discarded
    );
    Ok(())
}
