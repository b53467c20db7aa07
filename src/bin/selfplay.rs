//! Self-play batch CLI.
//!
//! Plays strategist-vs-strategist games and writes one JSON record per game
//! to stdout (or `--output`). Progress and the summary go to stderr.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing::error;

use starclaim::config::{load_config, Difficulty, EngineConfig, MapSize};
use starclaim::selfplay::{self, SelfPlayConfig};

/// Strategist-vs-strategist games for tuning difficulty profiles
#[derive(Parser, Debug)]
#[command(name = "selfplay")]
struct Args {
    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    games: usize,

    /// Turn limit per game
    #[arg(long, default_value_t = 200)]
    max_turns: u32,

    /// Map size: small, medium, or large
    #[arg(long, default_value = "small")]
    map_size: String,

    /// Strategist level for the human seat
    #[arg(long, default_value = "normal")]
    human: String,

    /// Strategist level for the ai seat
    #[arg(long, default_value = "normal")]
    ai: String,

    /// TOML file with profile overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of parallel threads
    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// Random seed, 0 for entropy
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Output file path (default: stdout)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Suppress the summary
    #[arg(long)]
    quiet: bool,
}

fn build_config(args: &Args) -> Result<SelfPlayConfig, Box<dyn std::error::Error>> {
    let engine = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    Ok(SelfPlayConfig {
        num_games: args.games,
        max_turns: args.max_turns,
        map_size: MapSize::from_name(&args.map_size)?,
        human: Difficulty::from_name(&args.human)?,
        ai: Difficulty::from_name(&args.ai)?,
        engine,
        threads: args.threads,
        seed: args.seed,
    })
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&args)?;
    if !args.quiet {
        eprintln!(
            "Self-play: {} games, {:?} map, human {} vs ai {}, {} turns max, {} threads",
            config.num_games,
            config.map_size,
            config.human.name(),
            config.ai.name(),
            config.max_turns,
            config.threads
        );
    }

    let start = Instant::now();
    let games = selfplay::run_self_play(&config)?;
    let elapsed = start.elapsed();

    if !args.quiet {
        eprintln!("Completed {} games in {:.1}s", games.len(), elapsed.as_secs_f64());
        selfplay::print_summary(&games);
    }

    match &args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            selfplay::write_jsonl(&games, &mut writer)?;
            if !args.quiet {
                eprintln!("Wrote {} games to {}", games.len(), path.display());
            }
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            selfplay::write_jsonl(&games, &mut writer)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "selfplay failed");
            ExitCode::FAILURE
        }
    }
}
