//! Starclaim: a turn-based 4X simulation engine speaking a line protocol.
//!
//! Reads commands from stdin and writes responses to stdout. Logs go to
//! stderr so they never interleave with protocol output.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use starclaim::config::{load_config, EngineConfig};
use starclaim::engine::Engine;
use starclaim::protocol::parser::{parse_command, Command};
use starclaim::resolve::BattleDecision;

#[derive(Parser, Debug)]
#[command(name = "starclaim", about = "Turn-based 4X simulation engine")]
struct Args {
    /// TOML file overriding difficulty, map settings, and profiles
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Runs the protocol loop until `quit` or end of input.
fn serve<W: Write>(engine: &mut Engine, out: &mut W) -> io::Result<()> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let Some(cmd) = parse_command(&line) else {
            continue;
        };

        match cmd {
            Command::Hello => engine.handle_hello(out)?,
            Command::IsReady => engine.handle_isready(out)?,
            Command::SetOption { name, value } => engine.handle_setoption(&name, value.as_deref(), out)?,
            Command::NewGame => engine.new_game(),
            Command::Build { planet, kind } => engine.handle_build(planet, kind, out)?,
            Command::Cancel { planet, order } => engine.handle_cancel(planet, order, out)?,
            Command::Send { source, destination, ships } => engine.handle_send(source, destination, &ships, out)?,
            Command::Fight => engine.handle_decision(BattleDecision::Fight, out)?,
            Command::Withdraw => engine.handle_decision(BattleDecision::Withdraw, out)?,
            Command::Retreat { planet } => engine.handle_retreat(planet, out)?,
            Command::Advance => engine.handle_advance(out)?,
            Command::Score => engine.handle_score(out)?,
            Command::Snapshot => engine.handle_snapshot(out)?,
            Command::Restore { json } => engine.handle_restore(&json, out)?,
            Command::Quit => break,
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

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, "invalid configuration");
                return ExitCode::FAILURE;
            }
        },
        None => EngineConfig::default(),
    };

    let mut engine = Engine::with_config(config);
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    match serve(&mut engine, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "protocol loop failed");
            ExitCode::FAILURE
        }
    }
}
