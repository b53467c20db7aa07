//! Strategist-vs-strategist batch games.
//!
//! Each game hands both seats to a strategist, auto-resolves every battle,
//! and records per-turn scores. Games can run in parallel on a rayon pool;
//! records are written as JSONL.

use std::io::Write;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{Difficulty, EngineConfig, MapSize};
use crate::engine::{Engine, Progress};
use crate::eval::GameStatus;
use crate::world::Faction;

/// Configuration for a self-play batch.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    pub num_games: usize,
    /// Turns after which an unfinished game is recorded as in progress.
    pub max_turns: u32,
    pub map_size: MapSize,
    /// Strategist level for the human seat.
    pub human: Difficulty,
    /// Strategist level for the ai seat.
    pub ai: Difficulty,
    /// Profile overrides and other settings shared by every game.
    pub engine: EngineConfig,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            max_turns: 200,
            map_size: MapSize::Small,
            human: Difficulty::Normal,
            ai: Difficulty::Normal,
            engine: EngineConfig::default(),
            threads: 1,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnScore {
    pub turn: u32,
    pub human: u64,
    pub ai: u64,
}

/// One finished (or abandoned) game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: usize,
    pub map_seed: u64,
    pub status: GameStatus,
    pub turns: u32,
    pub scores: Vec<TurnScore>,
}

impl GameRecord {
    pub fn winner(&self) -> Option<Faction> {
        match self.status {
            GameStatus::Won(f) => Some(f),
            _ => None,
        }
    }
}

/// Plays one game to completion or `max_turns`.
pub fn play_game(config: &SelfPlayConfig, game_id: usize, map_seed: u64, rng: SmallRng) -> GameRecord {
    let engine_config = EngineConfig {
        difficulty: config.ai,
        map_size: config.map_size,
        map_seed,
        ..config.engine.clone()
    };
    let mut engine = Engine::with_rng(engine_config, rng);
    engine.enable_autopilot(config.human);

    let mut scores = Vec::new();
    while engine.world.turn < config.max_turns {
        match engine.advance() {
            Ok(Progress::TurnComplete(report)) => {
                scores.push(TurnScore {
                    turn: report.turn,
                    human: engine.score(Faction::Human),
                    ai: engine.score(Faction::Ai),
                });
                if report.status != GameStatus::InProgress {
                    break;
                }
            }
            Ok(other) => {
                warn!(game_id, ?other, "self-play game paused for a decision");
                break;
            }
            Err(e) => {
                warn!(game_id, error = %e, "self-play game stopped");
                break;
            }
        }
    }

    GameRecord {
        game_id,
        map_seed,
        status: engine.status,
        turns: engine.world.turn,
        scores,
    }
}

fn game_seeds(config: &SelfPlayConfig, game_id: usize) -> (u64, SmallRng) {
    if config.seed != 0 {
        let base = config.seed.wrapping_add(game_id as u64);
        (base, SmallRng::seed_from_u64(base.rotate_left(17)))
    } else {
        let mut entropy = SmallRng::from_entropy();
        (entropy.gen(), entropy)
    }
}

fn play_logged(config: &SelfPlayConfig, game_id: usize) -> GameRecord {
    let (map_seed, rng) = game_seeds(config, game_id);
    let start = Instant::now();
    let game = play_game(config, game_id, map_seed, rng);
    info!(
        game = game_id + 1,
        of = config.num_games,
        outcome = outcome_name(game.status),
        turns = game.turns,
        secs = start.elapsed().as_secs_f64(),
        "game finished"
    );
    game
}

/// Runs the batch. With `threads > 1` games are played on a rayon pool.
/// Records come back ordered by game id.
pub fn run_self_play(config: &SelfPlayConfig) -> Result<Vec<GameRecord>, rayon::ThreadPoolBuildError> {
    if config.threads <= 1 {
        return Ok((0..config.num_games).map(|i| play_logged(config, i)).collect());
    }

    use rayon::prelude::*;
    let pool = rayon::ThreadPoolBuilder::new().num_threads(config.threads).build()?;
    Ok(pool.install(|| {
        (0..config.num_games)
            .into_par_iter()
            .map(|i| play_logged(config, i))
            .collect()
    }))
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

fn outcome_name(status: GameStatus) -> &'static str {
    match status {
        GameStatus::Won(Faction::Human) => "human wins",
        GameStatus::Won(Faction::Ai) => "ai wins",
        GameStatus::Draw => "draw",
        GameStatus::InProgress => "unfinished",
    }
}

/// Prints a summary of self-play results to stderr.
pub fn print_summary(games: &[GameRecord]) {
    let total = games.len();
    let human = games.iter().filter(|g| g.winner() == Some(Faction::Human)).count();
    let ai = games.iter().filter(|g| g.winner() == Some(Faction::Ai)).count();
    let draws = games.iter().filter(|g| g.status == GameStatus::Draw).count();
    let unfinished = total - human - ai - draws;
    let turns: u64 = games.iter().map(|g| g.turns as u64).sum();
    let pct = |n: usize| 100.0 * n as f64 / total.max(1) as f64;

    eprintln!("=== Self-Play Summary ===");
    eprintln!("Games: {}", total);
    eprintln!("Avg turns/game: {:.1}", turns as f64 / total.max(1) as f64);
    eprintln!("  human: {} ({:.1}%)", human, pct(human));
    eprintln!("     ai: {} ({:.1}%)", ai, pct(ai));
    eprintln!("  draws: {}", draws);
    eprintln!("  unfinished: {}", unfinished);
}
