//! Session state management.
//!
//! Owns the world, both strategists, the game status, and the combat/AI
//! random source. Human commands go through here; once a turn completes
//! the strategists observe the turn's events and take their own turns,
//! then the victory check runs.

use std::io::{self, Write};
use std::path::Path;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::config::{load_config, ConfigError, Difficulty, EngineConfig, MapSize};
use crate::eval::{check_victory, faction_score, GameStatus};
use crate::protocol::{decode_snapshot, encode_snapshot, SessionSnapshot, SNAPSHOT_VERSION};
use crate::resolve::{self, BattleDecision, CommandError, TurnOutcome};
use crate::strategist::{Strategist, StrategistReport};
use crate::world::{
    generate_galaxy, BuildOrderId, Faction, FleetId, PendingBattle, PendingRetreat, PlanetId, Resources, ShipId,
    ShipKind, TurnEvent, World,
};

/// Everything that happened in one completed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub turn: u32,
    pub events: Vec<TurnEvent>,
    /// What the computer-controlled faction did after the turn.
    pub ai: StrategistReport,
    pub status: GameStatus,
}

/// Where a session call left the game.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    TurnComplete(TurnReport),
    AwaitingBattle(PendingBattle),
    AwaitingRetreat(PendingRetreat),
}

pub struct Engine {
    pub config: EngineConfig,
    pub world: World,
    pub status: GameStatus,
    ai: Strategist,
    /// Drives the human seat in self-play.
    autopilot: Option<Strategist>,
    rng: SmallRng,
}

impl Engine {
    /// Creates a session from the default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_rng(config, SmallRng::from_entropy())
    }

    /// Creates a session with an explicit combat/AI random source.
    pub fn with_rng(config: EngineConfig, rng: SmallRng) -> Self {
        let world = generate_galaxy(config.map_size, config.map_seed);
        let ai = Strategist::new(Faction::Ai, config.profile());
        Engine {
            config,
            world,
            status: GameStatus::InProgress,
            ai,
            autopilot: None,
            rng,
        }
    }

    /// Hands the human seat to a strategist. Every battle auto-resolves.
    pub fn enable_autopilot(&mut self, difficulty: Difficulty) {
        self.autopilot = Some(Strategist::new(Faction::Human, self.config.profile_for(difficulty)));
        self.world.interactive = None;
    }

    /// Replaces the world, keeping configuration and strategists.
    pub fn with_world(mut self, world: World) -> Self {
        self.status = GameStatus::InProgress;
        self.world = world;
        self
    }

    /// Discards the session and generates a fresh galaxy from the config.
    pub fn new_game(&mut self) {
        let interactive = self.world.interactive;
        self.world = generate_galaxy(self.config.map_size, self.config.map_seed);
        self.world.interactive = interactive;
        self.status = GameStatus::InProgress;
        self.ai = Strategist::new(Faction::Ai, self.config.profile());
        if let Some(autopilot) = &mut self.autopilot {
            *autopilot = Strategist::new(Faction::Human, autopilot.profile);
        }
        info!(
            map_size = ?self.config.map_size,
            map_seed = self.config.map_seed,
            difficulty = self.config.difficulty.name(),
            "new game"
        );
    }

    /// Sets an engine option. Map options take effect at the next `newgame`.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<(), ConfigError> {
        let value = value.ok_or_else(|| ConfigError::MissingValue { name: name.to_string() })?;
        match name {
            "Difficulty" => {
                self.config.difficulty = Difficulty::from_name(&value.to_lowercase())?;
                self.ai.profile = self.config.profile();
            }
            "MapSize" => {
                self.config.map_size = MapSize::from_name(&value.to_lowercase())?;
            }
            "MapSeed" => {
                self.config.map_seed = value.parse().map_err(|_| ConfigError::InvalidValue {
                    name: name.to_string(),
                    value: value.to_string(),
                })?;
            }
            "Config" => {
                self.config = load_config(Path::new(value))?;
                self.ai.profile = self.config.profile();
            }
            other => return Err(ConfigError::UnknownOption(other.to_string())),
        }
        Ok(())
    }

    pub fn ai(&self) -> &Strategist {
        &self.ai
    }

    pub fn score(&self, faction: Faction) -> u64 {
        faction_score(&self.world, faction)
    }

    fn ensure_open(&self) -> Result<(), CommandError> {
        if self.status != GameStatus::InProgress {
            return Err(CommandError::GameOver);
        }
        if self.world.is_suspended() {
            return Err(CommandError::DecisionPending);
        }
        Ok(())
    }

    pub fn issue_build(&mut self, planet: PlanetId, kind: ShipKind) -> Result<BuildOrderId, CommandError> {
        self.ensure_open()?;
        resolve::issue_build(&mut self.world, Faction::Human, planet, kind)
    }

    pub fn cancel_build(&mut self, planet: PlanetId, order: BuildOrderId) -> Result<Resources, CommandError> {
        self.ensure_open()?;
        resolve::cancel_build(&mut self.world, Faction::Human, planet, order)
    }

    pub fn send_fleet(
        &mut self,
        source: PlanetId,
        ships: &[ShipId],
        destination: PlanetId,
    ) -> Result<FleetId, CommandError> {
        self.ensure_open()?;
        resolve::send_fleet(&mut self.world, Faction::Human, source, ships, destination)
    }

    /// Ends the human turn and runs the turn sequence.
    pub fn advance(&mut self) -> Result<Progress, CommandError> {
        self.ensure_open()?;
        let outcome = resolve::advance_turn(&mut self.world, &mut self.rng)?;
        Ok(self.progress(outcome))
    }

    pub fn submit_battle_decision(&mut self, decision: BattleDecision) -> Result<Progress, CommandError> {
        let outcome = resolve::submit_battle_decision(&mut self.world, decision, &mut self.rng)?;
        Ok(self.progress(outcome))
    }

    pub fn submit_retreat_destination(&mut self, planet: PlanetId) -> Result<Progress, CommandError> {
        let outcome = resolve::submit_retreat_destination(&mut self.world, planet, &mut self.rng)?;
        Ok(self.progress(outcome))
    }

    fn progress(&mut self, outcome: TurnOutcome) -> Progress {
        match outcome {
            TurnOutcome::Completed => Progress::TurnComplete(self.finish_turn()),
            TurnOutcome::AwaitingBattleDecision(battle) => Progress::AwaitingBattle(battle),
            TurnOutcome::AwaitingRetreatDestination(retreat) => Progress::AwaitingRetreat(retreat),
        }
    }

    /// Hands the completed turn to the strategists, then checks for victory.
    fn finish_turn(&mut self) -> TurnReport {
        let turn = self.world.turn;
        let events = std::mem::take(&mut self.world.events);

        if let Some(autopilot) = &mut self.autopilot {
            autopilot.observe(&events, turn);
            autopilot.take_turn(&mut self.world, &mut self.rng);
        }
        self.ai.observe(&events, turn);
        let ai = self.ai.take_turn(&mut self.world, &mut self.rng);

        self.status = check_victory(&self.world);
        match self.status {
            GameStatus::Won(winner) => info!(turn, winner = winner.name(), "victory"),
            GameStatus::Draw => info!(turn, "draw"),
            GameStatus::InProgress => {}
        }
        TurnReport { turn, events, ai, status: self.status }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            version: SNAPSHOT_VERSION,
            config: self.config.clone(),
            status: self.status,
            world: self.world.clone(),
            ai: self.ai.clone(),
            autopilot: self.autopilot.clone(),
        }
    }

    /// Replaces the session with `snapshot`.
    pub fn restore(&mut self, snapshot: SessionSnapshot) {
        self.config = snapshot.config;
        self.status = snapshot.status;
        self.world = snapshot.world;
        self.ai = snapshot.ai;
        self.autopilot = snapshot.autopilot;
    }

    /// Handles the handshake: identity, options, and `hellook`.
    pub fn handle_hello<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "id name starclaim")?;
        writeln!(out, "id author starclaim")?;
        writeln!(
            out,
            "option name Difficulty type combo default {} var easy var normal var hard",
            self.config.difficulty.name()
        )?;
        writeln!(
            out,
            "option name MapSize type combo default {} var small var medium var large",
            map_size_name(self.config.map_size)
        )?;
        writeln!(out, "option name MapSeed type string default {}", self.config.map_seed)?;
        writeln!(out, "option name Config type string default <empty>")?;
        writeln!(out, "protocol_version 1")?;
        writeln!(out, "hellook")?;
        out.flush()
    }

    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    pub fn handle_setoption<W: Write>(&mut self, name: &str, value: Option<&str>, out: &mut W) -> io::Result<()> {
        if let Err(e) = self.set_option(name, value) {
            warn!(option = name, error = %e, "setoption rejected");
            writeln!(out, "rejected {}", e)?;
            out.flush()?;
        }
        Ok(())
    }

    pub fn handle_build<W: Write>(&mut self, planet: PlanetId, kind: ShipKind, out: &mut W) -> io::Result<()> {
        match self.issue_build(planet, kind) {
            Ok(order) => writeln!(out, "ok build {}", order.0)?,
            Err(e) => writeln!(out, "rejected {}", e)?,
        }
        out.flush()
    }

    pub fn handle_cancel<W: Write>(&mut self, planet: PlanetId, order: BuildOrderId, out: &mut W) -> io::Result<()> {
        match self.cancel_build(planet, order) {
            Ok(r) => writeln!(out, "ok cancel refund {} {} {}", r.metal, r.energy, r.food)?,
            Err(e) => writeln!(out, "rejected {}", e)?,
        }
        out.flush()
    }

    pub fn handle_send<W: Write>(
        &mut self,
        source: PlanetId,
        destination: PlanetId,
        ships: &[ShipId],
        out: &mut W,
    ) -> io::Result<()> {
        match self.send_fleet(source, ships, destination) {
            Ok(id) => {
                let eta = self.world.fleet(id).map_or(0, |f| f.turns_remaining);
                writeln!(out, "ok fleet {} eta {}", id.0, eta)?;
            }
            Err(e) => writeln!(out, "rejected {}", e)?,
        }
        out.flush()
    }

    pub fn handle_advance<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let result = self.advance();
        write_progress(result, out)
    }

    pub fn handle_decision<W: Write>(&mut self, decision: BattleDecision, out: &mut W) -> io::Result<()> {
        let result = self.submit_battle_decision(decision);
        write_progress(result, out)
    }

    pub fn handle_retreat<W: Write>(&mut self, planet: PlanetId, out: &mut W) -> io::Result<()> {
        let result = self.submit_retreat_destination(planet);
        write_progress(result, out)
    }

    pub fn handle_score<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "score human {} ai {}",
            self.score(Faction::Human),
            self.score(Faction::Ai)
        )?;
        out.flush()
    }

    pub fn handle_snapshot<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match encode_snapshot(&self.snapshot()) {
            Ok(json) => writeln!(out, "snapshot {}", json)?,
            Err(e) => writeln!(out, "rejected {}", e)?,
        }
        out.flush()
    }

    /// Restores from JSON. The session is untouched if the snapshot is bad.
    pub fn handle_restore<W: Write>(&mut self, json: &str, out: &mut W) -> io::Result<()> {
        match decode_snapshot(json) {
            Ok(snapshot) => {
                self.restore(snapshot);
                writeln!(out, "ok restore turn {}", self.world.turn)?;
            }
            Err(e) => {
                warn!(error = %e, "restore rejected");
                writeln!(out, "rejected {}", e)?;
            }
        }
        out.flush()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn map_size_name(size: MapSize) -> &'static str {
    match size {
        MapSize::Small => "small",
        MapSize::Medium => "medium",
        MapSize::Large => "large",
    }
}

fn write_progress<W: Write>(result: Result<Progress, CommandError>, out: &mut W) -> io::Result<()> {
    match result {
        Ok(Progress::AwaitingBattle(battle)) => {
            writeln!(
                out,
                "battle {} attacker {} defending {} attackers {}",
                battle.planet.0,
                battle.attacker.name(),
                battle.is_defending,
                battle.attackers.len()
            )?;
        }
        Ok(Progress::AwaitingRetreat(retreat)) => {
            let ids: Vec<String> = retreat.candidates.iter().map(|p| p.0.to_string()).collect();
            writeln!(out, "retreat choose {}", ids.join(" "))?;
        }
        Ok(Progress::TurnComplete(report)) => {
            for event in &report.events {
                match serde_json::to_string(event) {
                    Ok(json) => writeln!(out, "event {}", json)?,
                    Err(e) => warn!(error = %e, "event not encodable"),
                }
            }
            writeln!(out, "turn {} complete", report.turn)?;
            match report.status {
                GameStatus::Won(winner) => writeln!(out, "victory {}", winner.name())?,
                GameStatus::Draw => writeln!(out, "draw")?,
                GameStatus::InProgress => {}
            }
        }
        Err(e) => writeln!(out, "rejected {}", e)?,
    }
    out.flush()
}
