//! The computer-controlled faction.
//!
//! A `Strategist` is driven entirely by its `DifficultyProfile`. Once per
//! completed turn it observes the turn's events, then places builds and
//! dispatches fleets through the same commands a player uses.

pub mod build;
pub mod dispatch;
pub mod targeting;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DifficultyProfile;
use crate::random::UniformSource;
use crate::world::{Faction, FleetId, PlanetId, ShipKind, TurnEvent, World};

/// Turns an attack stays in memory.
pub const MEMORY_TURNS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRecord {
    pub planet: PlanetId,
    pub turn: u32,
}

/// Recent successful enemy attacks on the strategist's planets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackMemory {
    records: Vec<AttackRecord>,
}

impl AttackMemory {
    pub fn record(&mut self, planet: PlanetId, turn: u32) {
        self.records.push(AttackRecord { planet, turn });
    }

    /// Drops records more than `MEMORY_TURNS` old as of `turn`.
    pub fn expire(&mut self, turn: u32) {
        self.records.retain(|r| turn.saturating_sub(r.turn) <= MEMORY_TURNS);
    }

    /// The most recently attacked planet.
    pub fn latest(&self) -> Option<PlanetId> {
        self.records.iter().max_by_key(|r| r.turn).map(|r| r.planet)
    }

    pub fn records(&self) -> &[AttackRecord] {
        &self.records
    }
}

/// What a strategist did on its turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategistReport {
    pub builds: Vec<(PlanetId, ShipKind)>,
    pub fleets: Vec<FleetId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategist {
    pub faction: Faction,
    pub profile: DifficultyProfile,
    #[serde(default)]
    pub memory: AttackMemory,
}

impl Strategist {
    pub fn new(faction: Faction, profile: DifficultyProfile) -> Self {
        Strategist { faction, profile, memory: AttackMemory::default() }
    }

    /// Records successful enemy attacks on our planets from a completed turn.
    pub fn observe(&mut self, events: &[TurnEvent], turn: u32) {
        for event in events {
            if let TurnEvent::BattleResolved { planet, attacker, previous_owner: Some(owner), attacker_won: true, .. } = event {
                if *owner == self.faction && *attacker != self.faction {
                    debug!(faction = self.faction.name(), planet = planet.0, "attack remembered");
                    self.memory.record(*planet, turn);
                }
            }
        }
        self.memory.expire(turn);
    }

    /// Builds, then moves.
    pub fn take_turn(&mut self, world: &mut World, rng: &mut impl UniformSource) -> StrategistReport {
        let builds = build::plan_builds(world, self.faction, &self.profile, rng);
        let fleets = if self.profile.fleet_coordination {
            let counter_target = if self.profile.counter_attack_enabled { self.memory.latest() } else { None };
            dispatch::coordinated(world, self.faction, &self.profile, counter_target, rng)
        } else {
            dispatch::uncoordinated(world, self.faction, &self.profile, rng)
        };
        debug!(
            faction = self.faction.name(),
            turn = world.turn,
            builds = builds.len(),
            fleets = fleets.len(),
            "strategist turn"
        );
        StrategistReport { builds, fleets }
    }
}
