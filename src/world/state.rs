//! The World aggregate: every piece of mutable simulation state.
//!
//! The simulation core is the only writer. External layers read snapshots
//! and submit commands; nothing here is global.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::event::TurnEvent;
use super::faction::Faction;
use super::fleet::{Fleet, FleetId};
use super::planet::{BuildOrderId, Planet, PlanetId};
use super::resources::FactionAccount;
use super::ship::{Ship, ShipId, ShipKind};

/// Turns a victorious colonizer fleet must hold an owned planet before it flips.
pub const CONQUEST_TURNS: u32 = 3;

/// An ownership transfer counting down on an already-owned planet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingConquest {
    pub planet: PlanetId,
    pub claimant: Faction,
    pub turns_remaining: u32,
}

/// A battle waiting for the interactive faction to fight or withdraw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBattle {
    pub planet: PlanetId,
    /// Faction of the attacking ships.
    pub attacker: Faction,
    /// Attacking ships, held outside the garrison until the decision.
    pub attackers: Vec<Ship>,
    /// True when the interactive faction is the defending side.
    pub is_defending: bool,
}

/// Withdrawal survivors waiting for a destination choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRetreat {
    pub from: PlanetId,
    pub faction: Faction,
    pub ships: Vec<Ship>,
    pub candidates: Vec<PlanetId>,
    /// Ships lost to the parting volley.
    #[serde(default)]
    pub lost: u32,
}

/// Where the orchestrator is within the current turn.
///
/// Only the build and arrival phases can suspend, so only they carry a
/// resume cursor. Every other phase runs to completion in one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum TurnPhase {
    #[default]
    Idle,
    Building { next_planet: usize },
    Arrivals { queue: VecDeque<Fleet> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub turn: u32,
    pub planets: Vec<Planet>,
    pub fleets: Vec<Fleet>,
    /// Indexed by `Faction::index()`.
    pub accounts: [FactionAccount; 2],
    pub pending_conquests: Vec<PendingConquest>,
    pub pending_battle: Option<PendingBattle>,
    pub pending_retreat: Option<PendingRetreat>,
    pub phase: TurnPhase,
    /// Faction whose battles pause for a decision. `None` auto-resolves everything.
    pub interactive: Option<Faction>,
    pub events: Vec<TurnEvent>,
    next_ship_id: u32,
    next_fleet_id: u32,
    next_order_id: u32,
}

impl World {
    /// Creates a world with the given planets and no ships or fleets.
    pub fn new(planets: Vec<Planet>) -> Self {
        World {
            turn: 0,
            planets,
            fleets: Vec::new(),
            accounts: [FactionAccount::default(), FactionAccount::default()],
            pending_conquests: Vec::new(),
            pending_battle: None,
            pending_retreat: None,
            phase: TurnPhase::Idle,
            interactive: Some(Faction::Human),
            events: Vec::new(),
            next_ship_id: 1,
            next_fleet_id: 1,
            next_order_id: 1,
        }
    }

    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.get(id.index())
    }

    pub fn planet_mut(&mut self, id: PlanetId) -> Option<&mut Planet> {
        self.planets.get_mut(id.index())
    }

    pub fn account(&self, faction: Faction) -> &FactionAccount {
        &self.accounts[faction.index()]
    }

    pub fn account_mut(&mut self, faction: Faction) -> &mut FactionAccount {
        &mut self.accounts[faction.index()]
    }

    pub fn fleet(&self, id: FleetId) -> Option<&Fleet> {
        self.fleets.iter().find(|f| f.id == id)
    }

    /// Instantiates a full-health ship with a fresh id. Does not place it.
    pub fn spawn_ship(&mut self, kind: ShipKind, owner: Faction) -> Ship {
        let id = ShipId(self.next_ship_id);
        self.next_ship_id += 1;
        Ship::new(id, kind, owner)
    }

    pub fn next_fleet_id(&mut self) -> FleetId {
        let id = FleetId(self.next_fleet_id);
        self.next_fleet_id += 1;
        id
    }

    pub fn next_order_id(&mut self) -> BuildOrderId {
        let id = BuildOrderId(self.next_order_id);
        self.next_order_id += 1;
        id
    }

    /// True while a turn is mid-sequence (suspended on a decision).
    pub fn is_suspended(&self) -> bool {
        self.phase != TurnPhase::Idle || self.pending_battle.is_some() || self.pending_retreat.is_some()
    }

    pub fn owned_planets(&self, faction: Faction) -> impl Iterator<Item = &Planet> + '_ {
        self.planets.iter().filter(move |p| p.owner == Some(faction))
    }

    /// Every ship of `faction`, stationed or in transit.
    pub fn ships_of(&self, faction: Faction) -> impl Iterator<Item = &Ship> + '_ {
        let stationed = self.planets.iter().flat_map(|p| p.garrison.iter());
        let moving = self.fleets.iter().flat_map(|f| f.ships.iter());
        stationed.chain(moving).filter(move |s| s.owner == faction)
    }

    /// Number of non-colonizer ships `faction` has anywhere.
    pub fn military_count(&self, faction: Faction) -> usize {
        self.ships_of(faction).filter(|s| !s.is_colonizer()).count()
    }

    /// True if `faction` has a colonizer stationed anywhere or in transit.
    pub fn has_colonizer(&self, faction: Faction) -> bool {
        self.ships_of(faction).any(|s| s.is_colonizer())
    }

    /// Checks that every cross-reference in the world points at something real.
    /// Used when accepting a restored snapshot.
    pub fn validate(&self) -> Result<(), String> {
        for (i, planet) in self.planets.iter().enumerate() {
            if planet.id.index() != i {
                return Err(format!("planet at index {} has id {}", i, planet.id.0));
            }
            if let Some(ship) = planet.garrison.iter().find(|s| s.hp == 0 || s.hp > s.max_hp()) {
                return Err(format!("ship {} has invalid hp {}", ship.id.0, ship.hp));
            }
        }
        for fleet in &self.fleets {
            if self.planet(fleet.source).is_none() || self.planet(fleet.destination).is_none() {
                return Err(format!("fleet {} references a missing planet", fleet.id.0));
            }
        }
        if let Some(conquest) = self.pending_conquests.iter().find(|c| self.planet(c.planet).is_none()) {
            return Err(format!("conquest references missing planet {}", conquest.planet.0));
        }
        if let Some(battle) = &self.pending_battle {
            if self.planet(battle.planet).is_none() {
                return Err(format!("pending battle references missing planet {}", battle.planet.0));
            }
        }
        if let Some(retreat) = &self.pending_retreat {
            if let Some(id) = std::iter::once(&retreat.from)
                .chain(retreat.candidates.iter())
                .find(|id| self.planet(**id).is_none())
            {
                return Err(format!("pending retreat references missing planet {}", id.0));
            }
        }
        self.validate_phase()
    }

    /// A suspended turn holds exactly one pending decision, and a pending
    /// decision only exists inside a suspended turn.
    fn validate_phase(&self) -> Result<(), String> {
        let pending = match (&self.pending_battle, &self.pending_retreat) {
            (Some(_), Some(_)) => return Err("both a battle and a retreat are pending".to_string()),
            (None, None) => false,
            _ => true,
        };
        match &self.phase {
            TurnPhase::Idle if pending => Err("decision pending outside a turn".to_string()),
            TurnPhase::Idle => Ok(()),
            _ if !pending => Err("turn suspended with no decision pending".to_string()),
            TurnPhase::Building { next_planet } if *next_planet > self.planets.len() => {
                Err(format!("build cursor {} is past the last planet", next_planet))
            }
            TurnPhase::Building { .. } => Ok(()),
            TurnPhase::Arrivals { queue } => match queue
                .iter()
                .find(|f| self.planet(f.source).is_none() || self.planet(f.destination).is_none())
            {
                Some(fleet) => Err(format!("queued fleet {} references a missing planet", fleet.id.0)),
                None => Ok(()),
            },
        }
    }
}
