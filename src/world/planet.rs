//! Planets: ownership, population, yields, garrison, and build queue.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::faction::Faction;
use super::resources::Resources;
use super::ship::{Ship, ShipKind};

/// Planet identity. Planets are never removed, so the id doubles as the
/// index into `World::planets`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanetId(pub u32);

impl PlanetId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Map position in galaxy units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanetSize {
    Small,
    Medium,
    Large,
}

impl PlanetSize {
    /// Population cap for a freshly generated planet of this size.
    pub const fn max_population(self) -> u32 {
        match self {
            PlanetSize::Small => 60,
            PlanetSize::Medium => 100,
            PlanetSize::Large => 160,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildOrderId(pub u32);

/// One queued ship. Only the head of a planet's queue counts down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOrder {
    pub id: BuildOrderId,
    pub kind: ShipKind,
    pub turns_remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub id: PlanetId,
    pub name: String,
    pub position: Position,
    pub size: PlanetSize,
    pub owner: Option<Faction>,
    pub population: u32,
    pub max_population: u32,
    /// Resources added to the owner's stockpile every turn.
    pub yields: Resources,
    pub garrison: Vec<Ship>,
    pub build_queue: VecDeque<BuildOrder>,
    /// Previous owner, set when an uncolonized attack emptied the planet this
    /// turn. Cleared by every neutralization phase.
    pub contested_by: Option<Faction>,
}

impl Planet {
    /// Creates an unowned, empty planet.
    pub fn new(id: PlanetId, name: impl Into<String>, position: Position, size: PlanetSize, yields: Resources) -> Self {
        Planet {
            id,
            name: name.into(),
            position,
            size,
            owner: None,
            population: 0,
            max_population: size.max_population(),
            yields,
            garrison: Vec::new(),
            build_queue: VecDeque::new(),
            contested_by: None,
        }
    }

    pub fn distance_to(&self, other: &Planet) -> f64 {
        self.position.distance(&other.position)
    }

    pub fn is_neutral(&self) -> bool {
        self.owner.is_none()
    }

    /// Ships stationed here that belong to `faction`.
    pub fn ships_of(&self, faction: Faction) -> impl Iterator<Item = &Ship> + '_ {
        self.garrison.iter().filter(move |s| s.owner == faction)
    }

    pub fn count_of(&self, faction: Faction) -> usize {
        self.ships_of(faction).count()
    }

    /// True if any stationed ship belongs to someone other than `faction`.
    pub fn has_ships_hostile_to(&self, faction: Faction) -> bool {
        self.garrison.iter().any(|s| s.owner != faction)
    }

    /// Removes and returns every stationed ship belonging to `faction`.
    pub fn take_ships_of(&mut self, faction: Faction) -> Vec<Ship> {
        let (taken, kept): (Vec<Ship>, Vec<Ship>) =
            std::mem::take(&mut self.garrison).into_iter().partition(|s| s.owner == faction);
        self.garrison = kept;
        taken
    }

    /// Removes and returns every stationed ship not belonging to `faction`.
    pub fn take_ships_hostile_to(&mut self, faction: Faction) -> Vec<Ship> {
        let (taken, kept): (Vec<Ship>, Vec<Ship>) =
            std::mem::take(&mut self.garrison).into_iter().partition(|s| s.owner != faction);
        self.garrison = kept;
        taken
    }

    /// Transfers ownership, resetting the contest flag.
    pub fn set_owner(&mut self, owner: Option<Faction>) {
        self.owner = owner;
        self.contested_by = None;
    }
}
