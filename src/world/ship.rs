//! Ship kinds, their fixed combat stats, and ship instances.
//!
//! Stats live in a compile-time lookup table indexed by the `ShipKind`
//! discriminant, so every capability query is a single array read.

use serde::{Deserialize, Serialize};

use super::faction::Faction;
use super::resources::Resources;

/// Population needed to shave one turn off a ship's base build time.
pub const POPULATION_PER_BUILD_TURN: u32 = 25;

/// The kind of a ship. Determines every fixed stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ShipKind {
    Colonizer = 0,
    Scout = 1,
    Frigate = 2,
    Destroyer = 3,
    Cruiser = 4,
    Battleship = 5,
}

pub const SHIP_KIND_COUNT: usize = 6;

/// All ship kinds in table order.
pub const ALL_SHIP_KINDS: [ShipKind; SHIP_KIND_COUNT] = [
    ShipKind::Colonizer,
    ShipKind::Scout,
    ShipKind::Frigate,
    ShipKind::Destroyer,
    ShipKind::Cruiser,
    ShipKind::Battleship,
];

/// Fixed per-kind capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipStats {
    pub name: &'static str,
    pub attack: u32,
    pub max_hp: u32,
    pub cost: Resources,
    pub speed: u32,
    pub base_build_turns: u32,
    pub min_build_turns: u32,
}

/// Compile-time stat table: index by `ShipKind as usize`.
pub static SHIP_STATS: [ShipStats; SHIP_KIND_COUNT] = [
    ShipStats { name: "colonizer", attack: 0, max_hp: 30, cost: Resources::new(60, 30, 40), speed: 1, base_build_turns: 3, min_build_turns: 2 },
    ShipStats { name: "scout", attack: 5, max_hp: 20, cost: Resources::new(20, 10, 0), speed: 3, base_build_turns: 1, min_build_turns: 1 },
    ShipStats { name: "frigate", attack: 10, max_hp: 45, cost: Resources::new(40, 20, 0), speed: 2, base_build_turns: 2, min_build_turns: 1 },
    ShipStats { name: "destroyer", attack: 18, max_hp: 70, cost: Resources::new(70, 40, 0), speed: 2, base_build_turns: 3, min_build_turns: 2 },
    ShipStats { name: "cruiser", attack: 30, max_hp: 110, cost: Resources::new(120, 70, 0), speed: 1, base_build_turns: 4, min_build_turns: 2 },
    ShipStats { name: "battleship", attack: 55, max_hp: 200, cost: Resources::new(200, 120, 10), speed: 1, base_build_turns: 6, min_build_turns: 3 },
];

impl ShipKind {
    pub fn stats(self) -> &'static ShipStats {
        &SHIP_STATS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.stats().name
    }

    pub fn attack(self) -> u32 {
        self.stats().attack
    }

    pub fn max_hp(self) -> u32 {
        self.stats().max_hp
    }

    pub fn cost(self) -> Resources {
        self.stats().cost
    }

    pub fn speed(self) -> u32 {
        self.stats().speed
    }

    pub const fn is_colonizer(self) -> bool {
        matches!(self, ShipKind::Colonizer)
    }

    /// Build time on a planet with the given population.
    ///
    /// Every `POPULATION_PER_BUILD_TURN` inhabitants remove one turn, never
    /// going below the kind's minimum.
    pub fn build_turns(self, population: u32) -> u32 {
        let stats = self.stats();
        let reduction = population / POPULATION_PER_BUILD_TURN;
        stats
            .base_build_turns
            .saturating_sub(reduction)
            .max(stats.min_build_turns)
            .max(1)
    }

    /// Looks up a kind by its lowercase name.
    pub fn from_name(name: &str) -> Option<ShipKind> {
        ALL_SHIP_KINDS.iter().copied().find(|k| k.name() == name)
    }
}

/// Unique ship identity within a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipId(pub u32);

/// A single ship. `hp` stays in `1..=kind.max_hp()` while the ship exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    pub id: ShipId,
    pub kind: ShipKind,
    pub hp: u32,
    pub owner: Faction,
}

impl Ship {
    /// Creates a ship at full health.
    pub fn new(id: ShipId, kind: ShipKind, owner: Faction) -> Self {
        Ship { id, kind, hp: kind.max_hp(), owner }
    }

    pub fn is_colonizer(&self) -> bool {
        self.kind.is_colonizer()
    }

    pub fn attack(&self) -> u32 {
        self.kind.attack()
    }

    pub fn max_hp(&self) -> u32 {
        self.kind.max_hp()
    }

    /// Restores up to `amount` hit points, capped at max.
    pub fn repair(&mut self, amount: u32) {
        self.hp = self.hp.saturating_add(amount).min(self.max_hp());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_enum_order() {
        for (i, kind) in ALL_SHIP_KINDS.iter().enumerate() {
            assert_eq!(*kind as usize, i);
            assert_eq!(ShipKind::from_name(kind.name()), Some(*kind));
        }
    }

    #[test]
    fn only_colonizer_is_unarmed() {
        for kind in ALL_SHIP_KINDS {
            assert_eq!(kind.attack() == 0, kind.is_colonizer(), "{}", kind.name());
        }
    }

    #[test]
    fn population_shortens_build_down_to_minimum() {
        assert_eq!(ShipKind::Battleship.build_turns(0), 6);
        assert_eq!(ShipKind::Battleship.build_turns(50), 4);
        assert_eq!(ShipKind::Battleship.build_turns(1000), 3);
        assert_eq!(ShipKind::Scout.build_turns(1000), 1);
    }

    #[test]
    fn new_ship_is_full_health_and_repair_caps() {
        let mut ship = Ship::new(ShipId(1), ShipKind::Frigate, Faction::Human);
        assert_eq!(ship.hp, 45);
        ship.hp = 10;
        ship.repair(9);
        assert_eq!(ship.hp, 19);
        ship.repair(500);
        assert_eq!(ship.hp, 45);
    }

    #[test]
    fn unknown_kind_name() {
        assert_eq!(ShipKind::from_name("dreadnought"), None);
    }
}
