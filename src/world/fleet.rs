//! Fleets in transit between planets.

use serde::{Deserialize, Serialize};

use super::faction::Faction;
use super::planet::PlanetId;
use super::ship::Ship;

/// Galaxy units covered per turn by one point of speed.
pub const DISTANCE_PER_SPEED: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FleetId(pub u32);

/// A group of ships travelling from one planet to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fleet {
    pub id: FleetId,
    pub ships: Vec<Ship>,
    pub source: PlanetId,
    pub destination: PlanetId,
    pub turns_remaining: u32,
    /// Original trip length, kept for progress display.
    pub total_turns: u32,
    pub owner: Faction,
}

impl Fleet {
    pub fn has_colonizer(&self) -> bool {
        self.ships.iter().any(|s| s.is_colonizer())
    }

    /// Mean speed of the ships, clamped to at least 1.
    pub fn average_speed(ships: &[Ship]) -> f64 {
        if ships.is_empty() {
            return 1.0;
        }
        let total: u32 = ships.iter().map(|s| s.kind.speed()).sum();
        (total as f64 / ships.len() as f64).max(1.0)
    }

    /// Turns needed to cover `distance` with the given ships. Never less than 1.
    pub fn travel_turns(ships: &[Ship], distance: f64) -> u32 {
        let per_turn = Self::average_speed(ships) * DISTANCE_PER_SPEED;
        let turns = (distance / per_turn).ceil();
        if turns.is_finite() && turns >= 1.0 {
            turns as u32
        } else {
            1
        }
    }

    /// Progress through the trip in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.total_turns == 0 {
            return 1.0;
        }
        1.0 - self.turns_remaining as f64 / self.total_turns as f64
    }
}
