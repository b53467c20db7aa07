//! The two competing factions.

use serde::{Deserialize, Serialize};

/// One of the two factions contesting the galaxy.
///
/// `Human` is the seat normally driven by the input layer; `Ai` is always
/// driven by the strategist. In self-play both seats are automated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Human,
    Ai,
}

/// Both factions in account order.
pub const ALL_FACTIONS: [Faction; 2] = [Faction::Human, Faction::Ai];

impl Faction {
    /// Returns the other faction.
    pub const fn opponent(self) -> Faction {
        match self {
            Faction::Human => Faction::Ai,
            Faction::Ai => Faction::Human,
        }
    }

    /// Returns the lowercase protocol name.
    pub const fn name(self) -> &'static str {
        match self {
            Faction::Human => "human",
            Faction::Ai => "ai",
        }
    }

    /// Parses a faction from its lowercase protocol name.
    pub fn from_name(name: &str) -> Option<Faction> {
        match name {
            "human" => Some(Faction::Human),
            "ai" => Some(Faction::Ai),
            _ => None,
        }
    }

    /// Index into per-faction arrays.
    pub const fn index(self) -> usize {
        self as usize
    }
}
