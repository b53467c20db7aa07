//! Typed log of what happened during a turn.
//!
//! Phases append events as they apply changes; the session drains the log
//! once the turn completes and hands it to the strategists and the caller.

use serde::{Deserialize, Serialize};

use super::faction::Faction;
use super::fleet::FleetId;
use super::planet::PlanetId;
use super::ship::{ShipId, ShipKind};

/// Why a planet reverted to neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeutralizeReason {
    /// Attacked without a colonizer and the previous owner has no ships left there.
    Contested,
    /// No owner ships, nothing arriving or completing, and no colonizer anywhere.
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TurnEvent {
    ShipBuilt {
        planet: PlanetId,
        ship: ShipId,
        kind: ShipKind,
        owner: Faction,
    },
    FleetArrived {
        fleet: FleetId,
        planet: PlanetId,
        owner: Faction,
    },
    Colonized {
        planet: PlanetId,
        faction: Faction,
    },
    BattleResolved {
        planet: PlanetId,
        attacker: Faction,
        /// Owner of the planet before the battle.
        previous_owner: Option<Faction>,
        attacker_won: bool,
        attackers_lost: u32,
        defenders_lost: u32,
        rounds: u32,
    },
    Withdrew {
        planet: PlanetId,
        faction: Faction,
        survivors: u32,
        lost: u32,
        destination: Option<PlanetId>,
    },
    ConquestStarted {
        planet: PlanetId,
        claimant: Faction,
    },
    ConquestCompleted {
        planet: PlanetId,
        claimant: Faction,
        population: u32,
    },
    ConquestCancelled {
        planet: PlanetId,
        claimant: Faction,
    },
    Neutralized {
        planet: PlanetId,
        previous_owner: Faction,
        reason: NeutralizeReason,
    },
}
