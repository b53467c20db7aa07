//! Simulation data model.
//!
//! Contains the ship stat table, planets, fleets, resource accounts, the
//! turn event log, and the `World` aggregate that owns all of them.

pub mod event;
pub mod faction;
pub mod fleet;
pub mod planet;
pub mod resources;
pub mod setup;
pub mod ship;
pub mod state;

pub use event::{NeutralizeReason, TurnEvent};
pub use faction::{Faction, ALL_FACTIONS};
pub use fleet::{Fleet, FleetId};
pub use planet::{BuildOrder, BuildOrderId, Planet, PlanetId, PlanetSize, Position};
pub use resources::{FactionAccount, Resources};
pub use setup::generate_galaxy;
pub use ship::{Ship, ShipId, ShipKind, ShipStats, ALL_SHIP_KINDS, SHIP_STATS};
pub use state::{
    PendingBattle, PendingConquest, PendingRetreat, TurnPhase, World, CONQUEST_TURNS,
};
