//! Command rejection reasons.
//!
//! A rejected command never changes the world; the caller only learns why.

use thiserror::Error;

use crate::world::{BuildOrderId, PlanetId, ShipId, ShipKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown planet {}", .0 .0)]
    UnknownPlanet(PlanetId),

    #[error("unknown ship {}", .0 .0)]
    UnknownShip(ShipId),

    #[error("no build order {} on planet {}", .order.0, .planet.0)]
    UnknownBuildOrder { planet: PlanetId, order: BuildOrderId },

    #[error("planet {} is not yours", .0 .0)]
    NotOwner(PlanetId),

    #[error("cannot afford {}", .0.name())]
    InsufficientResources(ShipKind),

    #[error("no ships selected")]
    EmptySelection,

    #[error("destination equals source")]
    SameSourceAndDestination,

    #[error("a battle or retreat decision is pending")]
    DecisionPending,

    #[error("no battle is awaiting a decision")]
    NoPendingBattle,

    #[error("no retreat is awaiting a destination")]
    NoPendingRetreat,

    #[error("planet {} is not a valid retreat destination", .0 .0)]
    InvalidRetreatDestination(PlanetId),

    #[error("the game is over")]
    GameOver,
}
