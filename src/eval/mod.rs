//! Position evaluation.
//!
//! Strength and defense measures shared by the combat resolver and the
//! strategist, the per-faction score, and the victory check.

pub(crate) mod heuristic;
pub mod outcome;

pub use heuristic::{faction_score, fleet_power, planet_defense};
pub use outcome::{check_victory, GameStatus};
