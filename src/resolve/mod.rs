//! Turn resolution.
//!
//! Everything that mutates the world in response to commands or the passage
//! of a turn lives here. The phase module sequences the rest.

pub mod build;
pub mod combat;
pub mod conquest;
pub mod error;
pub mod phase;
pub mod travel;
pub mod withdraw;

pub use build::{cancel_build, issue_build, CANCEL_REFUND};
pub use combat::{distribute_damage, resolve, CombatResult, TerritoryOutcome};
pub use error::CommandError;
pub use phase::{advance_turn, submit_battle_decision, submit_retreat_destination, BattleDecision, TurnOutcome};
pub use travel::send_fleet;
pub use withdraw::{plan_retreat, withdrawal_hit, RetreatPlan, Withdrawal};
