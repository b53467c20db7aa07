//! JSON session snapshots.
//!
//! A snapshot carries everything needed to resume a session mid-turn: the
//! world (including any suspended phase cursor), both strategists' memory,
//! the game status, and the configuration in force.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EngineConfig;
use crate::eval::GameStatus;
use crate::strategist::Strategist;
use crate::world::{Faction, World};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot version {0}")]
    Version(u32),

    #[error("inconsistent snapshot: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    pub config: EngineConfig,
    pub status: GameStatus,
    pub world: World,
    pub ai: Strategist,
    /// Strategist driving the human seat in self-play.
    #[serde(default)]
    pub autopilot: Option<Strategist>,
}

/// Encodes a snapshot as a single line of JSON.
pub fn encode_snapshot(snapshot: &SessionSnapshot) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(snapshot)?)
}

/// Decodes and checks a snapshot. Nothing is applied on error.
pub fn decode_snapshot(json: &str) -> Result<SessionSnapshot, SnapshotError> {
    let snapshot: SessionSnapshot = serde_json::from_str(json)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::Version(snapshot.version));
    }
    snapshot.world.validate().map_err(SnapshotError::Invalid)?;
    if snapshot.ai.faction != Faction::Ai {
        return Err(SnapshotError::Invalid("ai strategist plays the wrong faction".to_string()));
    }
    if let Some(autopilot) = &snapshot.autopilot {
        if autopilot.faction != Faction::Human {
            return Err(SnapshotError::Invalid("autopilot plays the wrong faction".to_string()));
        }
    }
    snapshot.ai.profile.validate("ai").map_err(|e| SnapshotError::Invalid(e.to_string()))?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, MapSize};
    use crate::world::{generate_galaxy, PendingBattle, PlanetId, TurnPhase};

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            version: SNAPSHOT_VERSION,
            config: EngineConfig::default(),
            status: GameStatus::InProgress,
            world: generate_galaxy(MapSize::Small, 3),
            ai: Strategist::new(Faction::Ai, Difficulty::Normal.profile()),
            autopilot: None,
        }
    }

    #[test]
    fn snapshot_survives_json() {
        let mut original = snapshot();
        original.world.phase = TurnPhase::Building { next_planet: 2 };
        original.world.pending_battle = Some(PendingBattle {
            planet: PlanetId(1),
            attacker: Faction::Ai,
            attackers: Vec::new(),
            is_defending: true,
        });
        original.ai.memory.record(PlanetId(4), 2);
        let json = encode_snapshot(&original).unwrap();
        assert!(!json.contains('\n'));
        assert_eq!(decode_snapshot(&json).unwrap(), original);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(decode_snapshot("{not json"), Err(SnapshotError::Json(_))));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut original = snapshot();
        original.version = 99;
        let json = encode_snapshot(&original).unwrap();
        assert!(matches!(decode_snapshot(&json), Err(SnapshotError::Version(99))));
    }

    #[test]
    fn dangling_reference_is_rejected() {
        let mut original = snapshot();
        original.world.pending_conquests.push(crate::world::PendingConquest {
            planet: PlanetId(500),
            claimant: Faction::Ai,
            turns_remaining: 2,
        });
        let json = encode_snapshot(&original).unwrap();
        assert!(matches!(decode_snapshot(&json), Err(SnapshotError::Invalid(_))));
    }

    #[test]
    fn suspension_without_a_decision_is_rejected() {
        let mut original = snapshot();
        original.world.phase = TurnPhase::Building { next_planet: 2 };
        let json = encode_snapshot(&original).unwrap();
        assert!(matches!(decode_snapshot(&json), Err(SnapshotError::Invalid(_))));
    }

    #[test]
    fn swapped_strategist_is_rejected() {
        let mut original = snapshot();
        original.ai.faction = Faction::Human;
        let json = encode_snapshot(&original).unwrap();
        assert!(matches!(decode_snapshot(&json), Err(SnapshotError::Invalid(_))));
    }
}
