//! Victory check.

use serde::{Deserialize, Serialize};

use crate::world::{Faction, World, ALL_FACTIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "winner", rename_all = "lowercase")]
pub enum GameStatus {
    InProgress,
    Won(Faction),
    /// Both factions were eliminated by the same check.
    Draw,
}

/// A faction is eliminated when it owns no planets and has no colonizer
/// anywhere, stationed or in transit.
pub fn is_eliminated(world: &World, faction: Faction) -> bool {
    world.owned_planets(faction).next().is_none() && !world.has_colonizer(faction)
}

/// Returns the game status after a completed turn.
pub fn check_victory(world: &World) -> GameStatus {
    let eliminated: Vec<Faction> = ALL_FACTIONS
        .iter()
        .copied()
        .filter(|&f| is_eliminated(world, f))
        .collect();
    match eliminated.as_slice() {
        [] => GameStatus::InProgress,
        [loser] => GameStatus::Won(loser.opponent()),
        _ => GameStatus::Draw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Fleet, Planet, PlanetId, PlanetSize, Position, Resources, ShipKind};

    fn world_with_owner(owner: Option<Faction>) -> World {
        let mut p = Planet::new(PlanetId(0), "Deneb", Position::new(0.0, 0.0), PlanetSize::Small, Resources::ZERO);
        p.set_owner(owner);
        let q = Planet::new(PlanetId(1), "Mizar", Position::new(50.0, 0.0), PlanetSize::Small, Resources::ZERO);
        World::new(vec![p, q])
    }

    #[test]
    fn both_present_is_in_progress() {
        let mut world = world_with_owner(Some(Faction::Human));
        world.planets[1].set_owner(Some(Faction::Ai));
        assert_eq!(check_victory(&world), GameStatus::InProgress);
    }

    #[test]
    fn planetless_without_colonizer_loses() {
        let world = world_with_owner(Some(Faction::Human));
        assert_eq!(check_victory(&world), GameStatus::Won(Faction::Human));
    }

    #[test]
    fn colonizer_in_transit_keeps_faction_alive() {
        let mut world = world_with_owner(Some(Faction::Human));
        let colonizer = world.spawn_ship(ShipKind::Colonizer, Faction::Ai);
        let id = world.next_fleet_id();
        world.fleets.push(Fleet {
            id,
            ships: vec![colonizer],
            source: PlanetId(0),
            destination: PlanetId(1),
            turns_remaining: 3,
            total_turns: 3,
            owner: Faction::Ai,
        });
        assert_eq!(check_victory(&world), GameStatus::InProgress);
    }

    #[test]
    fn mutual_elimination_is_a_draw() {
        let world = world_with_owner(None);
        assert_eq!(check_victory(&world), GameStatus::Draw);
    }
}
