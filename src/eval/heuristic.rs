//! Strength, defense, and score.

use crate::world::{Faction, Planet, Ship, World};

/// Sum of attack values of the non-colonizer ships in `ships`.
pub fn fleet_power<'a>(ships: impl IntoIterator<Item = &'a Ship>) -> u32 {
    ships
        .into_iter()
        .filter(|s| !s.is_colonizer())
        .map(|s| s.attack())
        .sum()
}

/// Power an attacker of faction `against` would face at `planet`.
pub fn planet_defense(planet: &Planet, against: Faction) -> u32 {
    fleet_power(planet.garrison.iter().filter(|s| s.owner != against))
}

/// `100 * planets + population + 10 * ships + 20 * enemy ships destroyed`.
pub fn faction_score(world: &World, faction: Faction) -> u64 {
    let planets: Vec<&Planet> = world.owned_planets(faction).collect();
    let population: u64 = planets.iter().map(|p| p.population as u64).sum();
    let ships = world.ships_of(faction).count() as u64;
    let destroyed = world.account(faction).enemy_ships_destroyed as u64;
    100 * planets.len() as u64 + population + 10 * ships + 20 * destroyed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{PlanetId, PlanetSize, Position, Resources, ShipId, ShipKind};

    fn planet() -> Planet {
        Planet::new(PlanetId(0), "Rigel", Position::new(0.0, 0.0), PlanetSize::Small, Resources::ZERO)
    }

    #[test]
    fn colonizers_add_no_power() {
        let ships = vec![
            Ship::new(ShipId(1), ShipKind::Colonizer, Faction::Ai),
            Ship::new(ShipId(2), ShipKind::Frigate, Faction::Ai),
            Ship::new(ShipId(3), ShipKind::Scout, Faction::Ai),
        ];
        assert_eq!(fleet_power(&ships), 15);
        assert_eq!(fleet_power(&ships[..1]), 0);
    }

    #[test]
    fn defense_ignores_the_attackers_own_ships() {
        let mut p = planet();
        p.garrison.push(Ship::new(ShipId(1), ShipKind::Cruiser, Faction::Human));
        p.garrison.push(Ship::new(ShipId(2), ShipKind::Scout, Faction::Ai));
        assert_eq!(planet_defense(&p, Faction::Ai), 30);
        assert_eq!(planet_defense(&p, Faction::Human), 5);
    }

    #[test]
    fn score_formula() {
        let mut a = planet();
        a.set_owner(Some(Faction::Human));
        a.population = 37;
        a.garrison.push(Ship::new(ShipId(1), ShipKind::Scout, Faction::Human));
        a.garrison.push(Ship::new(ShipId(2), ShipKind::Scout, Faction::Ai));
        let mut world = World::new(vec![a]);
        world.account_mut(Faction::Human).enemy_ships_destroyed = 2;
        assert_eq!(faction_score(&world, Faction::Human), 100 + 37 + 10 + 40);
        assert_eq!(faction_score(&world, Faction::Ai), 10);
    }
}
