use proptest::prelude::*;

use starclaim::config::MapSize;
use starclaim::random::ScriptedSource;
use starclaim::resolve::resolve;
use starclaim::world::{
    generate_galaxy, Faction, Planet, PlanetId, PlanetSize, Position, Resources, Ship, ShipId, ShipKind,
    ALL_SHIP_KINDS,
};

fn arb_kind() -> impl Strategy<Value = ShipKind> {
    (0..ALL_SHIP_KINDS.len()).prop_map(|i| ALL_SHIP_KINDS[i])
}

prop_compose! {
    fn arb_ship()(kind in arb_kind(), damage in 0.0f64..1.0) -> (ShipKind, f64) {
        (kind, damage)
    }
}

fn fleet(specs: &[(ShipKind, f64)], owner: Faction, first_id: u32) -> Vec<Ship> {
    specs
        .iter()
        .enumerate()
        .map(|(i, &(kind, damage))| {
            let mut ship = Ship::new(ShipId(first_id + i as u32), kind, owner);
            let max = ship.max_hp();
            ship.hp = (max - (max as f64 * damage) as u32).max(1);
            ship
        })
        .collect()
}

fn warships(ships: &[Ship]) -> usize {
    ships.iter().filter(|s| !s.is_colonizer()).count()
}

fn battleground(owned: bool) -> Planet {
    let mut planet = Planet::new(PlanetId(0), "Vega", Position::new(0.0, 0.0), PlanetSize::Medium, Resources::new(3, 3, 3));
    if owned {
        planet.set_owner(Some(Faction::Ai));
        planet.population = 30;
    }
    planet
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn combat_accounts_for_every_warship(
        attackers in prop::collection::vec(arb_ship(), 0..8),
        defenders in prop::collection::vec(arb_ship(), 0..8),
        rolls in prop::collection::vec(0.0f64..1.0, 1..32),
        owned in any::<bool>(),
    ) {
        let attackers = fleet(&attackers, Faction::Human, 1);
        let defenders = fleet(&defenders, Faction::Ai, 100);
        let (att_before, def_before) = (warships(&attackers), warships(&defenders));
        let mut planet = battleground(owned);
        let mut rng = ScriptedSource::new(rolls);

        let result = resolve(Faction::Human, attackers, defenders, &mut planet, &mut rng);

        prop_assert_eq!(warships(&result.attackers_destroyed) + warships(&result.attacker_survivors), att_before);
        prop_assert_eq!(warships(&result.defenders_destroyed) + warships(&result.defender_survivors), def_before);
        for ship in result.attacker_survivors.iter().chain(result.defender_survivors.iter()) {
            prop_assert!(ship.hp >= 1 && ship.hp <= ship.max_hp());
        }
        for ship in &planet.garrison {
            prop_assert!(ship.hp >= 1 && ship.hp <= ship.max_hp());
        }
    }

    #[test]
    fn combat_repeats_under_the_same_rolls(
        attackers in prop::collection::vec(arb_ship(), 0..6),
        defenders in prop::collection::vec(arb_ship(), 0..6),
        rolls in prop::collection::vec(0.0f64..1.0, 1..16),
        owned in any::<bool>(),
    ) {
        let attackers = fleet(&attackers, Faction::Human, 1);
        let defenders = fleet(&defenders, Faction::Ai, 100);

        let mut planet_a = battleground(owned);
        let mut planet_b = battleground(owned);
        let a = resolve(Faction::Human, attackers.clone(), defenders.clone(), &mut planet_a, &mut ScriptedSource::new(rolls.clone()));
        let b = resolve(Faction::Human, attackers, defenders, &mut planet_b, &mut ScriptedSource::new(rolls));

        prop_assert_eq!(a, b);
        prop_assert_eq!(planet_a, planet_b);
    }

    #[test]
    fn galaxy_layout_depends_only_on_seed(seed in any::<u64>()) {
        let a = generate_galaxy(MapSize::Small, seed);
        let b = generate_galaxy(MapSize::Small, seed);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.planets.len(), 10);
        prop_assert_eq!(a.owned_planets(Faction::Human).count(), 1);
        prop_assert_eq!(a.owned_planets(Faction::Ai).count(), 1);
    }
}
