//! Withdrawing from a battle instead of fighting it.
//!
//! The withdrawing side takes one parting volley from the other side and the
//! survivors fall back to another planet their faction owns.

use crate::random::UniformSource;
use crate::world::{Faction, PlanetId, Ship, World};

use super::combat::distribute_damage;

/// The parting volley is the opposing power times a factor in this range.
pub const WITHDRAW_PENALTY: (f64, f64) = (0.30, 0.40);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    pub survivors: Vec<Ship>,
    pub lost: Vec<Ship>,
    pub damage: u32,
}

/// Where withdrawal survivors can go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetreatPlan {
    /// No other owned planet: the survivors are lost.
    Lost,
    /// Exactly one owned planet: they go there at once.
    Relocate(PlanetId),
    /// Several owned planets: the player picks one.
    Choose(Vec<PlanetId>),
}

/// Applies the parting volley of `opposing_power` to `ships`.
pub fn withdrawal_hit(ships: Vec<Ship>, opposing_power: u32, rng: &mut impl UniformSource) -> Withdrawal {
    let damage = if opposing_power == 0 {
        0
    } else {
        let factor = rng.between(WITHDRAW_PENALTY.0, WITHDRAW_PENALTY.1);
        ((opposing_power as f64 * factor).round() as u32).max(1)
    };
    let mut survivors = ships;
    let lost = distribute_damage(&mut survivors, damage, rng);
    Withdrawal { survivors, lost, damage }
}

/// Planets owned by `faction` other than `from`, in id order.
pub fn retreat_candidates(world: &World, faction: Faction, from: PlanetId) -> Vec<PlanetId> {
    world
        .owned_planets(faction)
        .filter(|p| p.id != from)
        .map(|p| p.id)
        .collect()
}

/// The closest planet owned by `faction` other than `from`.
pub fn nearest_refuge(world: &World, faction: Faction, from: PlanetId) -> Option<PlanetId> {
    let origin = world.planet(from)?;
    world
        .owned_planets(faction)
        .filter(|p| p.id != from)
        .min_by(|a, b| a.distance_to(origin).total_cmp(&b.distance_to(origin)))
        .map(|p| p.id)
}

pub fn plan_retreat(world: &World, faction: Faction, from: PlanetId) -> RetreatPlan {
    let mut candidates = retreat_candidates(world, faction, from);
    match candidates.len() {
        0 => RetreatPlan::Lost,
        1 => RetreatPlan::Relocate(candidates.remove(0)),
        _ => RetreatPlan::Choose(candidates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedSource;
    use crate::world::{Planet, PlanetSize, Position, Resources, ShipId, ShipKind};

    fn world(owners: &[Option<Faction>]) -> World {
        let planets = owners
            .iter()
            .enumerate()
            .map(|(i, owner)| {
                let mut p = Planet::new(
                    PlanetId(i as u32),
                    format!("P{}", i),
                    Position::new(i as f64 * 100.0, 0.0),
                    PlanetSize::Small,
                    Resources::ZERO,
                );
                p.set_owner(*owner);
                p
            })
            .collect();
        World::new(planets)
    }

    #[test]
    fn parting_volley_scales_with_opposing_power() {
        let ships = vec![Ship::new(ShipId(1), ShipKind::Cruiser, Faction::Human)];
        // 0.5 -> factor 0.35, 100 * 0.35 = 35.
        let mut rng = ScriptedSource::constant(0.5);
        let w = withdrawal_hit(ships, 100, &mut rng);
        assert_eq!(w.damage, 35);
        assert!(w.lost.is_empty());
        assert_eq!(w.survivors[0].hp, 110 - 35);
    }

    #[test]
    fn parting_volley_can_destroy() {
        let ships = vec![
            Ship::new(ShipId(1), ShipKind::Scout, Faction::Human),
            Ship::new(ShipId(2), ShipKind::Scout, Faction::Human),
        ];
        let mut rng = ScriptedSource::constant(0.99);
        let w = withdrawal_hit(ships, 110, &mut rng);
        assert_eq!(w.lost.len(), 2);
        assert!(w.survivors.is_empty());
    }

    #[test]
    fn no_opposition_means_no_damage() {
        let ships = vec![Ship::new(ShipId(1), ShipKind::Scout, Faction::Human)];
        let mut rng = ScriptedSource::constant(0.5);
        let w = withdrawal_hit(ships, 0, &mut rng);
        assert_eq!(w.damage, 0);
        assert_eq!(rng.drawn(), 0);
    }

    #[test]
    fn retreat_plan_depends_on_owned_planets() {
        let w = world(&[Some(Faction::Human), None, Some(Faction::Ai)]);
        assert_eq!(plan_retreat(&w, Faction::Human, PlanetId(0)), RetreatPlan::Lost);

        let w = world(&[Some(Faction::Human), Some(Faction::Human), Some(Faction::Ai)]);
        assert_eq!(plan_retreat(&w, Faction::Human, PlanetId(2)), RetreatPlan::Choose(vec![PlanetId(0), PlanetId(1)]));
        assert_eq!(plan_retreat(&w, Faction::Human, PlanetId(0)), RetreatPlan::Relocate(PlanetId(1)));
    }

    #[test]
    fn refuge_is_the_closest_other_owned_planet() {
        let w = world(&[Some(Faction::Human), Some(Faction::Human), None, Some(Faction::Human)]);
        assert_eq!(nearest_refuge(&w, Faction::Human, PlanetId(2)), Some(PlanetId(1)));
        assert_eq!(nearest_refuge(&w, Faction::Human, PlanetId(0)), Some(PlanetId(1)));
        assert_eq!(nearest_refuge(&w, Faction::Ai, PlanetId(0)), None);
        assert_eq!(nearest_refuge(&w, Faction::Human, PlanetId(9)), None);
    }
}
