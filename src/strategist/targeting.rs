//! Candidate planets and how a profile picks among them.

use std::cmp::Ordering;

use crate::config::Targeting;
use crate::eval::planet_defense;
use crate::random::UniformSource;
use crate::world::{Faction, Planet, PlanetId, World};

/// Neutral planets `faction` could settle: free of hostile ships and not
/// already the destination of one of its own fleets.
pub fn colonization_candidates(world: &World, faction: Faction) -> Vec<PlanetId> {
    world
        .planets
        .iter()
        .filter(|p| p.is_neutral() && !p.has_ships_hostile_to(faction))
        .filter(|p| !world.fleets.iter().any(|f| f.owner == faction && f.destination == p.id))
        .map(|p| p.id)
        .collect()
}

/// Planets owned by the other faction.
pub fn attack_candidates(world: &World, faction: Faction) -> Vec<PlanetId> {
    world.owned_planets(faction.opponent()).map(|p| p.id).collect()
}

/// `sum of yields - distance / 100`.
pub fn colony_score(planet: &Planet, origin: &Planet) -> f64 {
    planet.yields.total() as f64 - planet.distance_to(origin) / 100.0
}

/// `population * 10 - defense * 2`.
pub fn attack_score(planet: &Planet, attacker: Faction) -> f64 {
    planet.population as f64 * 10.0 - planet_defense(planet, attacker) as f64 * 2.0
}

fn by_score(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Picks where a colonizer leaving `origin` should go.
pub fn pick_colony_target(
    world: &World,
    origin: PlanetId,
    candidates: &[PlanetId],
    targeting: Targeting,
    rng: &mut impl UniformSource,
) -> Option<PlanetId> {
    let origin = world.planet(origin)?;
    let planets = resolve_all(world, candidates);
    if planets.is_empty() {
        return None;
    }
    let chosen = match targeting {
        Targeting::Random => planets[rng.index(planets.len())],
        Targeting::Nearest => planets
            .iter()
            .copied()
            .min_by(|a, b| by_score(a.distance_to(origin), b.distance_to(origin)))?,
        Targeting::Optimal => planets
            .iter()
            .copied()
            .max_by(|a, b| by_score(colony_score(a, origin), colony_score(b, origin)))?,
    };
    Some(chosen.id)
}

/// Picks which enemy planet `attacker` should hit.
pub fn pick_attack_target(
    world: &World,
    attacker: Faction,
    candidates: &[PlanetId],
    targeting: Targeting,
    rng: &mut impl UniformSource,
) -> Option<PlanetId> {
    let planets = resolve_all(world, candidates);
    if planets.is_empty() {
        return None;
    }
    let chosen = match targeting {
        Targeting::Random => planets[rng.index(planets.len())],
        Targeting::Nearest => planets
            .iter()
            .copied()
            .min_by_key(|p| planet_defense(p, attacker))?,
        Targeting::Optimal => planets
            .iter()
            .copied()
            .max_by(|a, b| by_score(attack_score(a, attacker), attack_score(b, attacker)))?,
    };
    Some(chosen.id)
}

/// The planet among `candidates` closest to `anchor`.
pub fn nearest_to(world: &World, anchor: PlanetId, candidates: &[PlanetId]) -> Option<PlanetId> {
    let anchor = world.planet(anchor)?;
    resolve_all(world, candidates)
        .into_iter()
        .min_by(|a, b| by_score(a.distance_to(anchor), b.distance_to(anchor)))
        .map(|p| p.id)
}

fn resolve_all<'a>(world: &'a World, ids: &[PlanetId]) -> Vec<&'a Planet> {
    ids.iter().filter_map(|id| world.planet(*id)).collect()
}
