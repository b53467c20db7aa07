//! Build decisions.

use tracing::debug;

use crate::config::DifficultyProfile;
use crate::random::UniformSource;
use crate::resolve::issue_build;
use crate::world::{Faction, PlanetId, Resources, ShipKind, World, ALL_SHIP_KINDS};

/// The strategist builds warships when the enemy fields more than this
/// share of its own military.
pub const THREAT_RATIO: f64 = 0.7;

/// Planets with this many queued orders are left alone.
pub const QUEUE_CAP: usize = 2;

/// Warship kinds, strongest first.
pub fn warships_by_strength() -> Vec<ShipKind> {
    let mut kinds: Vec<ShipKind> = ALL_SHIP_KINDS.iter().copied().filter(|k| !k.is_colonizer()).collect();
    kinds.sort_by(|a, b| b.attack().cmp(&a.attack()));
    kinds
}

/// The warship with the lowest total cost.
pub fn cheapest_warship() -> ShipKind {
    ALL_SHIP_KINDS
        .iter()
        .copied()
        .filter(|k| !k.is_colonizer())
        .min_by_key(|k| k.cost().total())
        .unwrap_or(ShipKind::Scout)
}

/// Chooses what one planet should build, if anything.
pub fn choose_kind(
    world: &World,
    faction: Faction,
    profile: &DifficultyProfile,
    rng: &mut impl UniformSource,
) -> Option<ShipKind> {
    let stockpile: Resources = world.account(faction).stockpile;
    let room_to_expand = world.planets.iter().any(|p| p.is_neutral());
    if room_to_expand
        && stockpile.covers(&ShipKind::Colonizer.cost())
        && rng.chance(profile.expansion_priority)
    {
        return Some(ShipKind::Colonizer);
    }

    let own = world.military_count(faction) as f64;
    let enemy = world.military_count(faction.opponent()) as f64;
    if enemy > THREAT_RATIO * own {
        if !rng.chance(profile.military_priority) {
            return None;
        }
        return warships_by_strength().into_iter().find(|k| stockpile.covers(&k.cost()));
    }

    let cheapest = cheapest_warship();
    stockpile.covers(&cheapest.cost()).then_some(cheapest)
}

/// Rolls a build for every owned planet and places the orders it can pay for.
pub fn plan_builds(
    world: &mut World,
    faction: Faction,
    profile: &DifficultyProfile,
    rng: &mut impl UniformSource,
) -> Vec<(PlanetId, ShipKind)> {
    let planets: Vec<PlanetId> = world
        .owned_planets(faction)
        .filter(|p| p.build_queue.len() < QUEUE_CAP)
        .map(|p| p.id)
        .collect();

    let mut placed = Vec::new();
    for planet in planets {
        if !rng.chance(profile.build_efficiency) {
            continue;
        }
        let Some(kind) = choose_kind(world, faction, profile, rng) else {
            continue;
        };
        match issue_build(world, faction, planet, kind) {
            Ok(_) => placed.push((planet, kind)),
            Err(err) => debug!(planet = planet.0, kind = kind.name(), %err, "strategist build skipped"),
        }
    }
    placed
}
