//! Fleet movement decisions.
//!
//! Uncoordinated strategists act planet by planet. Coordinated ones pool
//! warships from every planet for a single strike and only commit when the
//! pool clears the required strength.

use tracing::debug;

use crate::config::DifficultyProfile;
use crate::eval::planet_defense;
use crate::random::UniformSource;
use crate::resolve::send_fleet;
use crate::world::{Faction, FleetId, Planet, PlanetId, Ship, ShipId, World};

use super::targeting::{
    attack_candidates, colonization_candidates, nearest_to, pick_attack_target, pick_colony_target,
};

/// A coordinated strike stops drawing ships once this multiple of the
/// required strength is on its way.
pub const COMMIT_MARGIN: f64 = 1.2;

/// Warships of `faction` stationed at `planet`, strongest first.
fn warships(planet: &Planet, faction: Faction) -> Vec<&Ship> {
    let mut ships: Vec<&Ship> = planet.ships_of(faction).filter(|s| !s.is_colonizer()).collect();
    ships.sort_by(|a, b| b.attack().cmp(&a.attack()).then(a.id.cmp(&b.id)));
    ships
}

fn power_of(ships: &[&Ship]) -> u32 {
    ships.iter().map(|s| s.attack()).sum()
}

/// Strength needed to take `target`.
pub fn required_strength(world: &World, attacker: Faction, target: PlanetId, profile: &DifficultyProfile) -> f64 {
    let defense = world.planet(target).map(|p| planet_defense(p, attacker)).unwrap_or(0);
    defense as f64 * profile.overkill_factor
}

/// Sends a colonizer and its escort from `origin` to the best open planet.
pub fn expand_from(
    world: &mut World,
    faction: Faction,
    origin: PlanetId,
    profile: &DifficultyProfile,
    rng: &mut impl UniformSource,
) -> Option<FleetId> {
    let planet = world.planet(origin)?;
    let colonizer = planet.ships_of(faction).find(|s| s.is_colonizer())?.id;
    let candidates = colonization_candidates(world, faction);
    let target = pick_colony_target(world, origin, &candidates, profile.targeting, rng)?;

    let planet = world.planet(origin)?;
    let mut ships = vec![colonizer];
    ships.extend(
        warships(planet, faction)
            .into_iter()
            .take(profile.escort_size as usize)
            .map(|s| s.id),
    );
    dispatch(world, faction, origin, &ships, target)
}

/// Sends part of `origin`'s warships at one enemy planet, if they are
/// strong enough on their own.
pub fn raid_from(
    world: &mut World,
    faction: Faction,
    origin: PlanetId,
    profile: &DifficultyProfile,
    rng: &mut impl UniformSource,
) -> Option<FleetId> {
    let candidates = attack_candidates(world, faction);
    let target = pick_attack_target(world, faction, &candidates, profile.targeting, rng)?;
    let required = required_strength(world, faction, target, profile);

    let available = warships(world.planet(origin)?, faction);
    let cap = ((available.len() as f64 * profile.attack_force_ratio).ceil() as usize).max(1);
    let mut chosen: Vec<&Ship> = Vec::new();
    for ship in available.into_iter().take(cap) {
        if !chosen.is_empty() && power_of(&chosen) as f64 >= required {
            break;
        }
        chosen.push(ship);
    }
    if chosen.is_empty() || (power_of(&chosen) as f64) < required {
        return None;
    }
    let ships: Vec<ShipId> = chosen.iter().map(|s| s.id).collect();
    dispatch(world, faction, origin, &ships, target)
}

/// Each owned planet rolls aggressiveness and, on success, settles or raids.
pub fn uncoordinated(
    world: &mut World,
    faction: Faction,
    profile: &DifficultyProfile,
    rng: &mut impl UniformSource,
) -> Vec<FleetId> {
    let origins: Vec<PlanetId> = world.owned_planets(faction).map(|p| p.id).collect();
    let mut sent = Vec::new();
    for origin in origins {
        if !rng.chance(profile.aggressiveness) {
            continue;
        }
        let fleet = expand_from(world, faction, origin, profile, rng).or_else(|| raid_from(world, faction, origin, profile, rng));
        sent.extend(fleet);
    }
    sent
}

/// A pooled strike: which planets send which ships.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackPlan {
    pub target: PlanetId,
    pub required: f64,
    pub pooled: u32,
    pub contributions: Vec<(PlanetId, Vec<ShipId>)>,
}

/// Works out a pooled strike on `target`, or `None` if the pool falls short.
///
/// Each planet withholds `home_defense_ratio` of its warships (the strongest
/// stay home) and offers the rest. Planets nearest the target contribute
/// first, each sending `attack_force_ratio` of what it offered.
pub fn plan_pooled_attack(
    world: &World,
    faction: Faction,
    target: PlanetId,
    profile: &DifficultyProfile,
) -> Option<AttackPlan> {
    let destination = world.planet(target)?;
    let required = required_strength(world, faction, target, profile);

    let mut offers: Vec<(&Planet, Vec<&Ship>)> = world
        .owned_planets(faction)
        .filter(|p| p.id != target)
        .map(|p| {
            let ships = warships(p, faction);
            let keep = (ships.len() as f64 * profile.home_defense_ratio).ceil() as usize;
            (p, ships.into_iter().skip(keep).collect::<Vec<_>>())
        })
        .filter(|(_, offered)| !offered.is_empty())
        .collect();

    let pooled: u32 = offers.iter().map(|(_, offered)| power_of(offered)).sum();
    if pooled == 0 || (pooled as f64) < required {
        debug!(target = target.0, pooled, required, "pooled strength short of target");
        return None;
    }

    offers.sort_by(|(a, _), (b, _)| {
        a.distance_to(destination)
            .partial_cmp(&b.distance_to(destination))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut committed = 0u32;
    let mut contributions = Vec::new();
    for (planet, offered) in offers {
        let count = ((offered.len() as f64 * profile.attack_force_ratio).ceil() as usize).clamp(1, offered.len());
        let sending = &offered[..count];
        committed += power_of(sending);
        contributions.push((planet.id, sending.iter().map(|s| s.id).collect()));
        if committed as f64 >= COMMIT_MARGIN * required {
            break;
        }
    }
    Some(AttackPlan { target, required, pooled, contributions })
}

fn launch(world: &mut World, faction: Faction, plan: &AttackPlan) -> Vec<FleetId> {
    plan.contributions
        .iter()
        .filter_map(|(origin, ships)| dispatch(world, faction, *origin, ships, plan.target))
        .collect()
}

/// Coordinated movement for one turn.
///
/// `counter_target` is the own planet most recently attacked, if the profile
/// counter-attacks and the memory holds one.
pub fn coordinated(
    world: &mut World,
    faction: Faction,
    profile: &DifficultyProfile,
    counter_target: Option<PlanetId>,
    rng: &mut impl UniformSource,
) -> Vec<FleetId> {
    if let Some(attacked) = counter_target {
        if rng.chance(profile.aggressiveness) {
            let candidates = attack_candidates(world, faction);
            if let Some(target) = nearest_to(world, attacked, &candidates) {
                debug!(attacked = attacked.0, target = target.0, "counter-attack");
                return plan_pooled_attack(world, faction, target, profile)
                    .map(|plan| launch(world, faction, &plan))
                    .unwrap_or_default();
            }
        }
    }

    if rng.chance(profile.aggressiveness) {
        let candidates = attack_candidates(world, faction);
        return pick_attack_target(world, faction, &candidates, profile.targeting, rng)
            .and_then(|target| plan_pooled_attack(world, faction, target, profile))
            .map(|plan| launch(world, faction, &plan))
            .unwrap_or_default();
    }

    let origins: Vec<PlanetId> = world.owned_planets(faction).map(|p| p.id).collect();
    origins
        .into_iter()
        .filter_map(|origin| expand_from(world, faction, origin, profile, rng))
        .collect()
}

fn dispatch(world: &mut World, faction: Faction, origin: PlanetId, ships: &[ShipId], target: PlanetId) -> Option<FleetId> {
    match send_fleet(world, faction, origin, ships, target) {
        Ok(id) => Some(id),
        Err(err) => {
            debug!(origin = origin.0, target = target.0, %err, "strategist dispatch rejected");
            None
        }
    }
}
