//! Ownership countdowns and neutralization.
//!
//! Runs at the end of every turn, after combat and resource collection.

use tracing::{debug, info};

use crate::world::{Faction, NeutralizeReason, PendingConquest, PlanetId, TurnEvent, World, CONQUEST_TURNS};

/// Floor on the population a conquered planet keeps.
pub const MIN_CONQUERED_POPULATION: u32 = 10;

/// Share of the previous population that survives a conquest.
pub const CONQUERED_POPULATION_SHARE: f64 = 0.3;

pub fn conquered_population(previous: u32) -> u32 {
    ((previous as f64 * CONQUERED_POPULATION_SHARE).floor() as u32).max(MIN_CONQUERED_POPULATION)
}

/// Starts a countdown for `claimant` on `planet`.
///
/// A planet carries at most one countdown. A second claim by the same
/// faction keeps the running countdown; a claim by the other faction
/// replaces it.
pub fn begin_conquest(world: &mut World, planet: PlanetId, claimant: Faction) {
    if let Some(existing) = world.pending_conquests.iter_mut().find(|c| c.planet == planet) {
        if existing.claimant == claimant {
            return;
        }
        existing.claimant = claimant;
        existing.turns_remaining = CONQUEST_TURNS;
    } else {
        world.pending_conquests.push(PendingConquest { planet, claimant, turns_remaining: CONQUEST_TURNS });
    }
    debug!(planet = planet.0, claimant = claimant.name(), "conquest started");
    world.events.push(TurnEvent::ConquestStarted { planet, claimant });
}

/// Advances every countdown by one turn.
///
/// A countdown is cancelled once its claimant has no ships left at the
/// planet. One that reaches zero transfers ownership.
pub fn tick_conquests(world: &mut World) {
    let pending = std::mem::take(&mut world.pending_conquests);
    for mut conquest in pending {
        let Some(planet) = world.planet_mut(conquest.planet) else {
            continue;
        };
        if planet.count_of(conquest.claimant) == 0 {
            debug!(planet = conquest.planet.0, "conquest cancelled");
            world.events.push(TurnEvent::ConquestCancelled {
                planet: conquest.planet,
                claimant: conquest.claimant,
            });
            continue;
        }
        conquest.turns_remaining = conquest.turns_remaining.saturating_sub(1);
        if conquest.turns_remaining > 0 {
            world.pending_conquests.push(conquest);
            continue;
        }
        let population = conquered_population(planet.population);
        planet.set_owner(Some(conquest.claimant));
        planet.population = population.min(planet.max_population.max(MIN_CONQUERED_POPULATION));
        planet.build_queue.clear();
        info!(planet = %planet.name, claimant = conquest.claimant.name(), "conquest completed");
        world.events.push(TurnEvent::ConquestCompleted {
            planet: conquest.planet,
            claimant: conquest.claimant,
            population,
        });
    }
}

/// Reverts contested planets whose previous owner has nothing left there,
/// then clears every contest flag.
pub fn neutralize_contested(world: &mut World) {
    let mut neutralized = Vec::new();
    for planet in &mut world.planets {
        let Some(previous_owner) = planet.contested_by.take() else {
            continue;
        };
        if planet.owner == Some(previous_owner) && planet.count_of(previous_owner) == 0 {
            planet.set_owner(None);
            planet.build_queue.clear();
            neutralized.push((planet.id, previous_owner));
        }
    }
    for (planet, previous_owner) in neutralized {
        info!(planet = planet.0, previous_owner = previous_owner.name(), "contested planet neutralized");
        world.events.push(TurnEvent::Neutralized { planet, previous_owner, reason: NeutralizeReason::Contested });
    }
}

/// Reverts owned planets nobody is coming back to.
///
/// A planet is kept while its owner has a ship there, a build finishing next
/// turn, a fleet landing next turn, or a colonizer anywhere in the galaxy.
pub fn neutralize_abandoned(world: &mut World) {
    let mut abandoned = Vec::new();
    for planet in &world.planets {
        let Some(owner) = planet.owner else {
            continue;
        };
        if planet.count_of(owner) > 0 {
            continue;
        }
        if planet.build_queue.front().is_some_and(|o| o.turns_remaining <= 1) {
            continue;
        }
        let reinforced = world
            .fleets
            .iter()
            .any(|f| f.owner == owner && f.destination == planet.id && f.turns_remaining <= 1);
        if reinforced || world.has_colonizer(owner) {
            continue;
        }
        abandoned.push((planet.id, owner));
    }
    for (id, owner) in abandoned {
        if let Some(planet) = world.planet_mut(id) {
            planet.set_owner(None);
            planet.build_queue.clear();
        }
        info!(planet = id.0, previous_owner = owner.name(), "abandoned planet neutralized");
        world.events.push(TurnEvent::Neutralized { planet: id, previous_owner: owner, reason: NeutralizeReason::Abandoned });
    }
}

/// The end-of-turn territory pass.
pub fn settle_territory(world: &mut World) {
    tick_conquests(world);
    neutralize_contested(world);
    neutralize_abandoned(world);
}
