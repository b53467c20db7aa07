//! Build queues: ordering, cancelling, and delivering ships.

use tracing::debug;

use crate::world::{BuildOrder, BuildOrderId, Faction, PlanetId, Resources, ShipId, ShipKind, TurnEvent, World};

use super::error::CommandError;

/// Share of the cost returned when an order is cancelled.
pub const CANCEL_REFUND: f64 = 0.5;

/// Queues a `kind` at `planet` for `faction`, paying the full cost up front.
///
/// Build time is fixed when the order is placed, from the planet's
/// population at that moment.
pub fn issue_build(
    world: &mut World,
    faction: Faction,
    planet: PlanetId,
    kind: ShipKind,
) -> Result<BuildOrderId, CommandError> {
    let target = world.planet(planet).ok_or(CommandError::UnknownPlanet(planet))?;
    if target.owner != Some(faction) {
        return Err(CommandError::NotOwner(planet));
    }
    let turns = kind.build_turns(target.population);
    if !world.account_mut(faction).try_spend(&kind.cost()) {
        return Err(CommandError::InsufficientResources(kind));
    }
    let id = world.next_order_id();
    if let Some(target) = world.planet_mut(planet) {
        target.build_queue.push_back(BuildOrder { id, kind, turns_remaining: turns });
    }
    debug!(faction = faction.name(), planet = planet.0, kind = kind.name(), turns, "build queued");
    Ok(id)
}

/// Removes `order` from the queue at `planet` and refunds half its cost,
/// rounded down per resource.
pub fn cancel_build(
    world: &mut World,
    faction: Faction,
    planet: PlanetId,
    order: BuildOrderId,
) -> Result<Resources, CommandError> {
    let target = world.planet_mut(planet).ok_or(CommandError::UnknownPlanet(planet))?;
    if target.owner != Some(faction) {
        return Err(CommandError::NotOwner(planet));
    }
    let pos = target
        .build_queue
        .iter()
        .position(|o| o.id == order)
        .ok_or(CommandError::UnknownBuildOrder { planet, order })?;
    let Some(removed) = target.build_queue.remove(pos) else {
        return Err(CommandError::UnknownBuildOrder { planet, order });
    };
    let refund = removed.kind.cost().scaled_down(CANCEL_REFUND);
    world.account_mut(faction).stockpile += refund;
    debug!(faction = faction.name(), planet = planet.0, order = order.0, "build cancelled");
    Ok(refund)
}

/// Counts down the head of the queue on the planet at `index` and delivers
/// it to the garrison when it reaches zero. Only the head progresses.
///
/// Returns the id of the delivered ship. Orders left on a neutral planet are
/// discarded.
pub fn progress_queue(world: &mut World, index: usize) -> Option<ShipId> {
    let planet = world.planets.get_mut(index)?;
    let Some(owner) = planet.owner else {
        planet.build_queue.clear();
        return None;
    };
    let head = planet.build_queue.front_mut()?;
    head.turns_remaining = head.turns_remaining.saturating_sub(1);
    if head.turns_remaining > 0 {
        return None;
    }
    let order = planet.build_queue.pop_front()?;
    let planet_id = planet.id;

    let ship = world.spawn_ship(order.kind, owner);
    let id = ship.id;
    world.account_mut(owner).ships_built += 1;
    world.events.push(TurnEvent::ShipBuilt { planet: planet_id, ship: id, kind: order.kind, owner });
    debug!(planet = planet_id.0, kind = order.kind.name(), owner = owner.name(), "ship completed");
    world.planets[index].garrison.push(ship);
    Some(id)
}
