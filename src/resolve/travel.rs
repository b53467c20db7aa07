//! Sending fleets and deciding what happens when they land.

use tracing::debug;

use crate::world::{Faction, Fleet, FleetId, Planet, PlanetId, Ship, ShipId, World};

use super::error::CommandError;

/// Detaches `ships` of `faction` from the garrison at `source` and sends
/// them to `destination`. Nothing changes if any part of the command is
/// invalid.
pub fn send_fleet(
    world: &mut World,
    faction: Faction,
    source: PlanetId,
    ships: &[ShipId],
    destination: PlanetId,
) -> Result<FleetId, CommandError> {
    if ships.is_empty() {
        return Err(CommandError::EmptySelection);
    }
    if source == destination {
        return Err(CommandError::SameSourceAndDestination);
    }
    let to = world.planet(destination).ok_or(CommandError::UnknownPlanet(destination))?;
    let from = world.planet(source).ok_or(CommandError::UnknownPlanet(source))?;
    let distance = from.distance_to(to);
    for id in ships {
        if !from.ships_of(faction).any(|s| s.id == *id) {
            return Err(CommandError::UnknownShip(*id));
        }
    }

    let fleet_id = world.next_fleet_id();
    let Some(from) = world.planet_mut(source) else {
        return Err(CommandError::UnknownPlanet(source));
    };
    let (selected, kept): (Vec<Ship>, Vec<Ship>) = std::mem::take(&mut from.garrison)
        .into_iter()
        .partition(|s| s.owner == faction && ships.contains(&s.id));
    from.garrison = kept;

    let turns = Fleet::travel_turns(&selected, distance);
    debug!(
        fleet = fleet_id.0,
        faction = faction.name(),
        from = source.0,
        to = destination.0,
        ships = selected.len(),
        turns,
        "fleet dispatched"
    );
    world.fleets.push(Fleet {
        id: fleet_id,
        ships: selected,
        source,
        destination,
        turns_remaining: turns,
        total_turns: turns,
        owner: faction,
    });
    Ok(fleet_id)
}

/// What an arriving fleet triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    /// Unoccupied neutral planet and the fleet carries a colonizer.
    Colonize,
    /// Nothing to fight: the ships join the garrison.
    Merge,
    /// The planet is enemy-owned or holds hostile ships.
    Battle {
        /// The interactive faction is involved and must choose.
        needs_decision: bool,
        /// The interactive faction is the defending side.
        is_defending: bool,
    },
}

pub fn classify_arrival(planet: &Planet, fleet: &Fleet, interactive: Option<Faction>) -> Arrival {
    let arriving = fleet.owner;
    let hostile_ships = planet.has_ships_hostile_to(arriving);
    if planet.is_neutral() && !hostile_ships {
        return if fleet.has_colonizer() { Arrival::Colonize } else { Arrival::Merge };
    }
    let enemy_owned = planet.owner.is_some_and(|o| o != arriving);
    if !enemy_owned && !hostile_ships {
        return Arrival::Merge;
    }
    let attacking = interactive == Some(arriving);
    let defending = interactive.is_some_and(|player| {
        player != arriving && (planet.owner == Some(player) || planet.count_of(player) > 0)
    });
    Arrival::Battle { needs_decision: attacking || defending, is_defending: defending }
}
