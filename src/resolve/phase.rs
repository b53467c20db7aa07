//! Turn sequencing.
//!
//! A turn runs these phases in order:
//!
//! - Build: every planet's queue head counts down; finished ships join the
//!   garrison and may trigger a contest with occupiers
//! - Movement: every fleet moves one turn closer
//! - Arrivals: landed fleets colonize, merge, or fight
//! - Healing: ships at their own faction's planets repair
//! - Collection: owned planets pay out yields and grow
//! - Territory: conquest countdowns, then neutralization
//!
//! Build and arrival battles involving the interactive faction suspend the
//! turn. The resume cursor lives in `World::phase`, so a suspended turn can
//! be saved and restored like any other state.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::eval::{fleet_power, planet_defense};
use crate::random::UniformSource;
use crate::world::{
    Faction, Fleet, PendingBattle, PendingRetreat, PlanetId, Ship, TurnEvent, TurnPhase, World,
};

use super::build::progress_queue;
use super::combat::{self, CombatResult, TerritoryOutcome, COLONY_POPULATION};
use super::conquest;
use super::error::CommandError;
use super::travel::{classify_arrival, Arrival};
use super::withdraw::{nearest_refuge, plan_retreat, withdrawal_hit, RetreatPlan};

/// Share of max HP repaired per turn at a friendly planet.
pub const HEAL_FRACTION: f64 = 0.20;

/// Population growth per turn is `1 + food / GROWTH_FOOD_DIVISOR`.
pub const GROWTH_FOOD_DIVISOR: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleDecision {
    Fight,
    Withdraw,
}

impl BattleDecision {
    pub fn name(self) -> &'static str {
        match self {
            BattleDecision::Fight => "fight",
            BattleDecision::Withdraw => "withdraw",
        }
    }
}

/// Where a call into the orchestrator left the turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    AwaitingBattleDecision(PendingBattle),
    AwaitingRetreatDestination(PendingRetreat),
}

/// Starts the next turn and runs it until it completes or needs a decision.
pub fn advance_turn(world: &mut World, rng: &mut impl UniformSource) -> Result<TurnOutcome, CommandError> {
    if world.is_suspended() {
        return Err(CommandError::DecisionPending);
    }
    world.turn += 1;
    debug!(turn = world.turn, "turn started");
    world.phase = TurnPhase::Building { next_planet: 0 };
    Ok(run_phases(world, rng))
}

/// Resolves the pending battle and resumes the turn.
pub fn submit_battle_decision(
    world: &mut World,
    decision: BattleDecision,
    rng: &mut impl UniformSource,
) -> Result<TurnOutcome, CommandError> {
    let battle = world.pending_battle.take().ok_or(CommandError::NoPendingBattle)?;
    debug!(planet = battle.planet.0, decision = decision.name(), "battle decision");
    match decision {
        BattleDecision::Fight => {
            fight(world, battle.planet, battle.attacker, battle.attackers, rng);
        }
        BattleDecision::Withdraw => {
            if let Some(retreat) = withdraw(world, battle, rng) {
                world.pending_retreat = Some(retreat.clone());
                return Ok(TurnOutcome::AwaitingRetreatDestination(retreat));
            }
        }
    }
    Ok(run_phases(world, rng))
}

/// Lands the pending retreat at `destination` and resumes the turn.
///
/// An invalid destination is rejected and the retreat stays pending.
pub fn submit_retreat_destination(
    world: &mut World,
    destination: PlanetId,
    rng: &mut impl UniformSource,
) -> Result<TurnOutcome, CommandError> {
    let retreat = world.pending_retreat.as_ref().ok_or(CommandError::NoPendingRetreat)?;
    if !retreat.candidates.contains(&destination) {
        return Err(CommandError::InvalidRetreatDestination(destination));
    }
    let Some(retreat) = world.pending_retreat.take() else {
        return Err(CommandError::NoPendingRetreat);
    };
    let survivors = retreat.ships.len() as u32;
    if let Some(planet) = world.planet_mut(destination) {
        planet.garrison.extend(retreat.ships);
    }
    world.events.push(TurnEvent::Withdrew {
        planet: retreat.from,
        faction: retreat.faction,
        survivors,
        lost: retreat.lost,
        destination: Some(destination),
    });
    Ok(run_phases(world, rng))
}

fn run_phases(world: &mut World, rng: &mut impl UniformSource) -> TurnOutcome {
    loop {
        match std::mem::take(&mut world.phase) {
            TurnPhase::Idle => return TurnOutcome::Completed,
            TurnPhase::Building { next_planet } => {
                for index in next_planet..world.planets.len() {
                    if let Some(battle) = build_step(world, index, rng) {
                        world.phase = TurnPhase::Building { next_planet: index + 1 };
                        return suspend(world, battle);
                    }
                }
                let queue = move_fleets(world);
                world.phase = TurnPhase::Arrivals { queue };
            }
            TurnPhase::Arrivals { mut queue } => {
                while let Some(fleet) = queue.pop_front() {
                    if let Some(battle) = land(world, fleet, rng) {
                        world.phase = TurnPhase::Arrivals { queue };
                        return suspend(world, battle);
                    }
                }
                heal_garrisons(world);
                collect_resources(world);
                conquest::settle_territory(world);
                debug!(turn = world.turn, "turn complete");
                return TurnOutcome::Completed;
            }
        }
    }
}

fn suspend(world: &mut World, battle: PendingBattle) -> TurnOutcome {
    info!(
        planet = battle.planet.0,
        attacker = battle.attacker.name(),
        defending = battle.is_defending,
        "battle awaiting decision"
    );
    world.pending_battle = Some(battle.clone());
    TurnOutcome::AwaitingBattleDecision(battle)
}

/// Progresses one planet's queue. A ship finished under occupation starts a
/// contest with the occupiers.
fn build_step(world: &mut World, index: usize, rng: &mut impl UniformSource) -> Option<PendingBattle> {
    progress_queue(world, index)?;
    let planet = world.planets.get_mut(index)?;
    let owner = planet.owner?;
    if !planet.has_ships_hostile_to(owner) {
        return None;
    }
    let battle = PendingBattle {
        planet: planet.id,
        attacker: owner.opponent(),
        attackers: planet.take_ships_hostile_to(owner),
        is_defending: true,
    };
    if world.interactive == Some(owner) {
        return Some(battle);
    }
    fight(world, battle.planet, battle.attacker, battle.attackers, rng);
    None
}

/// Moves every fleet one turn and returns those that arrived, in dispatch order.
fn move_fleets(world: &mut World) -> std::collections::VecDeque<Fleet> {
    for fleet in &mut world.fleets {
        fleet.turns_remaining = fleet.turns_remaining.saturating_sub(1);
    }
    let (arrived, travelling): (Vec<Fleet>, Vec<Fleet>) =
        std::mem::take(&mut world.fleets).into_iter().partition(|f| f.turns_remaining == 0);
    world.fleets = travelling;
    arrived.into()
}

fn land(world: &mut World, fleet: Fleet, rng: &mut impl UniformSource) -> Option<PendingBattle> {
    let Some(planet) = world.planet(fleet.destination) else {
        warn!(fleet = fleet.id.0, planet = fleet.destination.0, "fleet arrived at unknown planet, ships lost");
        return None;
    };
    let arrival = classify_arrival(planet, &fleet, world.interactive);
    world.events.push(TurnEvent::FleetArrived { fleet: fleet.id, planet: fleet.destination, owner: fleet.owner });
    match arrival {
        Arrival::Colonize => {
            colonize(world, fleet);
            None
        }
        Arrival::Merge => {
            if let Some(planet) = world.planet_mut(fleet.destination) {
                planet.garrison.extend(fleet.ships);
            }
            None
        }
        Arrival::Battle { needs_decision: true, is_defending } => Some(PendingBattle {
            planet: fleet.destination,
            attacker: fleet.owner,
            attackers: fleet.ships,
            is_defending,
        }),
        Arrival::Battle { .. } => {
            fight(world, fleet.destination, fleet.owner, fleet.ships, rng);
            None
        }
    }
}

/// Claims an empty neutral planet, consuming one colonizer.
fn colonize(world: &mut World, fleet: Fleet) {
    let Some(planet) = world.planet_mut(fleet.destination) else {
        return;
    };
    let mut ships = fleet.ships;
    if let Some(idx) = ships.iter().position(|s| s.is_colonizer()) {
        ships.remove(idx);
    }
    planet.set_owner(Some(fleet.owner));
    planet.population = COLONY_POPULATION;
    planet.garrison.extend(ships);
    info!(planet = %planet.name, faction = fleet.owner.name(), "planet colonized");
    world.events.push(TurnEvent::Colonized { planet: fleet.destination, faction: fleet.owner });
}

/// Runs a battle at `planet_id` and applies everything combat leaves to the
/// caller: kill counts, conquest countdowns, and events. Ships of `attacker`
/// already stationed there join the attack.
fn fight(
    world: &mut World,
    planet_id: PlanetId,
    attacker: Faction,
    mut attackers: Vec<Ship>,
    rng: &mut impl UniformSource,
) -> Option<CombatResult> {
    let Some(planet) = world.planet_mut(planet_id) else {
        warn!(planet = planet_id.0, "battle at unknown planet");
        return None;
    };
    let previous_owner = planet.owner;
    attackers.extend(planet.take_ships_of(attacker));
    let defenders = std::mem::take(&mut planet.garrison);
    let result = combat::resolve(attacker, attackers, defenders, planet, rng);

    world.account_mut(attacker).enemy_ships_destroyed += result.defenders_lost();
    world.account_mut(attacker.opponent()).enemy_ships_destroyed += result.attackers_lost();
    match result.outcome {
        TerritoryOutcome::ConquestStarted => conquest::begin_conquest(world, planet_id, attacker),
        TerritoryOutcome::Colonized => {
            world.events.push(TurnEvent::Colonized { planet: planet_id, faction: attacker });
        }
        _ => {}
    }
    info!(
        planet = planet_id.0,
        attacker = attacker.name(),
        won = result.attacker_won,
        rounds = result.rounds,
        attackers_lost = result.attackers_lost(),
        defenders_lost = result.defenders_lost(),
        "battle resolved"
    );
    world.events.push(TurnEvent::BattleResolved {
        planet: planet_id,
        attacker,
        previous_owner,
        attacker_won: result.attacker_won,
        attackers_lost: result.attackers_lost(),
        defenders_lost: result.defenders_lost(),
        rounds: result.rounds,
    });
    if !result.displaced.is_empty() {
        let beaten = if result.attacker_won { attacker.opponent() } else { attacker };
        fall_back(world, planet_id, beaten, result.displaced.clone());
    }
    Some(result)
}

/// Moves a beaten side's colonizers to the nearest other planet their
/// faction owns. With no such planet they stay in the garrison.
fn fall_back(world: &mut World, from: PlanetId, faction: Faction, ships: Vec<Ship>) {
    let count = ships.len() as u32;
    let destination = nearest_refuge(world, faction, from);
    if let Some(planet) = world.planet_mut(destination.unwrap_or(from)) {
        planet.garrison.extend(ships);
    }
    let Some(destination) = destination else {
        debug!(planet = from.0, faction = faction.name(), count, "colonizers stranded with the victors");
        return;
    };
    debug!(planet = from.0, faction = faction.name(), count, to = destination.0, "colonizers fell back");
    world.events.push(TurnEvent::Withdrew {
        planet: from,
        faction,
        survivors: count,
        lost: 0,
        destination: Some(destination),
    });
}

/// Pulls the interactive side out of the battle.
///
/// Returns a retreat awaiting a destination when the survivors have more
/// than one place to go.
fn withdraw(world: &mut World, battle: PendingBattle, rng: &mut impl UniformSource) -> Option<PendingRetreat> {
    let PendingBattle { planet: planet_id, attacker, attackers, is_defending } = battle;
    let (faction, withdrawal) = if is_defending {
        let defender = attacker.opponent();
        let leaving = world.planet_mut(planet_id).map(|p| p.take_ships_of(defender)).unwrap_or_default();
        let withdrawal = withdrawal_hit(leaving, fleet_power(&attackers), rng);
        // The attackers walk into an empty planet.
        fight(world, planet_id, attacker, attackers, rng);
        (defender, withdrawal)
    } else {
        let power = world.planet(planet_id).map(|p| planet_defense(p, attacker)).unwrap_or(0);
        (attacker, withdrawal_hit(attackers, power, rng))
    };

    let mut lost = withdrawal.lost.len() as u32;
    world.account_mut(faction.opponent()).enemy_ships_destroyed += lost;
    debug!(planet = planet_id.0, faction = faction.name(), lost, damage = withdrawal.damage, "withdrawal");

    let survivors = withdrawal.survivors;
    let plan = if survivors.is_empty() { RetreatPlan::Lost } else { plan_retreat(world, faction, planet_id) };
    let destination = match plan {
        RetreatPlan::Choose(candidates) => {
            return Some(PendingRetreat { from: planet_id, faction, ships: survivors, candidates, lost });
        }
        RetreatPlan::Relocate(destination) => Some(destination),
        RetreatPlan::Lost => None,
    };
    let arrived = match destination.and_then(|d| world.planet_mut(d)) {
        Some(planet) => {
            let arrived = survivors.len() as u32;
            planet.garrison.extend(survivors);
            arrived
        }
        None => {
            lost += survivors.len() as u32;
            0
        }
    };
    world.events.push(TurnEvent::Withdrew { planet: planet_id, faction, survivors: arrived, lost, destination });
    None
}

/// Repairs every ship stationed at a planet its own faction owns.
pub fn heal_garrisons(world: &mut World) {
    for planet in &mut world.planets {
        let Some(owner) = planet.owner else {
            continue;
        };
        for ship in planet.garrison.iter_mut().filter(|s| s.owner == owner) {
            let amount = (ship.max_hp() as f64 * HEAL_FRACTION).ceil() as u32;
            ship.repair(amount);
        }
    }
}

/// Pays each owned planet's yields to its owner and grows its population.
pub fn collect_resources(world: &mut World) {
    for planet in &mut world.planets {
        let Some(owner) = planet.owner else {
            continue;
        };
        world.accounts[owner.index()].stockpile += planet.yields;
        if planet.population < planet.max_population {
            let growth = 1 + planet.yields.food / GROWTH_FOOD_DIVISOR;
            planet.population = (planet.population + growth).min(planet.max_population);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedSource;
    use crate::world::{BuildOrder, BuildOrderId, Planet, PlanetSize, Position, Resources, ShipKind};

    fn world() -> World {
        let spots = [(0.0, 0.0), (200.0, 0.0), (400.0, 0.0), (0.0, 200.0)];
        let planets = spots
            .iter()
            .enumerate()
            .map(|(i, (x, y))| {
                Planet::new(PlanetId(i as u32), format!("P{}", i), Position::new(*x, *y), PlanetSize::Medium, Resources::new(4, 3, 5))
            })
            .collect();
        let mut w = World::new(planets);
        for (idx, owner) in [(0, Faction::Human), (2, Faction::Ai), (3, Faction::Human)] {
            w.planets[idx].set_owner(Some(owner));
            w.planets[idx].population = 50;
        }
        station(&mut w, 2, ShipKind::Frigate, Faction::Ai);
        station(&mut w, 3, ShipKind::Frigate, Faction::Human);
        w
    }

    fn station(w: &mut World, planet: usize, kind: ShipKind, owner: Faction) {
        let ship = w.spawn_ship(kind, owner);
        w.planets[planet].garrison.push(ship);
    }

    fn launch(w: &mut World, owner: Faction, to: usize, kinds: &[ShipKind]) {
        let ships = kinds.iter().map(|k| w.spawn_ship(*k, owner)).collect();
        let id = w.next_fleet_id();
        w.fleets.push(Fleet {
            id,
            ships,
            source: PlanetId(0),
            destination: PlanetId(to as u32),
            turns_remaining: 1,
            total_turns: 1,
            owner,
        });
    }

    fn occupied_build(w: &mut World) {
        station(w, 0, ShipKind::Frigate, Faction::Ai);
        w.planets[0].build_queue.push_back(BuildOrder { id: BuildOrderId(1), kind: ShipKind::Scout, turns_remaining: 1 });
    }

    #[test]
    fn quiet_turn_completes() {
        let mut w = world();
        let mut rng = ScriptedSource::constant(0.5);
        assert_eq!(advance_turn(&mut w, &mut rng), Ok(TurnOutcome::Completed));
        assert_eq!(w.turn, 1);
        assert_eq!(w.phase, TurnPhase::Idle);
        assert_eq!(w.account(Faction::Human).stockpile, Resources::new(8, 6, 10));
        assert_eq!(w.planets[0].population, 52);
    }

    #[test]
    fn finished_ship_under_occupation_suspends_for_owner() {
        let mut w = world();
        occupied_build(&mut w);
        let mut rng = ScriptedSource::constant(0.5);

        let outcome = advance_turn(&mut w, &mut rng).unwrap();

        let TurnOutcome::AwaitingBattleDecision(battle) = outcome else {
            panic!("expected a battle decision, got {:?}", outcome);
        };
        assert!(battle.is_defending);
        assert_eq!(battle.attacker, Faction::Ai);
        assert_eq!(battle.planet, PlanetId(0));
        assert_eq!(w.phase, TurnPhase::Building { next_planet: 1 });
        assert!(w.is_suspended());
        assert_eq!(advance_turn(&mut w, &mut rng), Err(CommandError::DecisionPending));
        assert_eq!(
            submit_retreat_destination(&mut w, PlanetId(3), &mut rng),
            Err(CommandError::NoPendingRetreat)
        );

        let outcome = submit_battle_decision(&mut w, BattleDecision::Fight, &mut rng).unwrap();

        assert_eq!(outcome, TurnOutcome::Completed);
        assert!(!w.is_suspended());
        // The frigate beats the fresh scout and the contested planet reverts.
        assert_eq!(w.planets[0].owner, None);
        assert_eq!(w.planets[0].count_of(Faction::Ai), 1);
        assert_eq!(w.account(Faction::Ai).enemy_ships_destroyed, 1);
        assert!(w.events.iter().any(|e| matches!(e, TurnEvent::BattleResolved { attacker_won: true, .. })));
    }

    #[test]
    fn contest_auto_resolves_without_interactive_owner() {
        let mut w = world();
        w.interactive = None;
        occupied_build(&mut w);
        let mut rng = ScriptedSource::constant(0.5);
        assert_eq!(advance_turn(&mut w, &mut rng), Ok(TurnOutcome::Completed));
        assert!(w.pending_battle.is_none());
        assert_eq!(w.planets[0].owner, None);
    }

    #[test]
    fn suspended_turn_survives_serialization() {
        let mut w = world();
        occupied_build(&mut w);
        launch(&mut w, Faction::Human, 1, &[ShipKind::Colonizer, ShipKind::Scout]);
        let mut rng = ScriptedSource::constant(0.5);
        advance_turn(&mut w, &mut rng).unwrap();

        let json = serde_json::to_string(&w).unwrap();
        let mut restored: World = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, w);

        let mut a = ScriptedSource::constant(0.5);
        let mut b = ScriptedSource::constant(0.5);
        let left = submit_battle_decision(&mut w, BattleDecision::Fight, &mut a).unwrap();
        let right = submit_battle_decision(&mut restored, BattleDecision::Fight, &mut b).unwrap();
        assert_eq!(left, right);
        assert_eq!(w, restored);
        assert_eq!(w.planets[1].owner, Some(Faction::Human));
    }

    #[test]
    fn colonizer_fleet_claims_empty_neutral_planet() {
        let mut w = world();
        launch(&mut w, Faction::Human, 1, &[ShipKind::Colonizer, ShipKind::Scout]);
        let mut rng = ScriptedSource::constant(0.5);

        assert_eq!(advance_turn(&mut w, &mut rng), Ok(TurnOutcome::Completed));

        let planet = &w.planets[1];
        assert_eq!(planet.owner, Some(Faction::Human));
        // Colonized at 10, then grows by 1 + 5 / 5.
        assert_eq!(planet.population, 12);
        assert_eq!(planet.garrison.len(), 1);
        assert_eq!(planet.garrison[0].kind, ShipKind::Scout);
        assert!(w.fleets.is_empty());
    }

    #[test]
    fn attacker_withdrawal_picks_a_destination() {
        let mut w = world();
        launch(&mut w, Faction::Human, 2, &[ShipKind::Cruiser]);
        let mut rng = ScriptedSource::constant(0.5);

        let outcome = advance_turn(&mut w, &mut rng).unwrap();
        assert!(matches!(outcome, TurnOutcome::AwaitingBattleDecision(PendingBattle { is_defending: false, .. })));

        let outcome = submit_battle_decision(&mut w, BattleDecision::Withdraw, &mut rng).unwrap();
        let TurnOutcome::AwaitingRetreatDestination(retreat) = outcome else {
            panic!("expected a retreat choice, got {:?}", outcome);
        };
        assert_eq!(retreat.candidates, vec![PlanetId(0), PlanetId(3)]);
        // Parting volley: 10 * 0.35 rounds to 4.
        assert_eq!(retreat.ships[0].hp, 106);

        assert_eq!(
            submit_retreat_destination(&mut w, PlanetId(1), &mut rng),
            Err(CommandError::InvalidRetreatDestination(PlanetId(1)))
        );
        assert!(w.pending_retreat.is_some());

        assert_eq!(submit_retreat_destination(&mut w, PlanetId(3), &mut rng), Ok(TurnOutcome::Completed));
        assert_eq!(w.planets[3].count_of(Faction::Human), 2);
        assert_eq!(w.planets[2].count_of(Faction::Ai), 1);
        assert!(w.events.iter().any(|e| matches!(
            e,
            TurnEvent::Withdrew { destination: Some(PlanetId(3)), survivors: 1, lost: 0, .. }
        )));
    }

    #[test]
    fn defender_withdrawal_with_one_refuge_relocates_at_once() {
        let mut w = world();
        w.interactive = Some(Faction::Ai);
        launch(&mut w, Faction::Human, 2, &[ShipKind::Destroyer]);
        w.planets[0].set_owner(Some(Faction::Ai));
        let mut rng = ScriptedSource::constant(0.5);

        advance_turn(&mut w, &mut rng).unwrap();
        let outcome = submit_battle_decision(&mut w, BattleDecision::Withdraw, &mut rng).unwrap();

        assert_eq!(outcome, TurnOutcome::Completed);
        assert_eq!(w.planets[0].count_of(Faction::Ai), 1);
        assert_eq!(w.planets[2].count_of(Faction::Human), 1);
        assert_eq!(w.planets[2].contested_by, None);
        // Emptied without a colonizer, so the planet reverted at end of turn.
        assert_eq!(w.planets[2].owner, None);
    }

    #[test]
    fn healing_only_at_own_planets() {
        let mut w = world();
        station(&mut w, 1, ShipKind::Cruiser, Faction::Human);
        w.planets[1].garrison[0].hp = 10;
        w.planets[3].garrison[0].hp = 10;
        heal_garrisons(&mut w);
        assert_eq!(w.planets[1].garrison[0].hp, 10);
        // ceil(45 * 0.2) = 9
        assert_eq!(w.planets[3].garrison[0].hp, 19);
    }

    #[test]
    fn growth_is_capped() {
        let mut w = world();
        w.planets[0].population = 99;
        collect_resources(&mut w);
        assert_eq!(w.planets[0].population, 100);
        assert_eq!(w.planets[1].population, 0);
    }
}
