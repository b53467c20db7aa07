//! Fleet-versus-garrison combat.
//!
//! A battle runs in rounds. Each round the attacking side fires one volley
//! at the defenders, then the surviving defenders fire back. Volley damage is
//! spread one target at a time, picking targets weighted by current HP.
//! Colonizers never fire and never take round damage. Only an unescorted
//! colonizer facing an enemy is lost, and only before the first round.
//!
//! After the rounds end the planet's garrison and ownership are updated
//! according to who is left standing. Colonizers of the beaten side survive
//! but are not placed on the planet.

use serde::{Deserialize, Serialize};

use crate::eval::fleet_power;
use crate::random::UniformSource;
use crate::world::{Faction, Planet, Ship, ShipId};

/// Rounds after which an undecided battle is called a stalemate.
pub const ROUND_CAP: u32 = 50;

/// Volley damage is `power` times a factor drawn from this range.
pub const VOLLEY_VARIANCE: (f64, f64) = (0.85, 1.15);

/// Fraction of current HP added to each defender on an owned planet.
pub const DEFENSE_BONUS: f64 = 0.10;

/// Population of a freshly colonized planet.
pub const COLONY_POPULATION: u32 = 10;

/// What happened to the planet once the shooting stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerritoryOutcome {
    /// The attacking side has nothing left; the defenders keep the planet.
    Repelled,
    /// A neutral planet was claimed on the spot by a surviving colonizer.
    Colonized,
    /// The attackers hold the garrison. Ownership did not change.
    Occupied,
    /// An enemy planet was taken by a fleet carrying a colonizer. The
    /// ownership countdown starts.
    ConquestStarted,
    /// An enemy planet was emptied without a colonizer and is flagged for
    /// neutralization.
    Contested { previous_owner: Faction },
    /// The round cap was hit, or neither side could fire. Survivors of both
    /// sides share the garrison.
    Stalemate,
}

/// Full account of one battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatResult {
    pub attacker: Faction,
    pub attacker_won: bool,
    pub rounds: u32,
    pub attackers_destroyed: Vec<Ship>,
    pub defenders_destroyed: Vec<Ship>,
    /// Surviving ships that ended below their pre-battle HP.
    pub damaged: Vec<ShipId>,
    /// Attacking ships alive when combat ended, before any colonizer was consumed.
    pub attacker_survivors: Vec<Ship>,
    pub defender_survivors: Vec<Ship>,
    /// Colonizers of the side that lost its fighters. They are counted in
    /// that side's survivors but left off the planet for the caller to move.
    pub displaced: Vec<Ship>,
    pub outcome: TerritoryOutcome,
}

impl CombatResult {
    pub fn attackers_lost(&self) -> u32 {
        self.attackers_destroyed.len() as u32
    }

    pub fn defenders_lost(&self) -> u32 {
        self.defenders_destroyed.len() as u32
    }
}

/// One side of a battle, split by role.
struct Side {
    fighters: Vec<Ship>,
    colonizers: Vec<Ship>,
    destroyed: Vec<Ship>,
}

impl Side {
    fn new(ships: Vec<Ship>) -> Self {
        let (colonizers, fighters) = ships.into_iter().partition(|s| s.is_colonizer());
        Side { fighters, colonizers, destroyed: Vec::new() }
    }

    fn is_empty(&self) -> bool {
        self.fighters.is_empty() && self.colonizers.is_empty()
    }

    fn lose_colonizers(&mut self) {
        self.destroyed.append(&mut self.colonizers);
    }

    fn survivors(&self) -> Vec<Ship> {
        self.fighters.iter().chain(self.colonizers.iter()).cloned().collect()
    }
}

/// Damage of one volley from a side with total attack `power`.
pub fn volley_damage(power: u32, rng: &mut impl UniformSource) -> u32 {
    if power == 0 {
        return 0;
    }
    let factor = rng.between(VOLLEY_VARIANCE.0, VOLLEY_VARIANCE.1);
    ((power as f64 * factor).round() as u32).max(1)
}

/// Spreads `damage` over `targets`, one hit at a time.
///
/// Each hit picks a target with probability proportional to its current HP
/// and takes `min(remaining, target.hp)` off it. Destroyed ships are removed
/// from `targets` and returned in the order they died.
pub fn distribute_damage(targets: &mut Vec<Ship>, damage: u32, rng: &mut impl UniformSource) -> Vec<Ship> {
    let mut remaining = damage;
    let mut destroyed = Vec::new();
    while remaining > 0 && !targets.is_empty() {
        let idx = pick_weighted(targets, rng);
        let target = &mut targets[idx];
        let hit = remaining.min(target.hp).max(1);
        target.hp = target.hp.saturating_sub(hit);
        remaining = remaining.saturating_sub(hit);
        if target.hp == 0 {
            destroyed.push(targets.remove(idx));
        }
    }
    destroyed
}

fn pick_weighted(targets: &[Ship], rng: &mut impl UniformSource) -> usize {
    let total: u64 = targets.iter().map(|s| s.hp as u64).sum();
    if total == 0 {
        return rng.index(targets.len());
    }
    let roll = rng.next_unit() * total as f64;
    let mut cumulative = 0.0;
    for (i, ship) in targets.iter().enumerate() {
        cumulative += ship.hp as f64;
        if roll < cumulative {
            return i;
        }
    }
    targets.len() - 1
}

/// Fights `attackers` (all of faction `attacker`) against `defenders` at `planet`.
///
/// Both sides must already be out of `planet.garrison`; survivors are put
/// back according to the outcome, and ownership, population, build queue
/// and contest flag are updated in place. Pending conquests and faction
/// accounts are left to the caller.
pub fn resolve(
    attacker: Faction,
    attackers: Vec<Ship>,
    defenders: Vec<Ship>,
    planet: &mut Planet,
    rng: &mut impl UniformSource,
) -> CombatResult {
    let starting_hp: Vec<(ShipId, u32)> = attackers
        .iter()
        .chain(defenders.iter())
        .map(|s| (s.id, s.hp))
        .collect();

    let mut att = Side::new(attackers);
    let mut def = Side::new(defenders);

    // Unescorted colonizers facing anything at all are lost before the first shot.
    let att_exposed = att.fighters.is_empty() && !def.is_empty();
    let def_exposed = def.fighters.is_empty() && !att.is_empty();
    if att_exposed {
        att.lose_colonizers();
    }
    if def_exposed {
        def.lose_colonizers();
    }

    if planet.owner.is_some() {
        for ship in &mut def.fighters {
            let bonus = (ship.hp as f64 * DEFENSE_BONUS).round() as u32;
            ship.hp = (ship.hp + bonus).min(ship.max_hp());
        }
    }

    let mut rounds = 0;
    while rounds < ROUND_CAP && !att.fighters.is_empty() && !def.fighters.is_empty() {
        rounds += 1;
        let damage = volley_damage(fleet_power(&att.fighters), rng);
        let mut killed = distribute_damage(&mut def.fighters, damage, rng);
        def.destroyed.append(&mut killed);

        let damage = volley_damage(fleet_power(&def.fighters), rng);
        let mut killed = distribute_damage(&mut att.fighters, damage, rng);
        att.destroyed.append(&mut killed);
    }

    let attacker_won = def.fighters.is_empty() && !att.fighters.is_empty();
    let defender_won = att.fighters.is_empty() && !def.fighters.is_empty();
    let attacker_survivors = att.survivors();
    let defender_survivors = def.survivors();

    let damaged = attacker_survivors
        .iter()
        .chain(defender_survivors.iter())
        .filter(|s| {
            starting_hp
                .iter()
                .any(|(id, hp)| *id == s.id && s.hp < *hp)
        })
        .map(|s| s.id)
        .collect();

    let (outcome, displaced) = if attacker_won {
        let outcome = claim(attacker, att.survivors(), planet);
        (outcome, std::mem::take(&mut def.colonizers))
    } else if defender_won || att.is_empty() {
        planet.garrison.append(&mut def.fighters);
        planet.garrison.append(&mut def.colonizers);
        (TerritoryOutcome::Repelled, std::mem::take(&mut att.colonizers))
    } else {
        planet.garrison.extend(defender_survivors.iter().cloned());
        planet.garrison.extend(attacker_survivors.iter().cloned());
        (TerritoryOutcome::Stalemate, Vec::new())
    };

    CombatResult {
        attacker,
        attacker_won,
        rounds,
        attackers_destroyed: att.destroyed,
        defenders_destroyed: def.destroyed,
        damaged,
        attacker_survivors,
        defender_survivors,
        displaced,
        outcome,
    }
}

/// Applies an attacker victory to `planet`. The defenders are gone.
fn claim(attacker: Faction, mut survivors: Vec<Ship>, planet: &mut Planet) -> TerritoryOutcome {
    match planet.owner {
        None => {
            let outcome = match survivors.iter().position(|s| s.is_colonizer()) {
                Some(idx) => {
                    survivors.remove(idx);
                    planet.set_owner(Some(attacker));
                    planet.population = COLONY_POPULATION;
                    TerritoryOutcome::Colonized
                }
                None => TerritoryOutcome::Occupied,
            };
            planet.garrison.extend(survivors);
            outcome
        }
        Some(owner) if owner == attacker => {
            planet.garrison.extend(survivors);
            TerritoryOutcome::Occupied
        }
        Some(previous_owner) => {
            planet.build_queue.clear();
            let carries_colonizer = survivors.iter().any(|s| s.is_colonizer());
            planet.garrison.extend(survivors);
            if carries_colonizer {
                TerritoryOutcome::ConquestStarted
            } else {
                planet.contested_by = Some(previous_owner);
                TerritoryOutcome::Contested { previous_owner }
            }
        }
    }
}
