//! Initial galaxy layout.
//!
//! Map generation uses its own explicitly seeded generator so a given seed
//! always yields the same galaxy. It never shares state with the combat or
//! strategist random source.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::MapSize;

use super::faction::{Faction, ALL_FACTIONS};
use super::planet::{Planet, PlanetId, PlanetSize, Position};
use super::resources::{FactionAccount, Resources};
use super::ship::ShipKind;
use super::state::World;

pub const HOME_POPULATION: u32 = 50;
pub const STARTING_STOCKPILE: Resources = Resources::new(200, 100, 100);

/// Ships every faction starts with on its home world.
pub const STARTING_GARRISON: [ShipKind; 4] = [
    ShipKind::Colonizer,
    ShipKind::Scout,
    ShipKind::Scout,
    ShipKind::Frigate,
];

const MIN_SPACING: f64 = 120.0;
const PLACEMENT_ATTEMPTS: usize = 64;

const PLANET_NAMES: [&str; 28] = [
    "Aldebaran", "Bellatrix", "Canopus", "Deneb", "Electra", "Fomalhaut", "Gienah",
    "Hadar", "Izar", "Jabbah", "Kochab", "Lesath", "Mirfak", "Nashira", "Okul",
    "Polaris", "Rigel", "Sabik", "Thuban", "Unuk", "Vega", "Wezen", "Xamidimura",
    "Yildun", "Zaniah", "Alcor", "Mizar", "Sirius",
];

/// Generates a fresh galaxy for `size`, deterministic in `seed`.
pub fn generate_galaxy(size: MapSize, seed: u64) -> World {
    let mut rng = SmallRng::seed_from_u64(seed);
    let count = size.planet_count();
    let side = 250.0 * (count as f64).sqrt();

    let mut positions: Vec<Position> = Vec::with_capacity(count);
    for _ in 0..count {
        let mut candidate = random_position(&mut rng, side);
        for _ in 0..PLACEMENT_ATTEMPTS {
            if positions.iter().all(|p| p.distance(&candidate) >= MIN_SPACING) {
                break;
            }
            candidate = random_position(&mut rng, side);
        }
        positions.push(candidate);
    }

    let planets = positions
        .into_iter()
        .enumerate()
        .map(|(i, position)| {
            let planet_size = match rng.gen_range(0..3) {
                0 => PlanetSize::Small,
                1 => PlanetSize::Medium,
                _ => PlanetSize::Large,
            };
            let bonus = match planet_size {
                PlanetSize::Small => 0,
                PlanetSize::Medium => 1,
                PlanetSize::Large => 2,
            };
            let yields = Resources::new(
                rng.gen_range(2..=8) + bonus,
                rng.gen_range(2..=8) + bonus,
                rng.gen_range(2..=8) + bonus,
            );
            let name = PLANET_NAMES[i % PLANET_NAMES.len()];
            let name = if i < PLANET_NAMES.len() {
                name.to_string()
            } else {
                format!("{} {}", name, i / PLANET_NAMES.len() + 1)
            };
            Planet::new(PlanetId(i as u32), name, position, planet_size, yields)
        })
        .collect();

    let mut world = World::new(planets);
    let (home_a, home_b) = farthest_pair(&world.planets);
    settle_home(&mut world, home_a, Faction::Human);
    settle_home(&mut world, home_b, Faction::Ai);
    for faction in ALL_FACTIONS {
        world.accounts[faction.index()] = FactionAccount::with_stockpile(STARTING_STOCKPILE);
    }
    world
}

fn random_position(rng: &mut SmallRng, side: f64) -> Position {
    Position::new(rng.gen_range(0.0..side), rng.gen_range(0.0..side))
}

/// Returns the indices of the two planets furthest apart.
fn farthest_pair(planets: &[Planet]) -> (usize, usize) {
    let mut best = (0, planets.len().saturating_sub(1));
    let mut best_dist = -1.0;
    for i in 0..planets.len() {
        for j in (i + 1)..planets.len() {
            let d = planets[i].distance_to(&planets[j]);
            if d > best_dist {
                best_dist = d;
                best = (i, j);
            }
        }
    }
    best
}

fn settle_home(world: &mut World, index: usize, faction: Faction) {
    let ships: Vec<_> = STARTING_GARRISON
        .iter()
        .map(|&kind| world.spawn_ship(kind, faction))
        .collect();
    let planet = &mut world.planets[index];
    planet.set_owner(Some(faction));
    planet.max_population = planet.max_population.max(PlanetSize::Medium.max_population());
    planet.population = HOME_POPULATION;
    planet.garrison = ships;
}
