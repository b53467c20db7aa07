use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rand::rngs::SmallRng;
use rand::SeedableRng;

use starclaim::config::{Difficulty, EngineConfig, MapSize};
use starclaim::engine::Engine;
use starclaim::resolve::resolve;
use starclaim::strategist::Strategist;
use starclaim::world::{generate_galaxy, Faction, Planet, PlanetId, PlanetSize, Position, Resources, Ship, ShipId, ShipKind};

fn fleet(owner: Faction, first_id: u32, kinds: &[ShipKind]) -> Vec<Ship> {
    kinds
        .iter()
        .enumerate()
        .map(|(i, &k)| Ship::new(ShipId(first_id + i as u32), k, owner))
        .collect()
}

fn bench_resolve_battle(c: &mut Criterion) {
    let attackers = fleet(
        Faction::Human,
        1,
        &[ShipKind::Battleship, ShipKind::Cruiser, ShipKind::Destroyer, ShipKind::Frigate, ShipKind::Colonizer],
    );
    let defenders = fleet(
        Faction::Ai,
        100,
        &[ShipKind::Cruiser, ShipKind::Cruiser, ShipKind::Frigate, ShipKind::Scout, ShipKind::Scout],
    );
    let mut planet = Planet::new(PlanetId(0), "Vega", Position::new(0.0, 0.0), PlanetSize::Large, Resources::new(5, 5, 5));
    planet.set_owner(Some(Faction::Ai));
    planet.population = 60;
    let mut rng = SmallRng::seed_from_u64(7);

    c.bench_function("resolve_ten_ship_battle", |b| {
        b.iter(|| {
            let mut target = planet.clone();
            resolve(
                Faction::Human,
                black_box(attackers.clone()),
                black_box(defenders.clone()),
                &mut target,
                &mut rng,
            )
        })
    });
}

fn bench_generate_galaxy(c: &mut Criterion) {
    c.bench_function("generate_large_galaxy", |b| {
        b.iter(|| generate_galaxy(black_box(MapSize::Large), black_box(11)))
    });
}

fn bench_strategist_turn(c: &mut Criterion) {
    let world = generate_galaxy(MapSize::Large, 3);
    let mut rng = SmallRng::seed_from_u64(3);
    c.bench_function("strategist_opening_turn_hard", |b| {
        b.iter(|| {
            let mut world = world.clone();
            let mut strategist = Strategist::new(Faction::Ai, Difficulty::Hard.profile());
            strategist.take_turn(&mut world, &mut rng)
        })
    });
}

fn bench_fifty_turn_selfplay(c: &mut Criterion) {
    let mut group = c.benchmark_group("selfplay");
    group.sample_size(10);
    group.bench_function("fifty_turns_medium", |b| {
        b.iter(|| {
            let config = EngineConfig { map_size: MapSize::Medium, map_seed: 5, ..EngineConfig::default() };
            let mut engine = Engine::with_rng(config, SmallRng::seed_from_u64(5));
            engine.enable_autopilot(Difficulty::Normal);
            for _ in 0..50 {
                if engine.advance().is_err() {
                    break;
                }
            }
            engine.world.turn
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_resolve_battle,
    bench_generate_galaxy,
    bench_strategist_turn,
    bench_fifty_turn_selfplay
);
criterion_main!(benches);
