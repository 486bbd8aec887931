use std::num::NonZeroUsize;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gmaze::{
    algorithms::{default_registry, run_generator, Algorithm, Random},
    clock::AnimationClock,
    grid::GridGraph,
    solver,
};
use rand::SeedableRng as _;

const ROWS: i32 = 60;
const COLUMNS: i32 = 80;

pub fn generators(c: &mut Criterion) {
    let registry = default_registry(NonZeroUsize::new(1000).unwrap());
    let mut group = c.benchmark_group("generate");

    for alg in Algorithm::ALL {
        let generator = registry.get(&alg).unwrap().clone();
        group.bench_with_input(BenchmarkId::from_parameter(alg.key()), &alg, |b, _| {
            b.iter(|| {
                let mut grid = GridGraph::build(black_box(ROWS), black_box(COLUMNS), 1).unwrap();
                let mut rng = Random::seed_from_u64(black_box(7));
                run_generator(&*generator, &mut grid, &mut rng, &AnimationClock::batch()).unwrap();
                grid
            })
        });
    }
    group.finish();
}

pub fn solve(c: &mut Criterion) {
    let registry = default_registry(NonZeroUsize::new(1000).unwrap());
    let generator = registry.get(&Algorithm::Backtracker).unwrap();
    let mut grid = GridGraph::build(ROWS, COLUMNS, 1).unwrap();
    let mut rng = Random::seed_from_u64(7);
    run_generator(&**generator, &mut grid, &mut rng, &AnimationClock::batch()).unwrap();

    c.bench_function("solve_backtracker_maze", |b| {
        b.iter(|| solver::solve(black_box(&mut grid), &AnimationClock::batch()).unwrap())
    });
}

criterion_group! {name = benches; config = Criterion::default().sample_size(10); targets = generators, solve}
criterion_main!(benches);
