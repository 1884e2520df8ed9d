//! # Planner Benchmark

use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::Point2;

use plan_lib::{
    dem::{GridDem, TerrainSource},
    nav::{dijkstra::plan_step, plan_traverse, TraverseConfig},
};

fn plan_benchmark(c: &mut Criterion) {
    // Rolling Perlin terrain, gentle enough to stay traversable under the
    // slope limit
    let dem = GridDem::generate_random((256, 256), 0.05, 2.0, 13);

    c.bench_function("dijkstra::plan_step", |b| {
        let window = dem.read_square_window(&Point2::new(128, 128), 64).unwrap();
        let goal = window.clamp_to_window(&Point2::new(255, 255));

        b.iter(|| plan_step(&window, window.centre(), goal, 35.0, dem.resolution_m()))
    });

    c.bench_function("trav_mgr::plan_traverse", |b| {
        let config = TraverseConfig {
            max_slope_deg: 35.0,
            buffer: 16,
            circular_windows: false,
        };

        b.iter(|| plan_traverse(&dem, Point2::new(5, 5), Point2::new(250, 250), &config).unwrap())
    });
}

criterion_group!(benches, plan_benchmark);
criterion_main!(benches);
