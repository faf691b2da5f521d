//! Tick throughput
//!
//! Run with: cargo bench --bench tick_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use praxis_engine::scenario::{imperial_circuit, solidarity_ring};
use praxis_engine::systems::RunContext;
use praxis_engine::{step, Engine, SimulationConfig, TopologyMonitor};

fn bench_single_step(c: &mut Criterion) {
    let config = SimulationConfig::default();
    let engine = Engine::new();
    let mut group = c.benchmark_group("step");

    let circuit = imperial_circuit();
    group.bench_function("imperial_circuit", |b| {
        b.iter(|| {
            let mut context = RunContext::new();
            step(black_box(&circuit), &engine, &config, &mut context, Vec::new())
        })
    });

    for size in [16u32, 128, 1024] {
        let ring = solidarity_ring(size);
        group.throughput(Throughput::Elements(u64::from(size)));
        group.bench_with_input(BenchmarkId::new("solidarity_ring", size), &ring, |b, ring| {
            b.iter(|| {
                let mut context = RunContext::new();
                step(black_box(ring), &engine, &config, &mut context, Vec::new())
            })
        });
    }
    group.finish();
}

fn bench_topology(c: &mut Criterion) {
    let config = SimulationConfig::default();
    let monitor = TopologyMonitor::new(&config);
    let mut group = c.benchmark_group("topology");
    for size in [128u32, 1024] {
        let ring = solidarity_ring(size);
        group.bench_with_input(BenchmarkId::new("analyze", size), &ring, |b, ring| {
            b.iter(|| monitor.analyze(black_box(ring)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_step, bench_topology);
criterion_main!(benches);
