//! Identical inputs give identical histories

use praxis_engine::scenario::{imperial_circuit, solidarity_ring};
use praxis_engine::{Simulation, SimulationConfig, TopologyMonitor, WorldState};

fn run(initial: WorldState, ticks: u64) -> Vec<WorldState> {
    let config = SimulationConfig::default();
    let mut sim = Simulation::new(initial, config).unwrap();
    let monitor = TopologyMonitor::new(sim.config());
    sim.add_observer(Box::new(monitor));
    sim.run(ticks).unwrap();
    sim.finish();
    sim.into_history()
}

#[test]
fn test_imperial_circuit_is_reproducible() {
    let a = run(imperial_circuit(), 25);
    let b = run(imperial_circuit(), 25);
    assert_eq!(a.len(), 26);
    for (left, right) in a.iter().zip(&b) {
        assert_eq!(left, right, "diverged at tick {}", left.tick);
    }
}

#[test]
fn test_ring_is_reproducible_including_serialised_form() {
    let a = run(solidarity_ring(15), 12);
    let b = run(solidarity_ring(15), 12);
    let last_a = a.last().unwrap().to_json().unwrap();
    let last_b = b.last().unwrap().to_json().unwrap();
    assert_eq!(last_a, last_b);
}
