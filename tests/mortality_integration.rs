//! A closed population on fixed wealth settles at zero attrition

use praxis_engine::core::bounded::{Coefficient, Currency};
use praxis_engine::core::types::EntityId;
use praxis_engine::state::{SocialClass, SocialRole};
use praxis_engine::systems::VitalitySystem;
use praxis_engine::{Engine, EventType, Simulation, SimulationConfig, WorldState};

fn closed_population(wealth: f64, population: u64, inequality: f64) -> WorldState {
    let mut class = SocialClass::new(EntityId::from_index(1), SocialRole::PeripheryProletariat)
        .with_wealth(Currency::new(wealth).unwrap())
        .with_population(population);
    class.inequality = Coefficient::new(inequality).unwrap();
    WorldState::new().with_entity(class)
}

fn run(initial: WorldState, ticks: u64) -> Vec<WorldState> {
    let mut sim = Simulation::new(initial, SimulationConfig::default())
        .unwrap()
        .with_engine(Engine::with_systems(vec![Box::new(VitalitySystem)]));
    sim.run(ticks).unwrap();
    sim.into_history()
}

#[test]
fn test_population_converges_and_wealth_is_untouched() {
    let history = run(closed_population(1_000.0, 1_200, 0.5), 60);

    let last = history.last().unwrap();
    let class = last.entity("C001").unwrap();
    assert!(class.active);
    assert!(class.population > 0);
    assert!(class.population < 1_200);
    assert!(last
        .events
        .iter()
        .all(|e| e.event_type() != EventType::PopulationAttrition));

    for state in &history {
        assert_eq!(state.entity("C001").unwrap().wealth.get(), 1_000.0);
    }
}

#[test]
fn test_population_never_grows() {
    let history = run(closed_population(300.0, 400, 0.5), 30);
    let sizes: Vec<u64> = history
        .iter()
        .map(|s| s.entity("C001").unwrap().population)
        .collect();
    assert!(sizes.windows(2).all(|pair| pair[1] <= pair[0]));
    // Once covered, nobody else dies
    let settled = sizes.last().copied().unwrap();
    assert_eq!(sizes[sizes.len() - 2], settled);
}

#[test]
fn test_destitute_class_dies_out() {
    let history = run(closed_population(0.0, 50, 1.0), 3);
    let class = history[1].entity("C001").unwrap();
    assert_eq!(class.population, 0);
    assert!(!class.active);
    assert!(history[1]
        .events
        .iter()
        .any(|e| e.event_type() == EventType::EntityDeath));
}
