//! External actions through the interceptor chain and into the next tick

use praxis_engine::core::types::{EntityId, TerritoryId};
use praxis_engine::events::EventKind;
use praxis_engine::interceptor::{Admission, Interceptor, InterceptorChain, ProposedAction, Verdict};
use praxis_engine::scenario::imperial_circuit;
use praxis_engine::{EventType, Simulation, SimulationConfig, WorldState};

/// Caps magnitudes at one.
struct Moderator;

impl Interceptor for Moderator {
    fn name(&self) -> &str {
        "moderator"
    }

    fn priority(&self) -> u8 {
        60
    }

    fn intercept(&mut self, action: &ProposedAction, _state: &WorldState) -> Verdict {
        if action.magnitude > 1.0 {
            let mut capped = action.clone();
            capped.magnitude = 1.0;
            Verdict::Modify(capped)
        } else {
            Verdict::Allow
        }
    }
}

/// Refuses anything aimed at the docks.
struct Lockdown;

impl Interceptor for Lockdown {
    fn name(&self) -> &str {
        "lockdown"
    }

    fn priority(&self) -> u8 {
        95
    }

    fn intercept(&mut self, action: &ProposedAction, _state: &WorldState) -> Verdict {
        match &action.target {
            Some(target) if target.as_str() == "T002" => Verdict::Block("docks are closed".into()),
            _ => Verdict::Allow,
        }
    }
}

struct Misplaced(u8);

impl Interceptor for Misplaced {
    fn name(&self) -> &str {
        "misplaced"
    }

    fn priority(&self) -> u8 {
        self.0
    }

    fn intercept(&mut self, _action: &ProposedAction, _state: &WorldState) -> Verdict {
        Verdict::Allow
    }
}

fn simulation() -> Simulation {
    let mut sim = Simulation::new(imperial_circuit(), SimulationConfig::default()).unwrap();
    sim.add_interceptor(Box::new(Moderator)).unwrap();
    sim.add_interceptor(Box::new(Lockdown)).unwrap();
    sim
}

fn external_actions(state: &WorldState) -> Vec<(String, f64)> {
    state
        .events
        .iter()
        .filter_map(|e| match &e.kind {
            EventKind::ExternalAction {
                action, magnitude, ..
            } => Some((action.clone(), *magnitude)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_modified_action_lands_in_next_tick() {
    let mut sim = simulation();
    let admission = sim.submit_action(
        ProposedAction::new(EntityId::from_index(5), "strike", 3.0)
            .with_target(TerritoryId::from_index(1)),
    );
    assert!(admission.is_admitted());

    sim.tick().unwrap();
    let state = sim.current();
    assert_eq!(external_actions(state), vec![("strike".to_string(), 1.0)]);
    assert_eq!(state.events[0].event_type(), EventType::ExternalAction);
    assert_eq!(state.events[0].tick, 0);
}

#[test]
fn test_security_band_blocks_before_validation() {
    let mut sim = simulation();
    let admission = sim.submit_action(
        ProposedAction::new(EntityId::from_index(5), "occupy", 0.5)
            .with_target(TerritoryId::from_index(2)),
    );
    assert_eq!(
        admission,
        Admission::Blocked {
            by: "lockdown".into(),
            reason: "docks are closed".into(),
        }
    );
    sim.tick().unwrap();
    assert!(external_actions(sim.current()).is_empty());
}

#[test]
fn test_unknown_actor_is_rejected_by_default_chain() {
    let mut sim = simulation();
    let admission = sim.submit_action(ProposedAction::new(EntityId::from_index(99), "strike", 0.5));
    assert!(matches!(admission, Admission::Blocked { ref by, .. } if by == "actor_exists"));
    assert!(sim.pending().is_empty());
}

#[test]
fn test_chain_order_and_band_checks() {
    let mut chain = InterceptorChain::with_defaults();
    chain.register(Box::new(Moderator)).unwrap();
    chain.register(Box::new(Lockdown)).unwrap();
    assert_eq!(chain.names(), vec!["lockdown", "moderator", "actor_exists", "audit"]);

    assert!(chain.register(Box::new(Misplaced(0))).is_err());
    assert!(chain.register(Box::new(Misplaced(101))).is_err());
    assert_eq!(chain.len(), 4);
}

#[test]
fn test_actions_accumulate_until_the_tick() {
    let mut sim = simulation();
    for magnitude in [0.2, 0.4] {
        sim.submit_action(ProposedAction::new(EntityId::from_index(1), "slowdown", magnitude));
    }
    assert_eq!(sim.pending().len(), 2);
    sim.tick().unwrap();
    assert_eq!(
        external_actions(sim.current()),
        vec![("slowdown".to_string(), 0.2), ("slowdown".to_string(), 0.4)]
    );
    sim.tick().unwrap();
    assert!(external_actions(sim.current()).is_empty());
}
