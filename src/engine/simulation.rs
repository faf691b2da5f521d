//! Run orchestration
//!
//! Owns the history, the cross-tick context, the observers and the
//! interceptor chain. Observer outboxes and admitted external actions are
//! held as pending events and injected into the next tick.

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::engine::{step, Engine};
use crate::events::types::SimulationEvent;
use crate::interceptor::{Admission, Interceptor, InterceptorChain, ProposedAction};
use crate::observers::SimulationObserver;
use crate::state::world::WorldState;
use crate::systems::RunContext;

pub struct Simulation {
    config: SimulationConfig,
    engine: Engine,
    context: RunContext,
    history: Vec<WorldState>,
    observers: Vec<Box<dyn SimulationObserver>>,
    interceptors: InterceptorChain,
    pending: Vec<SimulationEvent>,
    started: bool,
}

impl Simulation {
    /// Validates the config and the initial state's references.
    pub fn new(initial: WorldState, config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        initial.check_references()?;
        Ok(Self {
            config,
            engine: Engine::new(),
            context: RunContext::new(),
            history: vec![initial],
            observers: Vec::new(),
            interceptors: InterceptorChain::with_defaults(),
            pending: Vec::new(),
            started: false,
        })
    }

    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_interceptors(mut self, interceptors: InterceptorChain) -> Self {
        self.interceptors = interceptors;
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        tracing::debug!(observer = observer.name(), "observer attached");
        self.observers.push(observer);
    }

    pub fn add_interceptor(&mut self, interceptor: Box<dyn Interceptor>) -> Result<()> {
        self.interceptors.register(interceptor)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// The latest state. History always holds at least the initial state.
    pub fn current(&self) -> &WorldState {
        &self.history[self.history.len() - 1]
    }

    pub fn history(&self) -> &[WorldState] {
        &self.history
    }

    pub fn into_history(self) -> Vec<WorldState> {
        self.history
    }

    /// Events waiting for the next tick.
    pub fn pending(&self) -> &[SimulationEvent] {
        &self.pending
    }

    /// Runs a proposed action through the interceptor chain. An admitted
    /// action is queued as an `ExternalAction` event for the next tick.
    pub fn submit_action(&mut self, action: ProposedAction) -> Admission {
        let tick = self.current().tick;
        let state = &self.history[self.history.len() - 1];
        let admission = self.interceptors.evaluate(action, state);
        if let Admission::Admitted(admitted) = &admission {
            self.pending
                .push(SimulationEvent::new(tick, admitted.clone().into_event()));
        }
        admission
    }

    fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        tracing::info!(
            tick = self.current().tick,
            entities = self.current().entities.len(),
            systems = ?self.engine.system_names(),
            "simulation started"
        );
        let initial = &self.history[0];
        for observer in &mut self.observers {
            observer.on_simulation_start(initial);
        }
        self.collect_outboxes();
    }

    fn collect_outboxes(&mut self) {
        for observer in &mut self.observers {
            self.pending.extend(observer.drain_outbox());
        }
    }

    /// Advances one tick and returns the new state.
    ///
    /// On error the history is left as it was and pending events are kept.
    pub fn tick(&mut self) -> Result<&WorldState> {
        self.start();
        let previous = &self.history[self.history.len() - 1];
        let next = step(
            previous,
            &self.engine,
            &self.config,
            &mut self.context,
            self.pending.clone(),
        )?;
        self.pending.clear();

        let previous = &self.history[self.history.len() - 1];
        for observer in &mut self.observers {
            observer.on_tick(previous, &next);
        }
        self.history.push(next);
        self.collect_outboxes();
        Ok(self.current())
    }

    /// Runs `ticks` ticks, stopping at the first error.
    pub fn run(&mut self, ticks: u64) -> Result<&[WorldState]> {
        for _ in 0..ticks {
            self.tick()?;
        }
        Ok(&self.history)
    }

    /// Notifies observers that the run is over.
    pub fn finish(&mut self) {
        let last = &self.history[self.history.len() - 1];
        for observer in &mut self.observers {
            observer.on_simulation_end(last);
        }
        tracing::info!(
            tick = last.tick,
            total_wealth = last.total_wealth(),
            "simulation finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bounded::Currency;
    use crate::core::types::EntityId;
    use crate::events::types::{EventKind, EventType};
    use crate::state::entity::{SocialClass, SocialRole};

    fn c(raw: &str) -> EntityId {
        EntityId::parse(raw).unwrap()
    }

    fn lone_class() -> WorldState {
        WorldState::new().with_entity(
            SocialClass::new(c("C001"), SocialRole::PeripheryProletariat)
                .with_wealth(Currency::new(10.0).unwrap()),
        )
    }

    /// Emits one event per tick it sees.
    struct Echo {
        outbox: Vec<SimulationEvent>,
    }

    impl SimulationObserver for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn on_tick(&mut self, _previous: &WorldState, new: &WorldState) {
            self.outbox.push(SimulationEvent::new(
                new.tick,
                EventKind::EntityDeath { node_id: c("C001") },
            ));
        }

        fn drain_outbox(&mut self) -> Vec<SimulationEvent> {
            std::mem::take(&mut self.outbox)
        }
    }

    #[test]
    fn test_history_grows_per_tick() {
        let mut sim = Simulation::new(lone_class(), SimulationConfig::default()).unwrap();
        sim.run(3).unwrap();
        assert_eq!(sim.history().len(), 4);
        assert_eq!(sim.current().tick, 3);
    }

    #[test]
    fn test_observer_events_lag_one_tick() {
        let mut sim = Simulation::new(lone_class(), SimulationConfig::default()).unwrap();
        sim.add_observer(Box::new(Echo { outbox: Vec::new() }));
        sim.tick().unwrap();
        // Produced after tick 1 settled, so not yet in any state
        assert!(sim.current().events.iter().all(|e| e.event_type() != EventType::EntityDeath));
        assert_eq!(sim.pending().len(), 1);

        sim.tick().unwrap();
        let first = &sim.current().events[0];
        assert_eq!(first.event_type(), EventType::EntityDeath);
        assert_eq!(first.tick, 1);
    }

    #[test]
    fn test_admitted_action_enters_next_tick() {
        let mut sim = Simulation::new(lone_class(), SimulationConfig::default()).unwrap();
        assert!(sim
            .submit_action(ProposedAction::new(c("C001"), "strike", 0.5))
            .is_admitted());
        assert!(!sim
            .submit_action(ProposedAction::new(c("C077"), "strike", 0.5))
            .is_admitted());
        sim.tick().unwrap();
        let external: Vec<_> = sim
            .current()
            .events
            .iter()
            .filter(|e| e.event_type() == EventType::ExternalAction)
            .collect();
        assert_eq!(external.len(), 1);
        assert!(sim.pending().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SimulationConfig::default();
        config.economy.extraction_efficiency = 2.0;
        assert!(Simulation::new(lone_class(), config).is_err());
    }
}
