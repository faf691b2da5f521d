//! Admission of externally proposed actions
//!
//! An outside actor proposes an action; a chain of named interceptors decides
//! whether it enters the simulation. The chain runs from the highest priority
//! down and the first block ends it. Admitted actions become `ExternalAction`
//! events in the next tick.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::tagged::tagged_enum;
use crate::core::types::{EntityId, NodeId, NodeKind};
use crate::events::types::EventKind;
use crate::state::world::WorldState;

tagged_enum! {
    /// Priority band an interceptor registers in
    pub enum PriorityBand {
        Security => "security",
        Faction => "faction",
        Validation => "validation",
        Audit => "audit",
    }
}

impl PriorityBand {
    /// Inclusive priority range of the band.
    pub fn range(self) -> (u8, u8) {
        match self {
            PriorityBand::Security => (90, 100),
            PriorityBand::Faction => (50, 89),
            PriorityBand::Validation => (10, 49),
            PriorityBand::Audit => (1, 9),
        }
    }

    pub fn of(priority: u8) -> Option<Self> {
        PriorityBand::ALL.iter().copied().find(|band| {
            let (low, high) = band.range();
            (low..=high).contains(&priority)
        })
    }
}

/// An action proposed from outside the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedAction {
    pub actor: EntityId,
    pub action: String,
    pub target: Option<NodeId>,
    pub magnitude: f64,
}

impl ProposedAction {
    pub fn new(actor: EntityId, action: impl Into<String>, magnitude: f64) -> Self {
        Self {
            actor,
            action: action.into(),
            target: None,
            magnitude,
        }
    }

    pub fn with_target(mut self, target: impl Into<NodeId>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub(crate) fn into_event(self) -> EventKind {
        EventKind::ExternalAction {
            actor_id: self.actor,
            action: self.action,
            target_id: self.target,
            magnitude: self.magnitude,
        }
    }
}

/// What one interceptor says about an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Allow,
    Block(String),
    /// Replace the action seen by the rest of the chain
    Modify(ProposedAction),
}

pub trait Interceptor {
    fn name(&self) -> &str;

    /// 1 to 100; see [`PriorityBand`].
    fn priority(&self) -> u8;

    fn intercept(&mut self, action: &ProposedAction, state: &WorldState) -> Verdict;
}

/// Result of running the whole chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Admitted(ProposedAction),
    Blocked { by: String, reason: String },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted(_))
    }
}

#[derive(Default)]
pub struct InterceptorChain {
    interceptors: Vec<Box<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in validator and audit log.
    pub fn with_defaults() -> Self {
        let mut chain = Self::new();
        chain.interceptors.push(Box::new(ActorExistsValidator));
        chain.interceptors.push(Box::new(AuditRecorder::default()));
        chain
    }

    /// Adds an interceptor, keeping registration order among equal priorities.
    pub fn register(&mut self, interceptor: Box<dyn Interceptor>) -> Result<()> {
        let priority = interceptor.priority();
        if PriorityBand::of(priority).is_none() {
            return Err(SimError::Interceptor {
                name: interceptor.name().to_string(),
                reason: format!("priority {} lies outside every band (1 to 100)", priority),
            });
        }
        let at = self
            .interceptors
            .iter()
            .position(|existing| existing.priority() < priority)
            .unwrap_or(self.interceptors.len());
        self.interceptors.insert(at, interceptor);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    pub fn evaluate(&mut self, action: ProposedAction, state: &WorldState) -> Admission {
        let mut current = action;
        for interceptor in &mut self.interceptors {
            match interceptor.intercept(&current, state) {
                Verdict::Allow => {}
                Verdict::Block(reason) => {
                    tracing::warn!(
                        interceptor = interceptor.name(),
                        actor = %current.actor,
                        action = %current.action,
                        %reason,
                        "action blocked"
                    );
                    return Admission::Blocked {
                        by: interceptor.name().to_string(),
                        reason,
                    };
                }
                Verdict::Modify(replacement) => {
                    tracing::debug!(interceptor = interceptor.name(), "action modified");
                    current = replacement;
                }
            }
        }
        Admission::Admitted(current)
    }
}

/// Blocks actions from unknown or dead actors, against unknown targets, or
/// with a non-finite magnitude.
pub struct ActorExistsValidator;

impl Interceptor for ActorExistsValidator {
    fn name(&self) -> &str {
        "actor_exists"
    }

    fn priority(&self) -> u8 {
        40
    }

    fn intercept(&mut self, action: &ProposedAction, state: &WorldState) -> Verdict {
        match state.entities.get(&action.actor) {
            None => return Verdict::Block(format!("unknown actor {}", action.actor)),
            Some(class) if !class.active => {
                return Verdict::Block(format!("actor {} is no longer active", action.actor))
            }
            Some(_) => {}
        }
        if let Some(target) = &action.target {
            let known = match target.kind() {
                NodeKind::SocialClass => state.entity(target.as_str()).is_some(),
                NodeKind::Territory => state.territory(target.as_str()).is_some(),
            };
            if !known {
                return Verdict::Block(format!("unknown target {}", target));
            }
        }
        if !action.magnitude.is_finite() {
            return Verdict::Block("magnitude is not finite".into());
        }
        Verdict::Allow
    }
}

/// One line per action that reached the audit band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub tick: u64,
    pub actor: EntityId,
    pub action: String,
}

/// Records every action that reaches it and never objects.
#[derive(Debug, Default)]
pub struct AuditRecorder {
    entries: Vec<AuditEntry>,
}

impl AuditRecorder {
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }
}

impl Interceptor for AuditRecorder {
    fn name(&self) -> &str {
        "audit"
    }

    fn priority(&self) -> u8 {
        1
    }

    fn intercept(&mut self, action: &ProposedAction, state: &WorldState) -> Verdict {
        tracing::info!(
            tick = state.tick,
            actor = %action.actor,
            action = %action.action,
            "external action admitted"
        );
        self.entries.push(AuditEntry {
            tick: state.tick,
            actor: action.actor.clone(),
            action: action.action.clone(),
        });
        Verdict::Allow
    }
}
