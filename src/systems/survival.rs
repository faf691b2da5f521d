//! Survival calculus

use crate::core::error::SystemError;
use crate::formulas::survival::{acquiescence_probability, revolution_probability};
use crate::state::fields::keys;
use crate::state::graph::SimGraph;
use crate::systems::{active_classes, RunContext, Services, System};

/// Writes `p_acquiescence` from per-capita wealth and `p_revolution` from
/// organization against repression.
pub struct SurvivalSystem;

impl System for SurvivalSystem {
    fn name(&self) -> &'static str {
        "survival"
    }

    fn step(
        &self,
        graph: &mut SimGraph,
        services: &mut Services<'_>,
        _context: &mut RunContext,
    ) -> Result<(), SystemError> {
        let params = services.config.survival.clone();

        for idx in active_classes(graph)? {
            let wealth = graph.float(idx, keys::WEALTH)?;
            let population = graph.int(idx, keys::POPULATION)?;
            let per_capita = if population == 0 {
                0.0
            } else {
                wealth / population as f64
            };
            let organization = graph.float(idx, keys::ORGANIZATION)?;
            let repression = graph.float(idx, keys::REPRESSION_FACED)?;

            let p_acq =
                acquiescence_probability(per_capita, params.subsistence_threshold, params.steepness);
            let p_rev = revolution_probability(organization, repression, params.epsilon);

            graph.set_float(idx, keys::P_ACQUIESCENCE, services.quantize(p_acq));
            graph.set_float(idx, keys::P_REVOLUTION, services.quantize(p_rev));
        }
        Ok(())
    }
}
