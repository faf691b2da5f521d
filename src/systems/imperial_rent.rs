//! Imperial rent: extraction, tribute, wages and client-state subsidy
//!
//! Runs in five phases over the economic edges:
//!
//! 1. The core bourgeoisie reads its pool against the initial pool and the
//!    mean EXPLOITATION tension, then adjusts the super-wage rate and the
//!    repression faced by every non-exploiter class.
//! 2. EXPLOITATION edges move `α·Wp·(1−Ψp)` from periphery to exploiter.
//! 3. TRIBUTE edges pass rent received this tick upward, less the comprador cut.
//! 4. WAGES edges pay out the super-wage share of the payer's rent inflow,
//!    split evenly across the payer's wage edges.
//! 5. CLIENT_STATE edges subsidise a client whose revolt odds exceed the
//!    trigger, and stiffen its repression.
//!
//! Finally each class's income is compared with last tick's to give the wage
//! change consciousness will see.

use crate::core::error::SystemError;
use crate::core::types::NodeKind;
use crate::events::types::EventType;
use crate::formulas::decision::{bourgeoisie_decision, BourgeoisieDecision};
use crate::formulas::economic::imperial_rent;
use crate::payload;
use crate::state::entity::SocialRole;
use crate::state::fields::keys;
use crate::state::graph::{EdgeIdx, SimGraph};
use crate::state::relationship::EdgeType;
use crate::systems::{
    active_classes, is_active, node_name, role_of, scratch, transfer_wealth, RunContext, Services,
    System,
};

pub const NAMESPACE: &str = "imperial_rent";
pub const INITIAL_POOL: &str = "initial_pool";
pub const SUPER_WAGE_RATE: &str = "super_wage_rate";
const PREVIOUS_INCOME: &str = "imperial_rent.previous_income";

pub struct ImperialRentSystem;

impl System for ImperialRentSystem {
    fn name(&self) -> &'static str {
        "imperial_rent"
    }

    fn step(
        &self,
        graph: &mut SimGraph,
        services: &mut Services<'_>,
        context: &mut RunContext,
    ) -> Result<(), SystemError> {
        decide(graph, services, context)?;
        extract(graph, services)?;
        pay_tribute(graph, services)?;
        pay_wages(graph, services, context)?;
        subsidise_clients(graph, services)?;
        record_wage_change(graph, services, context)?;
        Ok(())
    }
}

/// Both ends of an edge are living classes.
fn live_edge(graph: &SimGraph, edge: EdgeIdx) -> Result<bool, SystemError> {
    let e = graph.edge(edge);
    let (s, t) = (e.source, e.target);
    if graph.node(s).kind() != NodeKind::SocialClass || graph.node(t).kind() != NodeKind::SocialClass
    {
        return Ok(false);
    }
    Ok(is_active(graph, s)? && is_active(graph, t)?)
}

fn endpoints(graph: &SimGraph, edge: EdgeIdx) -> (String, String) {
    let e = graph.edge(edge);
    (
        node_name(graph, e.source).to_string(),
        node_name(graph, e.target).to_string(),
    )
}

fn decide(
    graph: &mut SimGraph,
    services: &mut Services<'_>,
    context: &mut RunContext,
) -> Result<(), SystemError> {
    let classes = active_classes(graph)?;

    let mut pool = 0.0;
    let mut has_core = false;
    for &idx in &classes {
        if role_of(graph, idx)? == SocialRole::CoreBourgeoisie {
            pool += graph.float(idx, keys::WEALTH)?;
            has_core = true;
        }
    }
    if !has_core {
        return Ok(());
    }

    if !context.contains(NAMESPACE, INITIAL_POOL) {
        context.set(NAMESPACE, INITIAL_POOL, pool);
    }
    let initial = context.get_or(NAMESPACE, INITIAL_POOL, pool);
    let pool_ratio = if initial > 0.0 { pool / initial } else { 1.0 };

    let tensions = graph
        .edges_of_type(EdgeType::Exploitation)
        .into_iter()
        .map(|e| graph.edge_float(e, keys::TENSION))
        .collect::<Result<Vec<_>, _>>()?;
    let tension = if tensions.is_empty() {
        0.0
    } else {
        tensions.iter().sum::<f64>() / tensions.len() as f64
    };

    let outcome = bourgeoisie_decision(pool_ratio, tension, &services.config.decision);

    let rate = context.get_or(
        NAMESPACE,
        SUPER_WAGE_RATE,
        services.config.economy.super_wage_rate,
    );
    context.set(
        NAMESPACE,
        SUPER_WAGE_RATE,
        services.quantize((rate + outcome.wage_delta).clamp(0.0, 1.0)),
    );

    if outcome.repression_delta != 0.0 {
        for &idx in &classes {
            if role_of(graph, idx)?.is_exploiter() {
                continue;
            }
            let repression = graph.float(idx, keys::REPRESSION_FACED)?;
            graph.set_float(
                idx,
                keys::REPRESSION_FACED,
                services.quantize((repression + outcome.repression_delta).clamp(0.0, 1.0)),
            );
        }
    }

    if outcome.decision != BourgeoisieDecision::NoChange {
        tracing::debug!(
            decision = %outcome.decision,
            pool_ratio,
            tension,
            "bourgeoisie decision"
        );
    }
    let pool_ratio = services.quantize(pool_ratio);
    let tension = services.quantize(tension);
    services.publish(
        EventType::BourgeoisieDecision,
        payload! {
            "decision" => outcome.decision.as_str(),
            "pool_ratio" => pool_ratio,
            "aggregate_tension" => tension,
            "wage_delta" => outcome.wage_delta,
            "repression_delta" => outcome.repression_delta,
        },
    );
    Ok(())
}

fn extract(graph: &mut SimGraph, services: &mut Services<'_>) -> Result<(), SystemError> {
    let alpha = services.config.economy.extraction_efficiency;

    for edge in graph.edges_of_type(EdgeType::Exploitation) {
        if !live_edge(graph, edge)? {
            continue;
        }
        let (source, target) = {
            let e = graph.edge(edge);
            (e.source, e.target)
        };
        let wealth = graph.float(source, keys::WEALTH)?;
        let consciousness = graph.float(source, keys::CLASS_CONSCIOUSNESS)?;
        let rent = services.quantize(imperial_rent(alpha, wealth, consciousness));

        let moved = transfer_wealth(graph, services, source, target, rent)?;
        graph.set_edge_float(edge, keys::VALUE_FLOW, moved);
        if moved <= 0.0 {
            continue;
        }

        let (source_id, target_id) = endpoints(graph, edge);
        services.scratch.add(scratch::EXTRACTED, &source_id, moved);
        services.scratch.add(scratch::RENT_IN, &target_id, moved);
        tracing::trace!(source = %source_id, target = %target_id, amount = moved, "surplus extraction");
        services.publish(
            EventType::SurplusExtraction,
            payload! { "source_id" => source_id, "target_id" => target_id, "amount" => moved },
        );
    }
    Ok(())
}

fn pay_tribute(graph: &mut SimGraph, services: &mut Services<'_>) -> Result<(), SystemError> {
    let keep = services.config.economy.comprador_cut;

    for edge in graph.edges_of_type(EdgeType::Tribute) {
        if !live_edge(graph, edge)? {
            continue;
        }
        let (source, target) = {
            let e = graph.edge(edge);
            (e.source, e.target)
        };
        let (source_id, target_id) = endpoints(graph, edge);
        let inflow = services.scratch.get_or(scratch::RENT_IN, &source_id, 0.0);
        let owed = services.quantize(inflow * (1.0 - keep));

        let moved = transfer_wealth(graph, services, source, target, owed)?;
        graph.set_edge_float(edge, keys::VALUE_FLOW, moved);
        if moved <= 0.0 {
            continue;
        }

        services.scratch.add(scratch::RENT_IN, &target_id, moved);
        tracing::trace!(source = %source_id, target = %target_id, amount = moved, "tribute");
        services.publish(
            EventType::TributePaid,
            payload! { "source_id" => source_id, "target_id" => target_id, "amount" => moved },
        );
    }
    Ok(())
}

fn pay_wages(
    graph: &mut SimGraph,
    services: &mut Services<'_>,
    context: &RunContext,
) -> Result<(), SystemError> {
    let rate = context.get_or(
        NAMESPACE,
        SUPER_WAGE_RATE,
        services.config.economy.super_wage_rate,
    );

    for edge in graph.edges_of_type(EdgeType::Wages) {
        if !live_edge(graph, edge)? {
            continue;
        }
        let (source, target) = {
            let e = graph.edge(edge);
            (e.source, e.target)
        };
        let recipients = graph.out_edges(source, EdgeType::Wages).len().max(1);
        let (source_id, target_id) = endpoints(graph, edge);
        let inflow = services.scratch.get_or(scratch::RENT_IN, &source_id, 0.0);
        let share = services.quantize(rate * inflow / recipients as f64);

        let moved = transfer_wealth(graph, services, source, target, share)?;
        graph.set_edge_float(edge, keys::VALUE_FLOW, moved);
        if moved <= 0.0 {
            continue;
        }

        services.scratch.add(scratch::WAGES, &target_id, moved);
        tracing::trace!(source = %source_id, target = %target_id, amount = moved, "wages");
        services.publish(
            EventType::WagesPaid,
            payload! { "source_id" => source_id, "target_id" => target_id, "amount" => moved },
        );
    }
    Ok(())
}

fn subsidise_clients(graph: &mut SimGraph, services: &mut Services<'_>) -> Result<(), SystemError> {
    let economy = services.config.economy.clone();

    for edge in graph.edges_of_type(EdgeType::ClientState) {
        if !live_edge(graph, edge)? {
            continue;
        }
        let (source, target) = {
            let e = graph.edge(edge);
            (e.source, e.target)
        };
        let p_revolution = graph.float(target, keys::P_REVOLUTION)?;
        if p_revolution <= economy.client_state_trigger {
            graph.set_edge_float(edge, keys::VALUE_FLOW, 0.0);
            continue;
        }

        let wealth = graph.float(source, keys::WEALTH)?;
        let subsidy = services.quantize(wealth * economy.client_state_subsidy_rate);
        let moved = transfer_wealth(graph, services, source, target, subsidy)?;
        graph.set_edge_float(edge, keys::VALUE_FLOW, moved);

        let repression = graph.float(target, keys::REPRESSION_FACED)?;
        graph.set_float(
            target,
            keys::REPRESSION_FACED,
            services.quantize((repression + economy.client_state_repression_boost).clamp(0.0, 1.0)),
        );
        if moved <= 0.0 {
            continue;
        }

        let (source_id, target_id) = endpoints(graph, edge);
        services.scratch.add(scratch::WAGES, &target_id, moved);
        services.publish(
            EventType::ClientStateSubsidy,
            payload! { "source_id" => source_id, "target_id" => target_id, "amount" => moved },
        );
    }
    Ok(())
}

/// Relative change of wage income against the previous tick, 0 on the first.
fn record_wage_change(
    graph: &SimGraph,
    services: &mut Services<'_>,
    context: &mut RunContext,
) -> Result<(), SystemError> {
    for idx in active_classes(graph)? {
        let id = node_name(graph, idx).to_string();
        let income = services.scratch.get_or(scratch::WAGES, &id, 0.0);
        let change = match context.get(PREVIOUS_INCOME, &id) {
            Some(previous) if previous > 0.0 => (income - previous) / previous,
            _ => 0.0,
        };
        let change = services.quantize(change);
        services.scratch.set(scratch::WAGE_CHANGE, &id, change);
        context.set(PREVIOUS_INCOME, &id, income);
    }
    Ok(())
}
