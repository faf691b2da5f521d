//! Built-in worlds for the CLI, benches and tests

use crate::core::bounded::{Currency, Probability};
use crate::core::types::{EntityId, TerritoryId};
use crate::state::entity::{SocialClass, SocialRole};
use crate::state::relationship::{EdgeType, Relationship};
use crate::state::territory::{OperationalProfile, SectorType, Territory};
use crate::state::world::WorldState;

fn entity(index: u32) -> EntityId {
    EntityId::from_index(index)
}

fn territory(index: u32) -> TerritoryId {
    TerritoryId::from_index(index)
}

fn currency(value: f64) -> Currency {
    Currency::new(value).unwrap_or(Currency::ZERO)
}

fn probability(value: f64) -> Probability {
    Probability::new(value).unwrap_or(Probability::ZERO)
}

/// A periphery worker (C001, wealth 100) exploited by a core owner
/// (C002, wealth 50) along one EXPLOITATION edge.
pub fn two_node_scenario() -> WorldState {
    let worker = entity(1);
    let owner = entity(2);
    WorldState::new()
        .with_entity(
            SocialClass::new(worker.clone(), SocialRole::PeripheryProletariat)
                .with_name("Periphery Worker")
                .with_wealth(currency(100.0)),
        )
        .with_entity(
            SocialClass::new(owner.clone(), SocialRole::CoreBourgeoisie)
                .with_name("Core Owner")
                .with_wealth(currency(50.0)),
        )
        .with_relationship(Relationship::new(worker, owner, EdgeType::Exploitation))
}

/// The full imperial circuit: periphery workers exploited by a comprador who
/// pays tribute to the core, which pays wages to a labor aristocracy. Two
/// workshops sit on adjacent territories and the periphery is organised.
pub fn imperial_circuit() -> WorldState {
    let periphery = entity(1);
    let comprador = entity(2);
    let core = entity(3);
    let aristocracy = entity(4);
    let organisers = entity(5);

    let mut plantation = Territory::new(territory(1), SectorType::Industrial);
    plantation.population = 5_000;
    plantation.rent_level = currency(5.0);
    let mut docks = Territory::new(territory(2), SectorType::Docks);
    docks.population = 2_000;
    docks.profile = OperationalProfile::HighProfile;
    docks.rent_level = currency(8.0);

    let mut organised = SocialClass::new(organisers.clone(), SocialRole::PeripheryProletariat)
        .with_name("Dock Organisers")
        .with_wealth(currency(30.0))
        .with_population(20);
    organised.ideology.class_consciousness = probability(0.7);
    organised.cohesion = probability(0.6);

    WorldState::new()
        .with_entity(
            SocialClass::new(periphery.clone(), SocialRole::PeripheryProletariat)
                .with_name("Plantation Workers")
                .with_wealth(currency(200.0))
                .with_population(100),
        )
        .with_entity(
            SocialClass::new(comprador.clone(), SocialRole::CompradorBourgeoisie)
                .with_name("Comprador")
                .with_wealth(currency(80.0))
                .with_population(5),
        )
        .with_entity(
            SocialClass::new(core.clone(), SocialRole::CoreBourgeoisie)
                .with_name("Metropolitan Capital")
                .with_wealth(currency(500.0))
                .with_population(2),
        )
        .with_entity(
            SocialClass::new(aristocracy.clone(), SocialRole::LaborAristocracy)
                .with_name("Core Workers")
                .with_wealth(currency(120.0))
                .with_population(40),
        )
        .with_entity(organised)
        .with_territory(plantation)
        .with_territory(docks)
        .with_relationship(Relationship::new(
            periphery.clone(),
            comprador.clone(),
            EdgeType::Exploitation,
        ))
        .with_relationship(Relationship::new(comprador, core.clone(), EdgeType::Tribute))
        .with_relationship(Relationship::new(core, aristocracy, EdgeType::Wages))
        .with_relationship(
            Relationship::new(organisers.clone(), periphery.clone(), EdgeType::Solidarity)
                .with_strength(probability(0.5)),
        )
        .with_relationship(Relationship::new(periphery, territory(1), EdgeType::Tenancy))
        .with_relationship(Relationship::new(organisers, territory(2), EdgeType::Tenancy))
        .with_relationship(Relationship::new(territory(2), territory(1), EdgeType::Adjacency))
}

/// `size` periphery classes in a ring of SOLIDARITY ties, every third tie
/// strong, with one owner exploiting each of them.
pub fn solidarity_ring(size: u32) -> WorldState {
    let owner = entity(size + 1);
    let mut state = WorldState::new().with_entity(
        SocialClass::new(owner.clone(), SocialRole::CoreBourgeoisie)
            .with_wealth(currency(1_000.0)),
    );
    for i in 1..=size {
        let id = entity(i);
        let mut class = SocialClass::new(id.clone(), SocialRole::PeripheryProletariat)
            .with_wealth(currency(50.0 + f64::from(i % 7) * 10.0))
            .with_population(10);
        class.ideology.class_consciousness = probability(f64::from(i % 10) / 10.0);
        state = state
            .with_entity(class)
            .with_relationship(Relationship::new(
                id.clone(),
                owner.clone(),
                EdgeType::Exploitation,
            ));
        if size > 1 {
            let next = entity(i % size + 1);
            let strength = if i % 3 == 0 { 0.6 } else { 0.2 };
            state = state.with_relationship(
                Relationship::new(id, next, EdgeType::Solidarity)
                    .with_strength(probability(strength)),
            );
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_consistent() {
        assert!(two_node_scenario().check_references().is_ok());
        assert!(imperial_circuit().check_references().is_ok());
        assert!(solidarity_ring(12).check_references().is_ok());
    }

    #[test]
    fn test_ring_shape() {
        let ring = solidarity_ring(6);
        assert_eq!(ring.entities.len(), 7);
        let ties = ring
            .relationships
            .iter()
            .filter(|r| r.edge_type == EdgeType::Solidarity)
            .count();
        assert_eq!(ties, 6);
    }
}
