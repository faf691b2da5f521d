//! Social-class nodes

use serde::{Deserialize, Serialize};

use crate::core::bounded::{Coefficient, Currency, Intensity, Probability};
use crate::core::tagged::tagged_enum;
use crate::core::types::EntityId;

tagged_enum! {
    /// Position of a class in the world system
    pub enum SocialRole {
        CoreBourgeoisie => "core_bourgeoisie",
        PeripheryProletariat => "periphery_proletariat",
        LaborAristocracy => "labor_aristocracy",
        PettyBourgeoisie => "petty_bourgeoisie",
        CompradorBourgeoisie => "comprador_bourgeoisie",
        Lumpenproletariat => "lumpenproletariat",
    }
}

impl SocialRole {
    /// Classes that own the means of extraction.
    pub fn is_exploiter(self) -> bool {
        matches!(
            self,
            SocialRole::CoreBourgeoisie | SocialRole::CompradorBourgeoisie
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdeologicalProfile {
    pub class_consciousness: Probability,
    pub national_identity: Probability,
    pub agitation: Intensity,
}

/// Output of the survival calculus
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurvivalOutlook {
    pub p_acquiescence: Probability,
    pub p_revolution: Probability,
}

/// A demographic block with shared material position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SocialClass {
    pub id: EntityId,
    pub name: String,
    pub role: SocialRole,
    pub wealth: Currency,
    /// Number of people in the block
    pub population: u64,
    /// Intra-block Gini-like coefficient
    pub inequality: Coefficient,
    pub ideology: IdeologicalProfile,
    /// Organisational cohesion, exposed on the graph as `organization`
    pub cohesion: Probability,
    pub survival: SurvivalOutlook,
    pub repression_faced: Probability,
    /// False once the population has died out
    pub active: bool,
}

/// Default cohesion of a freshly loaded class.
const DEFAULT_COHESION: f64 = 0.1;
/// Default repression faced by a freshly loaded class.
const DEFAULT_REPRESSION: f64 = 0.5;

impl SocialClass {
    /// A single-member class with no wealth and default ideology.
    pub fn new(id: EntityId, role: SocialRole) -> Self {
        Self {
            name: id.to_string(),
            id,
            role,
            wealth: Currency::ZERO,
            population: 1,
            inequality: Coefficient::ZERO,
            ideology: IdeologicalProfile::default(),
            cohesion: Probability::new(DEFAULT_COHESION).unwrap_or_default(),
            survival: SurvivalOutlook::default(),
            repression_faced: Probability::new(DEFAULT_REPRESSION).unwrap_or_default(),
            active: true,
        }
    }

    pub fn with_wealth(mut self, wealth: Currency) -> Self {
        self.wealth = wealth;
        self
    }

    pub fn with_population(mut self, population: u64) -> Self {
        self.population = population;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Wealth per member; a dead class has none.
    pub fn wealth_per_capita(&self) -> f64 {
        if self.population == 0 {
            0.0
        } else {
            self.wealth.get() / self.population as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_class_defaults() {
        let class = SocialClass::new(EntityId::parse("C001").unwrap(), SocialRole::PeripheryProletariat);
        assert_eq!(class.name, "C001");
        assert_eq!(class.population, 1);
        assert_eq!(class.cohesion.get(), 0.1);
        assert_eq!(class.repression_faced.get(), 0.5);
        assert!(class.active);
    }

    #[test]
    fn test_exploiter_roles() {
        assert!(SocialRole::CoreBourgeoisie.is_exploiter());
        assert!(SocialRole::CompradorBourgeoisie.is_exploiter());
        assert!(!SocialRole::LaborAristocracy.is_exploiter());
        assert!(!SocialRole::PeripheryProletariat.is_exploiter());
    }

    #[test]
    fn test_wealth_per_capita() {
        let class = SocialClass::new(EntityId::parse("C002").unwrap(), SocialRole::LaborAristocracy)
            .with_wealth(Currency::new(100.0).unwrap())
            .with_population(4);
        assert_eq!(class.wealth_per_capita(), 25.0);
        assert_eq!(class.with_population(0).wealth_per_capita(), 0.0);
    }

    #[test]
    fn test_serde_rejects_unknown_fields() {
        let class = SocialClass::new(EntityId::parse("C003").unwrap(), SocialRole::CoreBourgeoisie);
        let mut value = serde_json::to_value(&class).unwrap();
        value["mystery"] = serde_json::json!(1);
        assert!(serde_json::from_value::<SocialClass>(value).is_err());
    }
}
