//! Spatial nodes

use serde::{Deserialize, Serialize};

use crate::core::bounded::{Coefficient, Currency, Intensity};
use crate::core::tagged::tagged_enum;
use crate::core::types::TerritoryId;

tagged_enum! {
    pub enum SectorType {
        Industrial => "industrial",
        Residential => "residential",
        Commercial => "commercial",
        University => "university",
        Docks => "docks",
        Government => "government",
    }
}

tagged_enum! {
    pub enum TerritoryType {
        Core => "core",
        Periphery => "periphery",
        Reservation => "reservation",
        PenalColony => "penal_colony",
    }
}

tagged_enum! {
    /// Visibility of organising activity in a territory
    pub enum OperationalProfile {
        LowProfile => "low_profile",
        HighProfile => "high_profile",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Territory {
    pub id: TerritoryId,
    pub name: String,
    pub sector_type: SectorType,
    pub territory_type: TerritoryType,
    pub profile: OperationalProfile,
    pub heat: Intensity,
    pub rent_level: Currency,
    pub population: u64,
    pub under_eviction: bool,
    pub biocapacity: Currency,
    pub max_biocapacity: Currency,
    pub regeneration_rate: Coefficient,
    pub extraction_intensity: Coefficient,
}

impl Territory {
    pub fn new(id: TerritoryId, sector_type: SectorType) -> Self {
        let full = Currency::new(100.0).unwrap_or_default();
        Self {
            name: id.to_string(),
            id,
            sector_type,
            territory_type: TerritoryType::Core,
            profile: OperationalProfile::LowProfile,
            heat: Intensity::ZERO,
            rent_level: Currency::ZERO,
            population: 0,
            under_eviction: false,
            biocapacity: full,
            max_biocapacity: full,
            regeneration_rate: Coefficient::new(0.02).unwrap_or_default(),
            extraction_intensity: Coefficient::ZERO,
        }
    }

    /// Remaining biocapacity as a share of its maximum.
    pub fn biocapacity_ratio(&self) -> f64 {
        let max = self.max_biocapacity.get();
        if max <= 0.0 {
            0.0
        } else {
            (self.biocapacity.get() / max).clamp(0.0, 1.0)
        }
    }
}
