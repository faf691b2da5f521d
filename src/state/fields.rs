//! Field tables between grouped state structs and flat graph attributes
//!
//! Each table lists every field the pipeline can see, the struct path it comes
//! from and the graph key it is exposed under. Flattening walks the table;
//! reconstruction (see `ingest`) walks it back and rejects any key that is not
//! listed.

use crate::state::entity::SocialClass;
use crate::state::graph::Attributes;
use crate::state::relationship::Relationship;
use crate::state::territory::Territory;

macro_rules! field_table {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $variant:ident => ($path:literal, $key:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Key on the graph attribute surface.
            pub const fn key(self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }

            /// Dotted path of the field inside the state struct.
            pub const fn path(self) -> &'static str {
                match self {
                    $($name::$variant => $path),+
                }
            }

            pub fn from_key(key: &str) -> Option<Self> {
                match key {
                    $($key => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

field_table! {
    /// Social-class fields. `cohesion` is exposed as `organization`.
    pub enum ClassField {
        Name => ("name", "name"),
        Role => ("role", "role"),
        Wealth => ("wealth", "wealth"),
        Population => ("population", "population"),
        Inequality => ("inequality", "inequality"),
        ClassConsciousness => ("ideology.class_consciousness", "class_consciousness"),
        NationalIdentity => ("ideology.national_identity", "national_identity"),
        Agitation => ("ideology.agitation", "agitation"),
        Organization => ("cohesion", "organization"),
        PAcquiescence => ("survival.p_acquiescence", "p_acquiescence"),
        PRevolution => ("survival.p_revolution", "p_revolution"),
        RepressionFaced => ("repression_faced", "repression_faced"),
        Active => ("active", "active"),
    }
}

field_table! {
    pub enum TerritoryField {
        Name => ("name", "name"),
        SectorType => ("sector_type", "sector_type"),
        TerritoryType => ("territory_type", "territory_type"),
        Profile => ("profile", "profile"),
        Heat => ("heat", "heat"),
        RentLevel => ("rent_level", "rent_level"),
        Population => ("population", "population"),
        UnderEviction => ("under_eviction", "under_eviction"),
        Biocapacity => ("biocapacity", "biocapacity"),
        MaxBiocapacity => ("max_biocapacity", "max_biocapacity"),
        RegenerationRate => ("regeneration_rate", "regeneration_rate"),
        ExtractionIntensity => ("extraction_intensity", "extraction_intensity"),
    }
}

field_table! {
    /// Edge fields. The edge type travels on the edge itself, not as an attribute.
    pub enum EdgeField {
        ValueFlow => ("value_flow", "value_flow"),
        Tension => ("tension", "tension"),
        SolidarityStrength => ("solidarity_strength", "solidarity_strength"),
    }
}

/// Graph keys as constants for the systems.
pub mod keys {
    use super::{ClassField, EdgeField, TerritoryField};

    pub const ROLE: &str = ClassField::Role.key();
    pub const WEALTH: &str = ClassField::Wealth.key();
    pub const POPULATION: &str = ClassField::Population.key();
    pub const INEQUALITY: &str = ClassField::Inequality.key();
    pub const CLASS_CONSCIOUSNESS: &str = ClassField::ClassConsciousness.key();
    pub const NATIONAL_IDENTITY: &str = ClassField::NationalIdentity.key();
    pub const AGITATION: &str = ClassField::Agitation.key();
    pub const ORGANIZATION: &str = ClassField::Organization.key();
    pub const P_ACQUIESCENCE: &str = ClassField::PAcquiescence.key();
    pub const P_REVOLUTION: &str = ClassField::PRevolution.key();
    pub const REPRESSION_FACED: &str = ClassField::RepressionFaced.key();
    pub const ACTIVE: &str = ClassField::Active.key();

    pub const PROFILE: &str = TerritoryField::Profile.key();
    pub const HEAT: &str = TerritoryField::Heat.key();
    pub const RENT_LEVEL: &str = TerritoryField::RentLevel.key();
    pub const TERRITORY_POPULATION: &str = TerritoryField::Population.key();
    pub const UNDER_EVICTION: &str = TerritoryField::UnderEviction.key();
    pub const BIOCAPACITY: &str = TerritoryField::Biocapacity.key();
    pub const MAX_BIOCAPACITY: &str = TerritoryField::MaxBiocapacity.key();
    pub const REGENERATION_RATE: &str = TerritoryField::RegenerationRate.key();
    pub const EXTRACTION_INTENSITY: &str = TerritoryField::ExtractionIntensity.key();

    pub const VALUE_FLOW: &str = EdgeField::ValueFlow.key();
    pub const TENSION: &str = EdgeField::Tension.key();
    pub const SOLIDARITY_STRENGTH: &str = EdgeField::SolidarityStrength.key();
}

pub fn flatten_class(class: &SocialClass) -> Attributes {
    let mut attrs = Attributes::new();
    for field in ClassField::ALL {
        let key = field.key();
        match field {
            ClassField::Name => attrs.set_text(key, class.name.clone()),
            ClassField::Role => attrs.set_text(key, class.role.as_str()),
            ClassField::Wealth => attrs.set_float(key, class.wealth.get()),
            ClassField::Population => attrs.set_int(key, class.population),
            ClassField::Inequality => attrs.set_float(key, class.inequality.get()),
            ClassField::ClassConsciousness => {
                attrs.set_float(key, class.ideology.class_consciousness.get())
            }
            ClassField::NationalIdentity => {
                attrs.set_float(key, class.ideology.national_identity.get())
            }
            ClassField::Agitation => attrs.set_float(key, class.ideology.agitation.get()),
            ClassField::Organization => attrs.set_float(key, class.cohesion.get()),
            ClassField::PAcquiescence => attrs.set_float(key, class.survival.p_acquiescence.get()),
            ClassField::PRevolution => attrs.set_float(key, class.survival.p_revolution.get()),
            ClassField::RepressionFaced => attrs.set_float(key, class.repression_faced.get()),
            ClassField::Active => attrs.set_bool(key, class.active),
        }
    }
    attrs
}

pub fn flatten_territory(territory: &Territory) -> Attributes {
    let mut attrs = Attributes::new();
    for field in TerritoryField::ALL {
        let key = field.key();
        match field {
            TerritoryField::Name => attrs.set_text(key, territory.name.clone()),
            TerritoryField::SectorType => attrs.set_text(key, territory.sector_type.as_str()),
            TerritoryField::TerritoryType => {
                attrs.set_text(key, territory.territory_type.as_str())
            }
            TerritoryField::Profile => attrs.set_text(key, territory.profile.as_str()),
            TerritoryField::Heat => attrs.set_float(key, territory.heat.get()),
            TerritoryField::RentLevel => attrs.set_float(key, territory.rent_level.get()),
            TerritoryField::Population => attrs.set_int(key, territory.population),
            TerritoryField::UnderEviction => attrs.set_bool(key, territory.under_eviction),
            TerritoryField::Biocapacity => attrs.set_float(key, territory.biocapacity.get()),
            TerritoryField::MaxBiocapacity => {
                attrs.set_float(key, territory.max_biocapacity.get())
            }
            TerritoryField::RegenerationRate => {
                attrs.set_float(key, territory.regeneration_rate.get())
            }
            TerritoryField::ExtractionIntensity => {
                attrs.set_float(key, territory.extraction_intensity.get())
            }
        }
    }
    attrs
}

pub fn flatten_relationship(rel: &Relationship) -> Attributes {
    let mut attrs = Attributes::new();
    for field in EdgeField::ALL {
        let key = field.key();
        match field {
            EdgeField::ValueFlow => attrs.set_float(key, rel.value_flow.get()),
            EdgeField::Tension => attrs.set_float(key, rel.tension.get()),
            EdgeField::SolidarityStrength => attrs.set_float(key, rel.solidarity_strength.get()),
        }
    }
    attrs
}
