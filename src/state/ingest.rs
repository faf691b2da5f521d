//! Normalisation of flat attribute records into validated state
//!
//! `from_graph` and external scenario loading share the `normalize_*`
//! functions, so a value that could not be loaded can never be produced by a
//! tick either. Reconstruction is strict: every listed key must be present and
//! no other key may appear. External records additionally go through the
//! legacy-alias table and inherit defaults for omitted fields.

use serde_json::Value;

use crate::core::bounded::{Coefficient, Currency, Intensity, Probability};
use crate::core::error::{ReconstructionError, ValidationError};
use crate::core::quantize::GridPolicy;
use crate::core::types::{EntityId, NodeId, TerritoryId};
use crate::state::entity::{IdeologicalProfile, SocialClass, SocialRole, SurvivalOutlook};
use crate::state::fields::{
    flatten_class, flatten_relationship, flatten_territory, ClassField, EdgeField, TerritoryField,
};
use crate::state::graph::{AttrValue, Attributes};
use crate::state::relationship::{EdgeType, Relationship};
use crate::state::territory::{OperationalProfile, SectorType, Territory, TerritoryType};
use crate::state::world::WorldState;

/// Older attribute names accepted from external records, mapped to canonical keys.
pub const LEGACY_KEYS: &[(&str, &str)] = &[
    ("cohesion", "organization"),
    ("consciousness", "class_consciousness"),
    ("repression", "repression_faced"),
    ("p_acquiesce", "p_acquiescence"),
];

/// Older role names accepted from external records.
pub const LEGACY_ROLES: &[(&str, SocialRole)] = &[
    ("proletariat", SocialRole::PeripheryProletariat),
    ("bourgeoisie", SocialRole::CoreBourgeoisie),
    ("comprador", SocialRole::CompradorBourgeoisie),
    ("lumpen", SocialRole::Lumpenproletariat),
];

fn canonical_key(key: &str) -> &str {
    LEGACY_KEYS
        .iter()
        .find(|(old, _)| *old == key)
        .map(|(_, new)| *new)
        .unwrap_or(key)
}

pub fn resolve_role(raw: &str) -> Option<SocialRole> {
    SocialRole::parse(raw).or_else(|| {
        LEGACY_ROLES
            .iter()
            .find(|(old, _)| *old == raw)
            .map(|(_, role)| *role)
    })
}

struct Reader<'a> {
    owner: &'a str,
    attrs: &'a Attributes,
    policy: GridPolicy,
}

impl<'a> Reader<'a> {
    fn raw(&self, key: &str) -> Result<&'a AttrValue, ReconstructionError> {
        self.attrs
            .get(key)
            .ok_or_else(|| ReconstructionError::MissingAttribute {
                node: self.owner.to_string(),
                key: key.to_string(),
            })
    }

    fn wrong(&self, key: &str, expected: &'static str) -> ReconstructionError {
        ReconstructionError::WrongType {
            node: self.owner.to_string(),
            key: key.to_string(),
            expected,
        }
    }

    fn float(&self, key: &str) -> Result<f64, ReconstructionError> {
        match self.raw(key)? {
            AttrValue::Float(v) => Ok(*v),
            AttrValue::Int(v) => Ok(*v as f64),
            _ => Err(self.wrong(key, "float")),
        }
    }

    fn int(&self, key: &str) -> Result<u64, ReconstructionError> {
        match self.raw(key)? {
            AttrValue::Int(v) => Ok(*v),
            _ => Err(self.wrong(key, "int")),
        }
    }

    fn boolean(&self, key: &str) -> Result<bool, ReconstructionError> {
        match self.raw(key)? {
            AttrValue::Bool(v) => Ok(*v),
            _ => Err(self.wrong(key, "bool")),
        }
    }

    fn text(&self, key: &str) -> Result<&'a str, ReconstructionError> {
        match self.raw(key)? {
            AttrValue::Text(v) => Ok(v.as_str()),
            _ => Err(self.wrong(key, "text")),
        }
    }

    fn bounded<T>(
        &self,
        key: &str,
        ctor: fn(&str, f64, GridPolicy) -> Result<T, ValidationError>,
    ) -> Result<T, ReconstructionError> {
        let value = self.float(key)?;
        ctor(key, value, self.policy).map_err(|source| ReconstructionError::InvalidValue {
            node: self.owner.to_string(),
            source,
        })
    }

    fn tag<E>(
        &self,
        key: &str,
        what: &'static str,
        parse: impl Fn(&str) -> Option<E>,
    ) -> Result<E, ReconstructionError> {
        let raw = self.text(key)?;
        parse(raw).ok_or_else(|| ReconstructionError::UnknownVariant {
            node: self.owner.to_string(),
            what,
            value: raw.to_string(),
        })
    }

    fn reject_unmapped(&self, known: impl Fn(&str) -> bool) -> Result<(), ReconstructionError> {
        match self.attrs.keys().find(|k| !known(k)) {
            Some(key) => Err(ReconstructionError::UnmappedAttribute {
                node: self.owner.to_string(),
                key: key.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Rebuild a social class from canonical flat attributes.
pub fn normalize_class(
    id: &NodeId,
    attrs: &Attributes,
    policy: GridPolicy,
) -> Result<SocialClass, ReconstructionError> {
    let r = Reader {
        owner: id.as_str(),
        attrs,
        policy,
    };
    r.reject_unmapped(|k| ClassField::from_key(k).is_some())?;

    Ok(SocialClass {
        id: EntityId::try_from(id.clone())?,
        name: r.text(ClassField::Name.key())?.to_string(),
        role: r.tag(ClassField::Role.key(), "role", SocialRole::parse)?,
        wealth: r.bounded(ClassField::Wealth.key(), Currency::with_policy)?,
        population: r.int(ClassField::Population.key())?,
        inequality: r.bounded(ClassField::Inequality.key(), Coefficient::with_policy)?,
        ideology: IdeologicalProfile {
            class_consciousness: r
                .bounded(ClassField::ClassConsciousness.key(), Probability::with_policy)?,
            national_identity: r
                .bounded(ClassField::NationalIdentity.key(), Probability::with_policy)?,
            agitation: r.bounded(ClassField::Agitation.key(), Intensity::with_policy)?,
        },
        cohesion: r.bounded(ClassField::Organization.key(), Probability::with_policy)?,
        survival: SurvivalOutlook {
            p_acquiescence: r.bounded(ClassField::PAcquiescence.key(), Probability::with_policy)?,
            p_revolution: r.bounded(ClassField::PRevolution.key(), Probability::with_policy)?,
        },
        repression_faced: r.bounded(ClassField::RepressionFaced.key(), Probability::with_policy)?,
        active: r.boolean(ClassField::Active.key())?,
    })
}

pub fn normalize_territory(
    id: &NodeId,
    attrs: &Attributes,
    policy: GridPolicy,
) -> Result<Territory, ReconstructionError> {
    let r = Reader {
        owner: id.as_str(),
        attrs,
        policy,
    };
    r.reject_unmapped(|k| TerritoryField::from_key(k).is_some())?;

    Ok(Territory {
        id: TerritoryId::try_from(id.clone())?,
        name: r.text(TerritoryField::Name.key())?.to_string(),
        sector_type: r.tag(TerritoryField::SectorType.key(), "sector_type", SectorType::parse)?,
        territory_type: r.tag(
            TerritoryField::TerritoryType.key(),
            "territory_type",
            TerritoryType::parse,
        )?,
        profile: r.tag(TerritoryField::Profile.key(), "profile", OperationalProfile::parse)?,
        heat: r.bounded(TerritoryField::Heat.key(), Intensity::with_policy)?,
        rent_level: r.bounded(TerritoryField::RentLevel.key(), Currency::with_policy)?,
        population: r.int(TerritoryField::Population.key())?,
        under_eviction: r.boolean(TerritoryField::UnderEviction.key())?,
        biocapacity: r.bounded(TerritoryField::Biocapacity.key(), Currency::with_policy)?,
        max_biocapacity: r.bounded(TerritoryField::MaxBiocapacity.key(), Currency::with_policy)?,
        regeneration_rate: r.bounded(
            TerritoryField::RegenerationRate.key(),
            Coefficient::with_policy,
        )?,
        extraction_intensity: r.bounded(
            TerritoryField::ExtractionIntensity.key(),
            Coefficient::with_policy,
        )?,
    })
}

/// Rebuild a relationship; `index` identifies the edge in errors.
pub fn normalize_relationship(
    index: usize,
    source: &NodeId,
    target: &NodeId,
    edge_type: EdgeType,
    attrs: &Attributes,
    policy: GridPolicy,
) -> Result<Relationship, ReconstructionError> {
    let edge_error = |detail: String| ReconstructionError::Edge {
        index,
        source_id: source.to_string(),
        target_id: target.to_string(),
        detail,
    };

    let (want_source, want_target) = edge_type.endpoints();
    if source.kind() != want_source || target.kind() != want_target {
        return Err(edge_error(format!(
            "{} requires {:?} -> {:?}",
            edge_type, want_source, want_target
        )));
    }

    let owner = format!("{}->{}", source, target);
    let r = Reader {
        owner: &owner,
        attrs,
        policy,
    };
    r.reject_unmapped(|k| EdgeField::from_key(k).is_some())
        .map_err(|e| edge_error(e.to_string()))?;

    let read = || -> Result<Relationship, ReconstructionError> {
        Ok(Relationship {
            source: source.clone(),
            target: target.clone(),
            edge_type,
            value_flow: r.bounded(EdgeField::ValueFlow.key(), Currency::with_policy)?,
            tension: r.bounded(EdgeField::Tension.key(), Intensity::with_policy)?,
            solidarity_strength: r.bounded(
                EdgeField::SolidarityStrength.key(),
                Probability::with_policy,
            )?,
        })
    };
    read().map_err(|e| edge_error(e.to_string()))
}

// --- external records ---

fn json_to_attr(value: &Value) -> Option<AttrValue> {
    match value {
        Value::Bool(b) => Some(AttrValue::Bool(*b)),
        Value::String(s) => Some(AttrValue::Text(s.clone())),
        Value::Number(n) => match n.as_u64() {
            Some(i) => Some(AttrValue::Int(i)),
            None => n.as_f64().map(AttrValue::Float),
        },
        _ => None,
    }
}

/// Overlay a JSON object onto `base`, resolving legacy keys.
fn overlay(
    owner: &str,
    base: &mut Attributes,
    record: &serde_json::Map<String, Value>,
    skip: &[&str],
) -> Result<(), ReconstructionError> {
    for (key, value) in record {
        if skip.contains(&key.as_str()) {
            continue;
        }
        let attr = json_to_attr(value).ok_or_else(|| ReconstructionError::WrongType {
            node: owner.to_string(),
            key: key.clone(),
            expected: "scalar",
        })?;
        base.insert(canonical_key(key), attr);
    }
    Ok(())
}

fn as_object<'a>(
    owner: &str,
    value: &'a Value,
) -> Result<&'a serde_json::Map<String, Value>, ReconstructionError> {
    value.as_object().ok_or_else(|| ReconstructionError::WrongType {
        node: owner.to_string(),
        key: "<record>".into(),
        expected: "object",
    })
}

fn str_field<'a>(
    owner: &str,
    record: &'a serde_json::Map<String, Value>,
    key: &str,
) -> Result<&'a str, ReconstructionError> {
    record
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ReconstructionError::MissingAttribute {
            node: owner.to_string(),
            key: key.to_string(),
        })
}

/// Ingest one flat external class record. `role` is required; omitted fields
/// take the defaults of [`SocialClass::new`].
pub fn ingest_class_record(
    id: &EntityId,
    record: &serde_json::Map<String, Value>,
    policy: GridPolicy,
) -> Result<SocialClass, ReconstructionError> {
    let role_raw = str_field(id.as_str(), record, "role")?;
    let role = resolve_role(role_raw).ok_or_else(|| ReconstructionError::UnknownVariant {
        node: id.to_string(),
        what: "role",
        value: role_raw.to_string(),
    })?;

    let mut attrs = flatten_class(&SocialClass::new(id.clone(), role));
    overlay(id.as_str(), &mut attrs, record, &["role"])?;
    normalize_class(&id.node_id(), &attrs, policy)
}

/// Ingest one flat external territory record. `sector_type` is required.
pub fn ingest_territory_record(
    id: &TerritoryId,
    record: &serde_json::Map<String, Value>,
    policy: GridPolicy,
) -> Result<Territory, ReconstructionError> {
    let sector_raw = str_field(id.as_str(), record, "sector_type")?;
    let sector = SectorType::parse(sector_raw).ok_or_else(|| ReconstructionError::UnknownVariant {
        node: id.to_string(),
        what: "sector_type",
        value: sector_raw.to_string(),
    })?;

    let mut attrs = flatten_territory(&Territory::new(id.clone(), sector));
    overlay(id.as_str(), &mut attrs, record, &[])?;
    normalize_territory(&id.node_id(), &attrs, policy)
}

/// Ingest a flat external relationship record with `source`, `target`, `edge_type`.
pub fn ingest_relationship_record(
    index: usize,
    record: &serde_json::Map<String, Value>,
    policy: GridPolicy,
) -> Result<Relationship, ReconstructionError> {
    let owner = format!("relationship #{}", index);
    let source = NodeId::parse(str_field(&owner, record, "source")?)?;
    let target = NodeId::parse(str_field(&owner, record, "target")?)?;
    let type_raw = str_field(&owner, record, "edge_type")?;
    let edge_type = EdgeType::parse(type_raw).ok_or_else(|| ReconstructionError::UnknownVariant {
        node: owner.clone(),
        what: "edge_type",
        value: type_raw.to_string(),
    })?;

    let mut attrs = flatten_relationship(&Relationship::new(
        source.clone(),
        target.clone(),
        edge_type,
    ));
    overlay(&owner, &mut attrs, record, &["source", "target", "edge_type"])?;
    normalize_relationship(index, &source, &target, edge_type, &attrs, policy)
}

/// Ingest a scenario document:
///
/// ```json
/// { "entities": { "C001": { "role": "proletariat", "wealth": 100 } },
///   "territories": { "T001": { "sector_type": "industrial" } },
///   "relationships": [ { "source": "C001", "target": "C002", "edge_type": "EXPLOITATION" } ] }
/// ```
pub fn ingest_scenario(document: &Value, policy: GridPolicy) -> Result<WorldState, ReconstructionError> {
    let root = as_object("<scenario>", document)?;
    let mut state = WorldState::new();

    if let Some(entities) = root.get("entities") {
        for (raw_id, record) in as_object("entities", entities)? {
            let id = EntityId::parse(raw_id.clone())?;
            let class = ingest_class_record(&id, as_object(raw_id, record)?, policy)?;
            state.entities.insert(id, class);
        }
    }

    if let Some(territories) = root.get("territories") {
        for (raw_id, record) in as_object("territories", territories)? {
            let id = TerritoryId::parse(raw_id.clone())?;
            let territory = ingest_territory_record(&id, as_object(raw_id, record)?, policy)?;
            state.territories.insert(id, territory);
        }
    }

    if let Some(relationships) = root.get("relationships") {
        let list = relationships
            .as_array()
            .ok_or_else(|| ReconstructionError::WrongType {
                node: "<scenario>".into(),
                key: "relationships".into(),
                expected: "array",
            })?;
        for (index, record) in list.iter().enumerate() {
            let owner = format!("relationship #{}", index);
            let rel = ingest_relationship_record(index, as_object(&owner, record)?, policy)?;
            state.relationships.push(rel);
        }
    }

    state.check_references()?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fields::keys;
    use serde_json::json;

    fn class_attrs() -> (NodeId, Attributes) {
        let id = EntityId::parse("C001").unwrap();
        let class = SocialClass::new(id.clone(), SocialRole::PeripheryProletariat);
        (id.node_id(), flatten_class(&class))
    }

    #[test]
    fn test_normalize_roundtrip() {
        let (id, attrs) = class_attrs();
        let class = normalize_class(&id, &attrs, GridPolicy::DEFAULT).unwrap();
        assert_eq!(flatten_class(&class), attrs);
    }

    #[test]
    fn test_unmapped_key_fails_loudly() {
        let (id, mut attrs) = class_attrs();
        attrs.set_float("hidden_state", 1.0);
        let err = normalize_class(&id, &attrs, GridPolicy::DEFAULT).unwrap_err();
        assert_eq!(
            err,
            ReconstructionError::UnmappedAttribute {
                node: "C001".into(),
                key: "hidden_state".into()
            }
        );
    }

    #[test]
    fn test_missing_key_fails_loudly() {
        let (id, mut attrs) = class_attrs();
        attrs.remove(keys::AGITATION);
        let err = normalize_class(&id, &attrs, GridPolicy::DEFAULT).unwrap_err();
        assert!(matches!(err, ReconstructionError::MissingAttribute { ref key, .. } if key == "agitation"));
    }

    #[test]
    fn test_out_of_range_names_node() {
        let (id, mut attrs) = class_attrs();
        attrs.set_float(keys::CLASS_CONSCIOUSNESS, 1.2);
        let err = normalize_class(&id, &attrs, GridPolicy::DEFAULT).unwrap_err();
        match err {
            ReconstructionError::InvalidValue { node, source } => {
                assert_eq!(node, "C001");
                assert_eq!(source.field, "class_consciousness");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_values_are_quantized_on_rebuild() {
        let (id, mut attrs) = class_attrs();
        attrs.set_float(keys::WEALTH, 10.123456789);
        let class = normalize_class(&id, &attrs, GridPolicy::DEFAULT).unwrap();
        assert_eq!(class.wealth.get(), 10.12346);
    }

    #[test]
    fn test_legacy_record_ingestion() {
        let id = EntityId::parse("C004").unwrap();
        let record = json!({ "role": "proletariat", "wealth": 100, "cohesion": 0.4 });
        let class =
            ingest_class_record(&id, record.as_object().unwrap(), GridPolicy::DEFAULT).unwrap();
        assert_eq!(class.role, SocialRole::PeripheryProletariat);
        assert_eq!(class.cohesion.get(), 0.4);
        assert_eq!(class.wealth.get(), 100.0);
    }

    #[test]
    fn test_tenancy_endpoint_kinds_enforced() {
        let c1 = NodeId::parse("C001").unwrap();
        let c2 = NodeId::parse("C002").unwrap();
        let rel = Relationship::new(c1.clone(), c2.clone(), EdgeType::Tenancy);
        let err = normalize_relationship(
            0,
            &c1,
            &c2,
            EdgeType::Tenancy,
            &flatten_relationship(&rel),
            GridPolicy::DEFAULT,
        )
        .unwrap_err();
        assert!(matches!(err, ReconstructionError::Edge { index: 0, .. }));
    }

    #[test]
    fn test_ingest_scenario_document() {
        let doc = json!({
            "entities": {
                "C001": { "role": "proletariat", "wealth": 100 },
                "C002": { "role": "bourgeoisie", "wealth": 50 }
            },
            "relationships": [
                { "source": "C001", "target": "C002", "edge_type": "EXPLOITATION" }
            ]
        });
        let state = ingest_scenario(&doc, GridPolicy::DEFAULT).unwrap();
        assert_eq!(state.entities.len(), 2);
        assert_eq!(state.relationships.len(), 1);
        assert_eq!(state.tick, 0);
    }

    #[test]
    fn test_ingest_rejects_dangling_relationship() {
        let doc = json!({
            "entities": { "C001": { "role": "proletariat" } },
            "relationships": [
                { "source": "C001", "target": "C009", "edge_type": "SOLIDARITY" }
            ]
        });
        assert!(ingest_scenario(&doc, GridPolicy::DEFAULT).is_err());
    }
}
