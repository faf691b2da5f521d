use thiserror::Error;

use crate::core::types::Tick;

/// A constrained value was constructed outside its range or from a non-finite float.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{type_name} field `{field}` rejected {value}: {reason}")]
pub struct ValidationError {
    pub type_name: &'static str,
    pub field: String,
    pub value: f64,
    pub reason: String,
}

/// Raised while rebuilding a `WorldState` from a projected graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconstructionError {
    #[error("node `{node}` is missing attribute `{key}`")]
    MissingAttribute { node: String, key: String },

    #[error("node `{node}` carries unmapped attribute `{key}`")]
    UnmappedAttribute { node: String, key: String },

    #[error("node `{node}` attribute `{key}` has wrong type (expected {expected})")]
    WrongType {
        node: String,
        key: String,
        expected: &'static str,
    },

    #[error("node `{node}`: {source}")]
    InvalidValue {
        node: String,
        #[source]
        source: ValidationError,
    },

    #[error("node `{node}` has unknown {what} `{value}`")]
    UnknownVariant {
        node: String,
        what: &'static str,
        value: String,
    },

    #[error("invalid identifier `{0}`")]
    InvalidId(String),

    #[error("edge #{index} ({source_id} -> {target_id}): {detail}")]
    Edge {
        index: usize,
        source_id: String,
        target_id: String,
        detail: String,
    },
}

/// A raw event payload failed its discriminator's schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventConversionError {
    #[error("{event_type}: missing payload key `{key}`")]
    MissingKey { event_type: String, key: String },

    #[error("{event_type}: payload key `{key}` expected {expected}")]
    WrongType {
        event_type: String,
        key: String,
        expected: &'static str,
    },

    #[error("{event_type}: unexpected payload key `{key}`")]
    UnexpectedKey { event_type: String, key: String },

    #[error("{event_type}: {source}")]
    InvalidValue {
        event_type: String,
        #[source]
        source: ValidationError,
    },
}

/// Pure formula preconditions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("value produced must be positive, got {0}")]
    NonPositiveValueProduced(f64),

    #[error("steepness must be positive, got {0}")]
    NonPositiveSteepness(f64),
}

/// Failure inside a single system step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SystemError {
    #[error("node `{0}` not present in graph")]
    MissingNode(String),

    #[error("attribute `{key}` on `{owner}`: {detail}")]
    Attribute {
        owner: String,
        key: String,
        detail: String,
    },

    #[error(transparent)]
    Formula(#[from] FormulaError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(pub String);

#[derive(Error, Debug)]
pub enum SimError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("reconstruction failed: {0}")]
    Reconstruction(#[from] ReconstructionError),

    #[error("event conversion failed: {0}")]
    EventConversion(#[from] EventConversionError),

    #[error("system `{system}` failed at tick {tick}: {source}")]
    System {
        system: &'static str,
        tick: Tick,
        #[source]
        source: SystemError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("interceptor `{name}` rejected registration: {reason}")]
    Interceptor { name: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
