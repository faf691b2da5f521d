//! Constrained numeric types
//!
//! Each type quantizes on construction and then checks its range. Out-of-range
//! or non-finite input is rejected, never clamped.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::ValidationError;
use crate::core::quantize::GridPolicy;

fn check(
    type_name: &'static str,
    field: &str,
    raw: f64,
    min: Option<f64>,
    max: Option<f64>,
    policy: GridPolicy,
) -> Result<f64, ValidationError> {
    let fail = |reason: String| ValidationError {
        type_name,
        field: field.to_string(),
        value: raw,
        reason,
    };
    if !raw.is_finite() {
        return Err(fail("value is not finite".into()));
    }
    let value = policy.quantize(raw);
    if !value.is_finite() {
        return Err(fail("value is not finite on the grid".into()));
    }
    if let Some(lo) = min {
        if value < lo {
            return Err(fail(format!("below minimum {}", lo)));
        }
    }
    if let Some(hi) = max {
        if value > hi {
            return Err(fail(format!("above maximum {}", hi)));
        }
    }
    Ok(value)
}

macro_rules! bounded {
    ($(#[$meta:meta])* $name:ident, $min:expr, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
        #[serde(try_from = "f64", into = "f64")]
        pub struct $name(f64);

        impl $name {
            pub const MIN: Option<f64> = $min;
            pub const MAX: Option<f64> = $max;

            pub fn new(value: f64) -> Result<Self, ValidationError> {
                Self::named("value", value)
            }

            /// Construct, naming the field in any error.
            pub fn named(field: &str, value: f64) -> Result<Self, ValidationError> {
                Self::with_policy(field, value, GridPolicy::DEFAULT)
            }

            pub fn with_policy(
                field: &str,
                value: f64,
                policy: GridPolicy,
            ) -> Result<Self, ValidationError> {
                check(stringify!($name), field, value, Self::MIN, Self::MAX, policy).map(Self)
            }

            pub fn get(self) -> f64 {
                self.0
            }
        }

        impl TryFrom<f64> for $name {
            type Error = ValidationError;
            fn try_from(value: f64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for f64 {
            fn from(v: $name) -> f64 {
                v.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

bounded!(
    /// Probability in `[0, 1]`
    Probability,
    Some(0.0),
    Some(1.0)
);
bounded!(
    /// Non-negative amount of value
    Currency,
    Some(0.0),
    None
);
bounded!(
    /// Intensity in `[0, 1]` (agitation, heat, tension)
    Intensity,
    Some(0.0),
    Some(1.0)
);
bounded!(
    /// Ideological position in `[-1, 1]`
    Ideology,
    Some(-1.0),
    Some(1.0)
);
bounded!(
    /// Model coefficient in `[0, 1]`
    Coefficient,
    Some(0.0),
    Some(1.0)
);
bounded!(
    /// Non-negative unbounded ratio
    Ratio,
    Some(0.0),
    None
);

impl Probability {
    pub const ZERO: Probability = Probability(0.0);
    pub const ONE: Probability = Probability(1.0);
}

impl Currency {
    pub const ZERO: Currency = Currency(0.0);
}

impl Intensity {
    pub const ZERO: Intensity = Intensity(0.0);
}

impl Coefficient {
    pub const ZERO: Coefficient = Coefficient(0.0);
}
