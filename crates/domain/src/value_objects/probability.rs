//! Probability value object

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigurationError;

/// A probability in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Probability(f64);

impl Probability {
    /// Never
    pub const ZERO: Self = Self(0.0);
    /// Always
    pub const ONE: Self = Self(1.0);

    /// Create a probability, rejecting NaN and values outside `[0, 1]`
    pub fn new(name: &str, value: f64) -> Result<Self, ConfigurationError> {
        if value.is_nan() || !(0.0..=1.0).contains(&value) {
            return Err(ConfigurationError::out_of_range(name, value, 0.0, 1.0));
        }
        Ok(Self(value))
    }

    /// The raw value
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Whether a uniform `[0, 1)` draw falls inside this probability
    #[must_use]
    pub fn hit(self, draw: f64) -> bool {
        draw < self.0
    }
}

impl TryFrom<f64> for Probability {
    type Error = ConfigurationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new("probability", value)
    }
}

impl From<Probability> for f64 {
    fn from(p: Probability) -> Self {
        p.0
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
