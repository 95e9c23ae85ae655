//! Circuit breaker phase

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigurationError;

/// Phase of a circuit breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerPhase {
    /// Normal operation, calls pass through
    #[default]
    Closed,
    /// Calls are short-circuited until the recovery timeout elapses
    Open,
    /// A limited number of trial calls probe for recovery
    HalfOpen,
}

impl BreakerPhase {
    /// Wire name of this phase
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for BreakerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BreakerPhase {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "closed" => Ok(Self::Closed),
            "open" => Ok(Self::Open),
            "half_open" | "half-open" => Ok(Self::HalfOpen),
            other => Err(ConfigurationError::invalid(
                "phase",
                format!("'{other}' is not one of closed, open, half_open"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_closed() {
        assert_eq!(BreakerPhase::default(), BreakerPhase::Closed);
    }

    #[test]
    fn display() {
        assert_eq!(BreakerPhase::Closed.to_string(), "closed");
        assert_eq!(BreakerPhase::Open.to_string(), "open");
        assert_eq!(BreakerPhase::HalfOpen.to_string(), "half_open");
    }

    #[test]
    fn parses_hyphenated_half_open() {
        assert_eq!(
            "half-open".parse::<BreakerPhase>().unwrap(),
            BreakerPhase::HalfOpen
        );
    }

    #[test]
    fn rejects_unknown_phase() {
        assert!("ajar".parse::<BreakerPhase>().is_err());
    }
}
