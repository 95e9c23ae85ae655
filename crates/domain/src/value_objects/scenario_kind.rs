//! Scenario kind value object

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigurationError;

/// Which resilience component a scenario exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Injected delay, optionally with failures
    Latency,
    /// Probabilistic failure
    Failure,
    /// Fixed-window rate limiting
    RateLimit,
    /// Circuit breaker state machine
    Circuit,
    /// Cascading call-tree failure
    Cascade,
    /// Background resource stress job
    Stress,
}

impl ScenarioKind {
    /// Wire name of this kind
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Latency => "latency",
            Self::Failure => "failure",
            Self::RateLimit => "rate_limit",
            Self::Circuit => "circuit",
            Self::Cascade => "cascade",
            Self::Stress => "stress",
        }
    }

    /// All kinds in dispatch order
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::Latency,
            Self::Failure,
            Self::RateLimit,
            Self::Circuit,
            Self::Cascade,
            Self::Stress,
        ]
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "latency" | "slow" => Ok(Self::Latency),
            "failure" | "fail" => Ok(Self::Failure),
            "rate_limit" | "rate-limit" => Ok(Self::RateLimit),
            "circuit" | "circuit_breaker" | "circuit-breaker" => Ok(Self::Circuit),
            "cascade" => Ok(Self::Cascade),
            "stress" => Ok(Self::Stress),
            _ => Err(ConfigurationError::UnknownKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_wire_name() {
        for kind in ScenarioKind::all() {
            assert_eq!(kind.as_str().parse::<ScenarioKind>().unwrap(), kind);
        }
    }

    #[test]
    fn parses_aliases() {
        assert_eq!(
            "rate-limit".parse::<ScenarioKind>().unwrap(),
            ScenarioKind::RateLimit
        );
        assert_eq!(
            "Circuit-Breaker".parse::<ScenarioKind>().unwrap(),
            ScenarioKind::Circuit
        );
        assert_eq!("slow".parse::<ScenarioKind>().unwrap(), ScenarioKind::Latency);
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = "teleport".parse::<ScenarioKind>().unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownKind(k) if k == "teleport"));
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&ScenarioKind::RateLimit).unwrap();
        assert_eq!(json, "\"rate_limit\"");
    }
}
