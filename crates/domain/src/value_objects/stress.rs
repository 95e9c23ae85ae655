//! Stress job identifiers and classifications

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ConfigurationError;

/// Resource a stress job consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressKind {
    /// Busy-work at a duty cycle
    Cpu,
    /// Held heap buffers
    Memory,
    /// Held simulated connection handles
    Connections,
}

impl StressKind {
    /// Wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Memory => "memory",
            Self::Connections => "connections",
        }
    }

    /// Unit in which intensity and achievement are measured
    #[must_use]
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::Cpu => "percent",
            Self::Memory => "mib",
            Self::Connections => "connections",
        }
    }

    /// Unit in which achievement is reported
    #[must_use]
    pub const fn achieved_unit(&self) -> &'static str {
        match self {
            Self::Cpu => "operations",
            Self::Memory => "mib",
            Self::Connections => "connections",
        }
    }
}

impl fmt::Display for StressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StressKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            "memory" | "mem" => Ok(Self::Memory),
            "connections" | "connection" | "conn" => Ok(Self::Connections),
            other => Err(ConfigurationError::invalid(
                "stress_kind",
                format!("'{other}' is not one of cpu, memory, connections"),
            )),
        }
    }
}

/// A unique stress job identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StressJobId(Uuid);

impl StressJobId {
    /// Create a new random job ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a job ID from a string
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the underlying UUID
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for StressJobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StressJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a stress job ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressExit {
    /// Ran until its deadline
    Completed,
    /// Stopped early by `cancel`
    Cancelled,
    /// Stopped by the supervisor after overrunning its deadline
    TimedOut,
    /// Worker stopped abnormally, e.g. it panicked
    Failed,
}

impl fmt::Display for StressExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::TimedOut => f.write_str("timed_out"),
            Self::Failed => f.write_str("failed"),
        }
    }
}
