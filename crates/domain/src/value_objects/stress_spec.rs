//! Stress job specification

use std::time::Duration;

use crate::{
    errors::ConfigurationError,
    limits::{
        MAX_CONNECTIONS, MAX_CPU_INTENSITY, MAX_MEMORY_MB, MAX_STRESS_DURATION,
        MIN_STRESS_DURATION,
    },
    value_objects::{
        StressKind,
        policies::{check_duration, check_u32},
    },
};

/// What a stress job should consume and for how long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StressSpec {
    kind: StressKind,
    intensity: u32,
    duration: Duration,
}

impl StressSpec {
    /// Create a validated stress spec
    ///
    /// Intensity is a duty-cycle percentage for `cpu`, MiB for `memory`
    /// and a handle count for `connections`.
    pub fn new(kind: StressKind, intensity: u32, duration: Duration) -> Result<Self, ConfigurationError> {
        let max = Self::max_intensity(kind);
        Ok(Self {
            kind,
            intensity: check_u32("intensity", intensity, 1, max)?,
            duration: check_duration(
                "duration_ms",
                duration,
                MIN_STRESS_DURATION,
                MAX_STRESS_DURATION,
            )?,
        })
    }

    /// Upper intensity bound for a kind
    #[must_use]
    pub const fn max_intensity(kind: StressKind) -> u32 {
        match kind {
            StressKind::Cpu => MAX_CPU_INTENSITY,
            StressKind::Memory => MAX_MEMORY_MB,
            StressKind::Connections => MAX_CONNECTIONS,
        }
    }

    /// Resource kind
    #[must_use]
    pub const fn kind(&self) -> StressKind {
        self.kind
    }

    /// Requested intensity
    #[must_use]
    pub const fn intensity(&self) -> u32 {
        self.intensity
    }

    /// Requested duration
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}
