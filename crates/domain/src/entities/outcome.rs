//! Structured result of a simulated call

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value_objects::BreakerPhase;

/// What happened to one simulated call
///
/// An injected failure is a successful invocation whose
/// `failure_injected` flag is set; it is never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Whether the call was let through (rate limiter / breaker)
    pub admitted: bool,
    /// HTTP status the caller should see
    pub simulated_status: u16,
    /// Delay applied before answering
    #[serde(rename = "latency_applied_ms", with = "duration_ms")]
    pub latency_applied: Duration,
    /// Whether a failure was deliberately injected
    pub failure_injected: bool,
    /// Breaker phase after the call, for circuit scenarios
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub breaker_phase: Option<BreakerPhase>,
    /// Scenario-specific details
    #[serde(default)]
    pub detail: BTreeMap<String, Value>,
}

impl Outcome {
    /// An admitted call answered with `status`
    #[must_use]
    pub fn admitted(status: u16) -> Self {
        Self {
            admitted: true,
            simulated_status: status,
            latency_applied: Duration::ZERO,
            failure_injected: false,
            breaker_phase: None,
            detail: BTreeMap::new(),
        }
    }

    /// A call refused before doing any work
    #[must_use]
    pub fn rejected(status: u16) -> Self {
        Self {
            admitted: false,
            ..Self::admitted(status)
        }
    }

    /// Record the applied delay
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency_applied = latency;
        self
    }

    /// Mark whether a failure was injected
    #[must_use]
    pub const fn with_failure(mut self, injected: bool) -> Self {
        self.failure_injected = injected;
        self
    }

    /// Attach the breaker phase
    #[must_use]
    pub const fn with_phase(mut self, phase: BreakerPhase) -> Self {
        self.breaker_phase = Some(phase);
        self
    }

    /// Attach a detail entry
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.detail.insert(key.into(), value.into());
        self
    }

    /// Look up a detail entry
    #[must_use]
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.detail.get(key)
    }

    /// Whether the status is a 2xx
    #[must_use]
    pub const fn is_success_status(&self) -> bool {
        self.simulated_status >= 200 && self.simulated_status < 300
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admitted_defaults() {
        let outcome = Outcome::admitted(200);
        assert!(outcome.admitted);
        assert!(!outcome.failure_injected);
        assert_eq!(outcome.latency_applied, Duration::ZERO);
        assert!(outcome.breaker_phase.is_none());
        assert!(outcome.is_success_status());
    }

    #[test]
    fn rejected_is_not_admitted() {
        let outcome = Outcome::rejected(429).with_detail("retry_after_ms", 250);
        assert!(!outcome.admitted);
        assert_eq!(outcome.simulated_status, 429);
        assert_eq!(outcome.detail("retry_after_ms"), Some(&Value::from(250)));
    }

    #[test]
    fn serializes_latency_as_millis() {
        let outcome = Outcome::admitted(200)
            .with_latency(Duration::from_millis(1500))
            .with_phase(BreakerPhase::HalfOpen);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["latency_applied_ms"], 1500);
        assert_eq!(json["breaker_phase"], "half_open");
    }

    #[test]
    fn omits_missing_phase() {
        let json = serde_json::to_string(&Outcome::admitted(200)).unwrap();
        assert!(!json.contains("breaker_phase"));
    }

    #[test]
    fn deserializes_what_it_serializes() {
        let outcome = Outcome::rejected(503)
            .with_failure(true)
            .with_detail("reason", "open");
        let json = serde_json::to_string(&outcome).unwrap();
        let parsed: Outcome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, outcome);
    }
}
