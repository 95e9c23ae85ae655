//! Scenario requests and their parameters

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{errors::ConfigurationError, value_objects::ScenarioKind};

/// A single named option value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean flag
    Bool(bool),
    /// Any numeric option
    Number(f64),
    /// Free-form text option
    Text(String),
}

impl ParamValue {
    /// Coerce a raw query-string value into the most specific variant
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return Self::Number(n);
            }
        }
        match trimmed.to_lowercase().as_str() {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => Self::Text(trimmed.to_string()),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Named scenario options with typed, bounds-checked accessors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(BTreeMap<String, ParamValue>);

impl Parameters {
    /// Empty parameter set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw string pairs, coercing numbers and booleans
    pub fn from_query<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), ParamValue::from_raw(v.as_ref())))
                .collect(),
        )
    }

    /// Add or replace a parameter
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Raw value lookup
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    /// Whether a parameter was supplied
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameters were supplied
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over parameters in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Optional numeric parameter; numeric text is accepted
    pub fn number(&self, name: &str) -> Result<Option<f64>, ConfigurationError> {
        match self.0.get(name) {
            None => Ok(None),
            Some(ParamValue::Number(n)) => Ok(Some(*n)),
            Some(ParamValue::Text(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Some)
                .ok_or_else(|| type_error(name, "a number")),
            Some(ParamValue::Bool(_)) => Err(type_error(name, "a number")),
        }
    }

    /// Optional float within `[min, max]`
    pub fn f64_in(&self, name: &str, min: f64, max: f64) -> Result<Option<f64>, ConfigurationError> {
        match self.number(name)? {
            None => Ok(None),
            Some(v) if v < min || v > max => {
                Err(ConfigurationError::out_of_range(name, v, min, max))
            },
            Some(v) => Ok(Some(v)),
        }
    }

    /// Optional whole number within `[min, max]`
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn u64_in(&self, name: &str, min: u64, max: u64) -> Result<Option<u64>, ConfigurationError> {
        match self.f64_in(name, min as f64, max as f64)? {
            None => Ok(None),
            Some(v) if v.fract().abs() > f64::EPSILON => Err(type_error(name, "a whole number")),
            Some(v) => Ok(Some(v as u64)),
        }
    }

    /// Optional `u32` within `[min, max]`
    #[allow(clippy::cast_possible_truncation)]
    pub fn u32_in(&self, name: &str, min: u32, max: u32) -> Result<Option<u32>, ConfigurationError> {
        Ok(self
            .u64_in(name, u64::from(min), u64::from(max))?
            .map(|v| v as u32))
    }

    /// Optional millisecond duration within `[min, max]`
    #[allow(clippy::cast_possible_truncation)]
    pub fn duration_ms_in(
        &self,
        name: &str,
        min: Duration,
        max: Duration,
    ) -> Result<Option<Duration>, ConfigurationError> {
        Ok(self
            .u64_in(name, min.as_millis() as u64, max.as_millis() as u64)?
            .map(Duration::from_millis))
    }

    /// Optional text parameter; numbers and booleans are rendered
    pub fn text(&self, name: &str) -> Option<String> {
        self.0.get(name).map(|v| match v {
            ParamValue::Text(s) => s.clone(),
            ParamValue::Number(n) => n.to_string(),
            ParamValue::Bool(b) => b.to_string(),
        })
    }

    /// Optional boolean; `"1"`/`"0"`, `"yes"`/`"no"` are accepted
    pub fn bool(&self, name: &str) -> Result<Option<bool>, ConfigurationError> {
        match self.0.get(name) {
            None => Ok(None),
            Some(ParamValue::Bool(b)) => Ok(Some(*b)),
            Some(ParamValue::Number(n)) if n.abs() < f64::EPSILON => Ok(Some(false)),
            Some(ParamValue::Number(n)) if (*n - 1.0).abs() < f64::EPSILON => Ok(Some(true)),
            Some(ParamValue::Text(s)) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Some(true)),
                "false" | "no" | "off" | "0" => Ok(Some(false)),
                _ => Err(type_error(name, "a boolean")),
            },
            Some(ParamValue::Number(_)) => Err(type_error(name, "a boolean")),
        }
    }

    /// Optional comma-separated list of status codes
    pub fn status_list(&self, name: &str) -> Result<Option<Vec<u16>>, ConfigurationError> {
        let Some(raw) = self.text(name) else {
            return Ok(None);
        };
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<u16>().map_err(|_| type_error(name, "a list of status codes")))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

fn type_error(name: &str, expected: &'static str) -> ConfigurationError {
    ConfigurationError::InvalidType {
        name: name.to_string(),
        expected,
    }
}

impl<K: Into<String>> FromIterator<(K, ParamValue)> for Parameters {
    fn from_iter<T: IntoIterator<Item = (K, ParamValue)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// One simulation request
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRequest {
    key: String,
    kind: ScenarioKind,
    #[serde(default)]
    parameters: Parameters,
}

impl ScenarioRequest {
    /// Create a scenario request
    pub fn new(key: impl Into<String>, kind: ScenarioKind, parameters: Parameters) -> Self {
        Self {
            key: key.into(),
            kind,
            parameters,
        }
    }

    /// Caller or resource key for per-key state
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Scenario kind
    #[must_use]
    pub const fn kind(&self) -> ScenarioKind {
        self.kind
    }

    /// Scenario options
    #[must_use]
    pub const fn parameters(&self) -> &Parameters {
        &self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_are_coerced() {
        assert_eq!(ParamValue::from_raw("42"), ParamValue::Number(42.0));
        assert_eq!(ParamValue::from_raw("0.5"), ParamValue::Number(0.5));
        assert_eq!(ParamValue::from_raw("TRUE"), ParamValue::Bool(true));
        assert_eq!(ParamValue::from_raw("cpu"), ParamValue::Text("cpu".into()));
        assert_eq!(ParamValue::from_raw("NaN"), ParamValue::Text("NaN".into()));
    }

    #[test]
    fn from_query_builds_typed_map() {
        let params = Parameters::from_query([("limit", "2"), ("wait", "false")]);
        assert_eq!(params.u32_in("limit", 1, 10).unwrap(), Some(2));
        assert_eq!(params.bool("wait").unwrap(), Some(false));
    }

    #[test]
    fn number_accepts_numeric_text() {
        let params = Parameters::new().with("depth", "3");
        assert_eq!(params.number("depth").unwrap(), Some(3.0));
    }

    #[test]
    fn number_rejects_non_numeric() {
        let params = Parameters::new().with("depth", "deep");
        assert!(matches!(
            params.number("depth"),
            Err(ConfigurationError::InvalidType { .. })
        ));
    }

    #[test]
    fn missing_is_none() {
        let params = Parameters::new();
        assert_eq!(params.number("x").unwrap(), None);
        assert_eq!(params.bool("x").unwrap(), None);
        assert!(params.text("x").is_none());
    }

    #[test]
    fn u64_in_rejects_fractions_and_range() {
        let params = Parameters::new().with("depth", 2.5).with("fanout", 50_u32);
        assert!(params.u64_in("depth", 0, 10).is_err());
        assert!(matches!(
            params.u64_in("fanout", 1, 20),
            Err(ConfigurationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn negative_duration_is_out_of_range() {
        let params = Parameters::new().with("window_ms", -5.0);
        assert!(matches!(
            params.duration_ms_in("window_ms", Duration::from_millis(1), Duration::from_secs(1)),
            Err(ConfigurationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn bool_accepts_common_spellings() {
        let params = Parameters::new()
            .with("a", "yes")
            .with("b", 0_u32)
            .with("c", "maybe");
        assert_eq!(params.bool("a").unwrap(), Some(true));
        assert_eq!(params.bool("b").unwrap(), Some(false));
        assert!(params.bool("c").is_err());
    }

    #[test]
    fn status_list_parses_codes() {
        let params = Parameters::new().with("error_codes", "500, 503,404");
        assert_eq!(
            params.status_list("error_codes").unwrap(),
            Some(vec![500, 503, 404])
        );
        let params = Parameters::new().with("error_codes", "500,abc");
        assert!(params.status_list("error_codes").is_err());
    }

    #[test]
    fn single_numeric_status_list() {
        let params = Parameters::from_query([("error_codes", "503")]);
        assert_eq!(params.status_list("error_codes").unwrap(), Some(vec![503]));
    }

    #[test]
    fn scenario_request_deserializes_from_json() {
        let json = r#"{"key":"a","kind":"rate_limit","parameters":{"limit":2,"window_ms":1000}}"#;
        let request: ScenarioRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.key(), "a");
        assert_eq!(request.kind(), ScenarioKind::RateLimit);
        assert_eq!(request.parameters().len(), 2);
    }

    #[test]
    fn scenario_request_parameters_default_to_empty() {
        let json = r#"{"key":"a","kind":"cascade"}"#;
        let request: ScenarioRequest = serde_json::from_str(json).unwrap();
        assert!(request.parameters().is_empty());
    }
}
