//! Parameter bag passed to every operation.
//!
//! Values arrive from JSON and may be numbers, numeric text (form fields are
//! sent as strings), booleans or null. Getters never fail: a missing or
//! unusable value yields the caller's default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single scalar parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Numeric view of the value. Text is parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            ParamValue::Number(n) => *n,
            ParamValue::Text(s) => s.trim().parse::<f64>().ok()?,
            ParamValue::Null | ParamValue::Bool(_) => return None,
        };
        v.is_finite().then_some(v)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Number(v as f64)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

/// Named parameters of one filter step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ParamValue::as_f64)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_str)
    }

    /// Floating point value, or `default` when missing or not numeric.
    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.number(key).unwrap_or(default)
    }

    /// Non-negative size, or `default` when missing, not numeric or negative.
    pub fn size_or(&self, key: &str, default: usize) -> usize {
        match self.number(key) {
            Some(v) if v >= 0.0 => v.trunc() as usize,
            _ => default,
        }
    }

    /// 8-bit sample value clamped to 0..=255, or `default`.
    pub fn u8_or(&self, key: &str, default: u8) -> u8 {
        self.number(key)
            .map(|v| v.trunc().clamp(0.0, 255.0) as u8)
            .unwrap_or(default)
    }
}

impl FromIterator<(String, ParamValue)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Params(iter.into_iter().collect())
    }
}

/// Sample depth at which gradient responses are held before re-quantizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Depth {
    #[default]
    U8,
    U16,
    I16,
    F32,
    F64,
}

impl Depth {
    /// Saturate a raw response to the range (and precision) of this depth.
    pub fn saturate(self, v: f64) -> f64 {
        match self {
            Depth::U8 => v.round_ties_even().clamp(0.0, 255.0),
            Depth::U16 => v.round_ties_even().clamp(0.0, 65535.0),
            Depth::I16 => v.round_ties_even().clamp(-32768.0, 32767.0),
            Depth::F32 => v as f32 as f64,
            Depth::F64 => v,
        }
    }
}

/// Local threshold estimator for adaptive thresholding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdaptiveMethod {
    #[default]
    Mean,
    Gaussian,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_text_is_parsed() {
        let params = Params::new().with("Kernel", " 5 ");
        assert_eq!(params.size_or("Kernel", 1), 5);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let params = Params::new()
            .with("a", "not a number")
            .with("b", -3i64)
            .with("c", ParamValue::Null);

        assert_eq!(params.size_or("a", 7), 7);
        assert_eq!(params.size_or("b", 7), 7);
        assert_eq!(params.f64_or("c", 4.0), 4.0);
        assert_eq!(params.size_or("missing", 1), 1);
    }

    #[test]
    fn test_u8_or_clamps() {
        let params = Params::new().with("Max", 999i64);
        assert_eq!(params.u8_or("Max", 255), 255);
        assert_eq!(params.u8_or("Min", 0), 0);
    }

    #[test]
    fn test_deserialize_mixed_values() {
        let params: Params =
            serde_json::from_str(r#"{"x": 40, "ddepth": "cv2.CV_16S", "y": null}"#).unwrap();
        assert_eq!(params.number("x"), Some(40.0));
        assert_eq!(params.text("ddepth"), Some("cv2.CV_16S"));
        assert_eq!(params.get("y"), Some(&ParamValue::Null));
    }

    #[test]
    fn test_depth_saturation() {
        assert_eq!(Depth::U8.saturate(-12.0), 0.0);
        assert_eq!(Depth::U8.saturate(300.0), 255.0);
        assert_eq!(Depth::I16.saturate(-12.0), -12.0);
        assert_eq!(Depth::U16.saturate(-1.0), 0.0);
        assert_eq!(Depth::F64.saturate(-0.25), -0.25);
    }
}
