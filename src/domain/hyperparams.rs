// ============================================================
// Layer 3 — Hyperparameter Configuration
// ============================================================
// A sampled point of the search space: parameter name → value.
// Configurations are immutable once built; a Trial owns one.
//
// BTreeMap keeps the serialised order stable so trials.json
// diffs cleanly between runs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TuneError, TuneResult};

/// Width of the single dense hidden layer
pub const LAYER_SIZE: &str = "layer_size";

/// Dropout probability applied after the hidden layer
pub const DROPOUT_RATE: &str = "dropout_rate";

/// A single parameter value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
}

impl ParamValue {
    pub fn as_float(&self) -> f64 {
        match self {
            ParamValue::Int(v)   => *v as f64,
            ParamValue::Float(v) => *v,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v)   => Some(*v),
            ParamValue::Float(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v)   => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v:.4}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HyperparameterConfiguration {
    params: BTreeMap<String, ParamValue>,
}

impl HyperparameterConfiguration {
    pub fn new(params: BTreeMap<String, ParamValue>) -> Self {
        Self { params }
    }

    /// Convenience constructor for the two parameters this system tunes.
    pub fn dense(layer_size: usize, dropout_rate: f64) -> Self {
        let mut params = BTreeMap::new();
        params.insert(LAYER_SIZE.to_string(), ParamValue::Int(layer_size as i64));
        params.insert(DROPOUT_RATE.to_string(), ParamValue::Float(dropout_rate));
        Self { params }
    }

    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.params.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn layer_size(&self) -> TuneResult<usize> {
        let value = self
            .get(LAYER_SIZE)
            .ok_or_else(|| TuneError::MissingParameter(LAYER_SIZE.into()))?;
        match value.as_int() {
            Some(v) if v > 0 => Ok(v as usize),
            _ => Err(TuneError::InvalidConfig(format!("{LAYER_SIZE} must be a positive integer, got {value}"))),
        }
    }

    pub fn dropout_rate(&self) -> TuneResult<f64> {
        let rate = self
            .get(DROPOUT_RATE)
            .ok_or_else(|| TuneError::MissingParameter(DROPOUT_RATE.into()))?
            .as_float();
        if !(0.0..1.0).contains(&rate) {
            return Err(TuneError::InvalidConfig(format!("{DROPOUT_RATE} must lie in [0, 1), got {rate}")));
        }
        Ok(rate)
    }
}

impl fmt::Display for HyperparameterConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_accessors() {
        let cfg = HyperparameterConfiguration::dense(128, 0.25);
        assert_eq!(cfg.layer_size().unwrap(), 128);
        assert!((cfg.dropout_rate().unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_missing_parameter() {
        let cfg = HyperparameterConfiguration::default();
        assert!(matches!(cfg.layer_size(), Err(TuneError::MissingParameter(p)) if p == LAYER_SIZE));
    }

    #[test]
    fn test_dropout_out_of_range() {
        let cfg = HyperparameterConfiguration::dense(64, 1.5);
        assert!(matches!(cfg.dropout_rate(), Err(TuneError::InvalidConfig(_))));
    }

    #[test]
    fn test_json_keeps_int_and_float_apart() {
        let cfg  = HyperparameterConfiguration::dense(256, 0.3);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: HyperparameterConfiguration = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(LAYER_SIZE), Some(ParamValue::Int(256)));
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_display_is_sorted() {
        let cfg = HyperparameterConfiguration::dense(64, 0.1);
        assert_eq!(cfg.to_string(), "{dropout_rate=0.1000, layer_size=64}");
    }
}
