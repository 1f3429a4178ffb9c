// ============================================================
// Search — Search Space
// ============================================================
// Independent per-parameter domains. A configuration is a
// point of the space when every declared parameter is present
// and lies inside its (inclusive) bounds.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::hyperparams::{HyperparameterConfiguration, ParamValue, DROPOUT_RATE, LAYER_SIZE};
use crate::error::{TuneError, TuneResult};

/// Allowed values for one parameter (bounds inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterDomain {
    IntRange { low: i64, high: i64 },
    FloatRange { low: f64, high: f64, log_scale: bool },
}

impl ParameterDomain {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ParamValue {
        match *self {
            ParameterDomain::IntRange { low, high } => ParamValue::Int(rng.gen_range(low..=high)),
            ParameterDomain::FloatRange { low, high, log_scale: true } => {
                let v = rng.gen_range(low.ln()..=high.ln()).exp();
                ParamValue::Float(v.clamp(low, high))
            }
            ParameterDomain::FloatRange { low, high, log_scale: false } => {
                ParamValue::Float(rng.gen_range(low..=high))
            }
        }
    }

    pub fn contains(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (ParameterDomain::IntRange { low, high }, ParamValue::Int(v)) => v >= low && v <= high,
            (ParameterDomain::FloatRange { low, high, .. }, ParamValue::Float(v)) => v >= low && v <= high,
            _ => false,
        }
    }

    fn validate(&self, name: &str) -> TuneResult<()> {
        let ok = match *self {
            ParameterDomain::IntRange { low, high } => low <= high,
            ParameterDomain::FloatRange { low, high, log_scale } => {
                low.is_finite() && high.is_finite() && low <= high && (!log_scale || low > 0.0)
            }
        };
        if ok {
            Ok(())
        } else {
            Err(TuneError::InvalidConfig(format!("invalid domain for '{name}': {self:?}")))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSpace {
    params: BTreeMap<String, ParameterDomain>,
}

impl SearchSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// hidden width in [64, 512], dropout in [0.1, 0.5]
    pub fn heston_default() -> Self {
        Self::new()
            .with(LAYER_SIZE, ParameterDomain::IntRange { low: 64, high: 512 })
            .with(DROPOUT_RATE, ParameterDomain::FloatRange { low: 0.1, high: 0.5, log_scale: false })
    }

    pub fn with(mut self, name: &str, domain: ParameterDomain) -> Self {
        self.params.insert(name.to_string(), domain);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParameterDomain> {
        self.params.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParameterDomain)> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn validate(&self) -> TuneResult<()> {
        if self.params.is_empty() {
            return Err(TuneError::InvalidConfig("search space is empty".into()));
        }
        self.params.iter().try_for_each(|(name, d)| d.validate(name))
    }

    /// Independent uniform draw from every domain
    pub fn sample_random<R: Rng + ?Sized>(&self, rng: &mut R) -> HyperparameterConfiguration {
        HyperparameterConfiguration::new(
            self.params
                .iter()
                .map(|(name, domain)| (name.clone(), domain.sample(rng)))
                .collect(),
        )
    }

    /// True when every declared parameter is present and inside its domain
    pub fn contains(&self, config: &HyperparameterConfiguration) -> bool {
        self.params
            .iter()
            .all(|(name, d)| config.get(name).is_some_and(|v| d.contains(&v)))
    }
}
