use crate::error::{EvoVisError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One layer definition within a chromosome or the gene pool.
///
/// `layer` and `f_name` are required; everything else a gene carries
/// (kernel sizes, strides, ...) is layer-specific and kept opaquely in
/// `params`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub layer: String,
    pub f_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exclude: bool,
    #[serde(flatten)]
    pub params: BTreeMap<String, Value>,
}

/// Ordered layer stack of an individual. Order is the architecture.
pub type Chromosome = Vec<Gene>;

/// Flat metric name -> value record of one individual.
///
/// Values stay as raw JSON (numbers, booleans, error strings); nested numeric
/// sub-measurements are collapsed to their arithmetic mean at load time, so
/// downstream consumers only ever see one scalar per metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    values: BTreeMap<String, Value>,
}

impl ResultRecord {
    /// Build a record from a parsed `results.json` value, collapsing nested
    /// numeric sub-maps to their mean.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(EvoVisError::Structure(
                "results record must be a JSON object".to_string(),
            ));
        };

        let mut values = BTreeMap::new();
        for (key, val) in map {
            let collapsed = match &val {
                Value::Object(samples) => mean_of_numeric(samples)
                    .map(|mean| Value::from(mean))
                    .unwrap_or(val),
                _ => val,
            };
            values.insert(key, collapsed);
        }

        Ok(Self { values })
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(Value::as_f64)
    }

    pub fn fitness(&self) -> Option<f64> {
        self.number("fitness")
    }

    /// A record is unhealthy iff it carries an `error` field holding
    /// boolean/string true. Absence or an explicit falsey value means healthy.
    pub fn is_healthy(&self) -> bool {
        match self.values.get("error") {
            None => true,
            Some(Value::Bool(flag)) => !flag,
            Some(Value::String(text)) => !matches!(text.as_str(), "True" | "true"),
            Some(_) => true,
        }
    }
}

fn mean_of_numeric(samples: &serde_json::Map<String, Value>) -> Option<f64> {
    let numeric: Vec<f64> = samples.values().filter_map(Value::as_f64).collect();
    if numeric.is_empty() {
        None
    } else {
        Some(numeric.iter().sum::<f64>() / numeric.len() as f64)
    }
}
