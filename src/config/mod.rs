//! Typed model of a run's `config.json`.
//!
//! All documented defaults are applied in one resolution step at load time, so
//! every consumer sees fully-populated entries instead of re-deriving
//! fallbacks from raw maps.

pub mod hyperparameter;
pub mod measurement;

pub use hyperparameter::{Hyperparameter, DEFAULT_ICON};
pub use measurement::{Measurement, DEFAULT_MEASUREMENT_IMG};

use crate::error::{EvoVisError, Result};
use hyperparameter::RawHyperparameter;
use measurement::RawMeasurement;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
struct RawRunConfig {
    hyperparameters: BTreeMap<String, RawHyperparameter>,
    results: BTreeMap<String, RawMeasurement>,
}

/// Resolved run configuration: hyperparameter display settings plus result
/// measurement settings, both keyed by their config name.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub hyperparameters: BTreeMap<String, Hyperparameter>,
    pub results: BTreeMap<String, Measurement>,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(EvoVisError::MissingArtifact(path.display().to_string()));
        }
        let raw: RawRunConfig = serde_json::from_str(&std::fs::read_to_string(path)?)
            .map_err(|e| EvoVisError::Structure(format!("{}: {e}", path.display())))?;
        Ok(raw.resolve())
    }
}

impl RawRunConfig {
    fn resolve(self) -> RunConfig {
        RunConfig {
            hyperparameters: self
                .hyperparameters
                .into_iter()
                .map(|(key, raw)| {
                    let resolved = raw.resolve(&key);
                    (key, resolved)
                })
                .collect(),
            results: self
                .results
                .into_iter()
                .map(|(key, raw)| {
                    let resolved = raw.resolve(&key);
                    (key, resolved)
                })
                .collect(),
        }
    }
}
