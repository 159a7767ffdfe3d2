use serde::{Deserialize, Serialize};

pub const DEFAULT_MEASUREMENT_IMG: &str = "measure1-icon.png";

/// `config.json` result-measurement entry as stored on disk. The on-disk keys
/// are kebab-case, including the historical `pareto-optimlity-plot` spelling.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMeasurement {
    #[serde(default)]
    pub displayname: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, rename = "min-boundary")]
    pub min_boundary: Option<f64>,
    #[serde(default, rename = "max-boundary")]
    pub max_boundary: Option<f64>,
    #[serde(default = "default_true", rename = "run-result-plot")]
    pub run_result_plot: bool,
    #[serde(default = "default_true", rename = "individual-info-plot")]
    pub individual_info_plot: bool,
    #[serde(default, rename = "pareto-optimlity-plot")]
    pub pareto_optimality_plot: bool,
    #[serde(default, rename = "individual-info-img")]
    pub individual_info_img: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Fully-populated measurement settings after defaulting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub displayname: String,
    pub unit: Option<String>,
    pub min_boundary: Option<f64>,
    pub max_boundary: Option<f64>,
    pub run_result_plot: bool,
    pub individual_info_plot: bool,
    pub pareto_optimality_plot: bool,
    pub individual_info_img: String,
}

impl RawMeasurement {
    pub fn resolve(self, key: &str) -> Measurement {
        Measurement {
            displayname: self
                .displayname
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| key.to_string()),
            unit: self.unit,
            min_boundary: self.min_boundary,
            max_boundary: self.max_boundary,
            run_result_plot: self.run_result_plot,
            individual_info_plot: self.individual_info_plot,
            pareto_optimality_plot: self.pareto_optimality_plot,
            individual_info_img: self
                .individual_info_img
                .filter(|img| !img.is_empty())
                .unwrap_or_else(|| DEFAULT_MEASUREMENT_IMG.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_entry_gets_documented_defaults() {
        let raw: RawMeasurement = serde_json::from_value(json!({})).unwrap();
        let resolved = raw.resolve("fitness");

        assert_eq!(resolved.displayname, "fitness");
        assert!(resolved.run_result_plot);
        assert!(resolved.individual_info_plot);
        assert!(!resolved.pareto_optimality_plot);
        assert_eq!(resolved.individual_info_img, DEFAULT_MEASUREMENT_IMG);
        assert!(resolved.min_boundary.is_none());
    }

    #[test]
    fn kebab_case_keys_deserialize() {
        let raw: RawMeasurement = serde_json::from_value(json!({
            "displayname": "Validation accuracy",
            "min-boundary": 0.0,
            "max-boundary": 1.0,
            "run-result-plot": false,
            "pareto-optimlity-plot": true
        }))
        .unwrap();
        let resolved = raw.resolve("val_acc");

        assert_eq!(resolved.displayname, "Validation accuracy");
        assert_eq!(resolved.min_boundary, Some(0.0));
        assert_eq!(resolved.max_boundary, Some(1.0));
        assert!(!resolved.run_result_plot);
        assert!(resolved.pareto_optimality_plot);
    }
}
