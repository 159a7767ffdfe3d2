use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_ICON: &str = "icon-park:expand-text-input";

/// `config.json` hyperparameter entry as stored on disk, before defaulting.
#[derive(Debug, Clone, Deserialize)]
pub struct RawHyperparameter {
    pub value: Value,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub displayname: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default = "default_true")]
    pub display: bool,
}

fn default_true() -> bool {
    true
}

/// Fully-populated hyperparameter after the one central resolution step.
/// Display name falls back to the config key, the icon to a generic input
/// icon, the description to the display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hyperparameter {
    pub value: Value,
    pub unit: Option<String>,
    pub group: Option<String>,
    pub displayname: String,
    pub description: String,
    pub icon: String,
    pub display: bool,
}

impl RawHyperparameter {
    pub fn resolve(self, key: &str) -> Hyperparameter {
        let displayname = self
            .displayname
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| key.to_string());
        let description = self
            .description
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| displayname.clone());
        let icon = self
            .icon
            .filter(|icon| !icon.is_empty())
            .unwrap_or_else(|| DEFAULT_ICON.to_string());

        Hyperparameter {
            value: self.value,
            unit: self.unit,
            group: self.group,
            displayname,
            description,
            icon,
            display: self.display,
        }
    }
}
