use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::calibration::parse_loose;
use crate::models::LengthUnit;

/// Which measurement backend to use
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Measure detector boxes locally with the reference heuristic
    #[default]
    Client,
    /// Send images to a contour-measuring analysis server
    Server { url: String },
}

/// Settings file, e.g.
///
/// ```yaml
/// backend:
///   kind: server
///   url: http://localhost:5000
/// reference: credit-card
/// unit: mm
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub reference: String,
    pub custom_width_mm: f64,
    pub custom_height_mm: f64,
    pub unit: LengthUnit,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::Client,
            reference: "coin".to_string(),
            custom_width_mm: 0.0,
            custom_height_mm: 0.0,
            unit: LengthUnit::Millimeters,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        Self::from_yaml(&text).with_context(|| format!("Invalid config {:?}", path))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yml::from_str(text)?)
    }

    /// Override the custom reference with command-line text.
    /// A side that is not given keeps its configured value.
    pub fn apply_custom_input(&mut self, width: Option<&str>, height: Option<&str>) {
        if let Some(width) = width {
            self.custom_width_mm = parse_loose(width);
        }
        if let Some(height) = height {
            self.custom_height_mm = parse_loose(height);
        }
    }
}
