use crate::error::{MeasureError, Result};
use crate::models::ReferenceObject;

pub const CUSTOM: &str = "custom";

/// Known reference objects, plus one user-editable `custom` entry
#[derive(Debug, Clone)]
pub struct CalibrationRegistry {
    entries: Vec<ReferenceObject>,
}

impl CalibrationRegistry {
    pub fn new() -> Self {
        let fixed = [
            ("coin", 24.0, 24.0),
            ("credit-card", 85.6, 53.98),
            ("phone", 70.0, 140.0),
            (CUSTOM, 0.0, 0.0),
        ];

        Self {
            entries: fixed
                .into_iter()
                .map(|(name, width_mm, height_mm)| ReferenceObject {
                    name: name.to_string(),
                    width_mm,
                    height_mm,
                })
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Result<&ReferenceObject> {
        self.entries
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| MeasureError::UnknownReference(name.to_string()))
    }

    /// Overwrite the custom entry. Values are taken as given, negatives included.
    pub fn set_custom(&mut self, width_mm: f64, height_mm: f64) {
        if let Some(custom) = self.entries.iter_mut().find(|r| r.name == CUSTOM) {
            custom.width_mm = width_mm;
            custom.height_mm = height_mm;
        }
    }

    /// Set the custom entry from raw form text; unparseable input counts as 0
    pub fn set_custom_from_input(&mut self, width: &str, height: &str) {
        self.set_custom(parse_loose(width), parse_loose(height));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|r| r.name.as_str())
    }
}

impl Default for CalibrationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a form field as millimeters; anything unparseable is 0
pub fn parse_loose(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
