use crate::models::{Detection, LengthUnit, MeasurementRecord};

/// Convert a detection's pixel box to millimeters with a fixed scale factor.
/// Values are left unrounded; rounding happens at presentation.
pub fn build(detection: &Detection, scale_factor: f64) -> MeasurementRecord {
    let pixel_width = detection.bbox.width;
    let pixel_height = detection.bbox.height;
    let width_physical = pixel_width * scale_factor;
    let height_physical = pixel_height * scale_factor;

    MeasurementRecord {
        source_detection: detection.clone(),
        width_physical,
        height_physical,
        area_physical: width_physical * height_physical,
        pixel_width,
        pixel_height,
        unit: LengthUnit::Millimeters,
        coin_count: None,
        outline: None,
    }
}
