use crate::error::{MeasureError, Result};
use crate::models::ReferenceObject;

/// Share of the image's shorter side assumed to be covered by the reference object
pub const REFERENCE_FRACTION: f64 = 0.08;

/// Derives millimeters-per-pixel for an image given a reference object
pub trait ScaleEstimator: Send + Sync {
    fn estimate(&self, image_width: u32, image_height: u32, reference: &ReferenceObject) -> Result<f64>;
}

/// Assumes the reference spans `REFERENCE_FRACTION` of the shorter image side.
///
/// The reference is never located in the image. A zero-width reference
/// (e.g. an unset custom size) gives a scale of 0 and every measurement
/// collapses to zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScale;

impl ScaleEstimator for HeuristicScale {
    fn estimate(&self, image_width: u32, image_height: u32, reference: &ReferenceObject) -> Result<f64> {
        if image_width == 0 || image_height == 0 {
            return Err(MeasureError::InvalidImage {
                width: image_width,
                height: image_height,
            });
        }

        let reference_pixels = image_width.min(image_height) as f64 * REFERENCE_FRACTION;
        Ok(reference.width_mm / reference_pixels)
    }
}

/// Shorthand for `HeuristicScale.estimate(..)`
pub fn estimate_scale(image_width: u32, image_height: u32, reference: &ReferenceObject) -> Result<f64> {
    HeuristicScale.estimate(image_width, image_height, reference)
}
