use std::sync::Arc;

use image::DynamicImage;
use tracing::debug;

use crate::detection::server::{ServerAnalysis, ServerObject};
use crate::error::{MeasureError, Result};
use crate::measurement;
use crate::models::{Detection, FrameSummary, LengthUnit, MeasurementRecord, PixelBox, ReferenceObject};
use crate::scale::ScaleEstimator;
use crate::selection::Selection;

/// Where the measurements of a session came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasurementOrigin {
    /// Computed locally from one scale factor shared by every detection
    Client { scale_factor: f64 },
    /// Precomputed by the analysis server against its own coin reference
    Server,
}

/// Detections and measurements for one analyzed image.
///
/// `measurements[i]` is always derived from `detections[i]`: both vectors are
/// private and only ever rebuilt together.
#[derive(Debug, Clone)]
pub struct DetectionSession {
    generation: u64,
    image_width: u32,
    image_height: u32,
    detections: Vec<Detection>,
    measurements: Vec<MeasurementRecord>,
    origin: MeasurementOrigin,
    frame: Option<FrameSummary>,
    processed_image: Option<Arc<DynamicImage>>,
    selection: Selection,
}

impl DetectionSession {
    pub fn create(
        generation: u64,
        image_width: u32,
        image_height: u32,
        detections: Vec<Detection>,
        reference: &ReferenceObject,
        estimator: &dyn ScaleEstimator,
    ) -> Result<Self> {
        let scale_factor = estimator.estimate(image_width, image_height, reference)?;
        debug!(
            generation,
            reference = %reference.name,
            scale_factor,
            "Creating session for {}x{} image with {} detections",
            image_width,
            image_height,
            detections.len()
        );

        let measurements = detections
            .iter()
            .map(|d| measurement::build(d, scale_factor))
            .collect();

        Ok(Self {
            generation,
            image_width,
            image_height,
            detections,
            measurements,
            origin: MeasurementOrigin::Client { scale_factor },
            frame: None,
            processed_image: None,
            selection: Selection::Unselected,
        })
    }

    /// Session backed by measurements the analysis server already computed
    pub fn from_server(
        generation: u64,
        image_width: u32,
        image_height: u32,
        analysis: ServerAnalysis,
    ) -> Self {
        let objects = &analysis.objects;
        let mut detections = Vec::with_capacity(objects.len());
        let mut measurements = Vec::with_capacity(objects.len());

        for (i, obj) in objects.iter().enumerate() {
            let bbox = PixelBox::from_polygon(&obj.outline).unwrap_or(PixelBox::new(0.0, 0.0, 0.0, 0.0));
            let detection = Detection::new(format!("Object {}", i + 1), 1.0, bbox);

            measurements.push(MeasurementRecord {
                source_detection: detection.clone(),
                width_physical: obj.width,
                height_physical: obj.height,
                area_physical: obj.area,
                pixel_width: bbox.width,
                pixel_height: bbox.height,
                unit: LengthUnit::Inches,
                coin_count: Some(obj.number_of_coins),
                outline: Some(obj.outline.clone()),
            });
            detections.push(detection);
        }

        // Frame info is repeated on every object; the first one is authoritative
        let frame = objects.first().and_then(ServerObject::frame);

        Self {
            generation,
            image_width,
            image_height,
            detections,
            measurements,
            origin: MeasurementOrigin::Server,
            frame,
            processed_image: analysis.processed_image.map(Arc::new),
            selection: Selection::Unselected,
        }
    }

    /// Rebuild measurements after the reference changed.
    /// Detections and the current selection are left as they are.
    pub fn recompute(&mut self, reference: &ReferenceObject, estimator: &dyn ScaleEstimator) -> Result<()> {
        if self.origin == MeasurementOrigin::Server {
            debug!(generation = self.generation, "Server measurements are not rescaled");
            return Ok(());
        }

        let scale_factor = estimator.estimate(self.image_width, self.image_height, reference)?;
        debug!(
            generation = self.generation,
            reference = %reference.name,
            scale_factor,
            "Recomputing {} measurements",
            self.detections.len()
        );

        self.measurements = self
            .detections
            .iter()
            .map(|d| measurement::build(d, scale_factor))
            .collect();
        self.origin = MeasurementOrigin::Client { scale_factor };
        Ok(())
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.detections.len() {
            return Err(MeasureError::IndexOutOfRange {
                index,
                len: self.detections.len(),
            });
        }
        self.selection = Selection::Selected(index);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::Unselected;
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected(&self) -> Option<usize> {
        self.selection.index()
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn measurements(&self) -> &[MeasurementRecord] {
        &self.measurements
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn origin(&self) -> MeasurementOrigin {
        self.origin
    }

    /// Scale shared by all client-side measurements
    pub fn scale_factor(&self) -> Option<f64> {
        match self.origin {
            MeasurementOrigin::Client { scale_factor } => Some(scale_factor),
            MeasurementOrigin::Server => None,
        }
    }

    pub fn frame(&self) -> Option<FrameSummary> {
        self.frame
    }

    /// Annotated image returned by the analysis server, if it decoded
    pub fn processed_image(&self) -> Option<&Arc<DynamicImage>> {
        self.processed_image.as_ref()
    }
}
