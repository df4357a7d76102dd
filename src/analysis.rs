//! Ties the core together for one user: the active reference, the current
//! session and the guard against results of superseded analyses.

use image::DynamicImage;
use tracing::{info, warn};

use crate::calibration::{CUSTOM, CalibrationRegistry};
use crate::detection::{Analysis, Detector, Source};
use crate::error::{MeasureError, Result};
use crate::models::{Detection, ReferenceObject};
use crate::render::{self, RenderFrame};
use crate::scale::{HeuristicScale, ScaleEstimator};
use crate::selection::{self, Highlight};
use crate::session::DetectionSession;

/// Issued when an analysis starts; only the newest ticket may install a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisTicket {
    generation: u64,
}

impl AnalysisTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A new session replaced the previous one
    Applied,
    /// A newer analysis started meanwhile; the result was dropped
    Stale,
}

pub struct Analyzer {
    registry: CalibrationRegistry,
    active: String,
    estimator: Box<dyn ScaleEstimator>,
    session: Option<DetectionSession>,
    generation: u64,
}

impl Analyzer {
    pub fn new(registry: CalibrationRegistry) -> Self {
        Self {
            registry,
            active: "coin".to_string(),
            estimator: Box::new(HeuristicScale),
            session: None,
            generation: 0,
        }
    }

    pub fn with_estimator(mut self, estimator: Box<dyn ScaleEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_reference(mut self, name: &str) -> Result<Self> {
        self.set_reference(name)?;
        Ok(self)
    }

    pub fn begin(&mut self) -> AnalysisTicket {
        self.generation += 1;
        AnalysisTicket {
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: AnalysisTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Install detections for the image the ticket was issued for.
    ///
    /// A failed detection leaves the current session untouched and is
    /// returned for the caller to report.
    pub fn complete(
        &mut self,
        ticket: AnalysisTicket,
        image_width: u32,
        image_height: u32,
        result: Result<Vec<Detection>>,
    ) -> Result<Outcome> {
        self.complete_analysis(ticket, image_width, image_height, result.map(Analysis::Detections))
    }

    pub fn complete_analysis(
        &mut self,
        ticket: AnalysisTicket,
        image_width: u32,
        image_height: u32,
        result: Result<Analysis>,
    ) -> Result<Outcome> {
        if !self.is_current(ticket) {
            warn!(
                stale = ticket.generation,
                current = self.generation,
                "Discarding result of superseded analysis"
            );
            return Ok(Outcome::Stale);
        }

        let session = match result? {
            Analysis::Detections(detections) => DetectionSession::create(
                ticket.generation,
                image_width,
                image_height,
                detections,
                self.registry.get(&self.active)?,
                self.estimator.as_ref(),
            )?,
            Analysis::Server(analysis) => {
                DetectionSession::from_server(ticket.generation, image_width, image_height, analysis)
            }
        };

        info!(
            generation = ticket.generation,
            objects = session.len(),
            "Analysis complete for {}x{} image",
            image_width,
            image_height
        );
        self.session = Some(session);
        Ok(Outcome::Applied)
    }

    /// Run a detector on the image and install its results
    pub async fn analyze<D: Detector>(&mut self, image: &DynamicImage, detector: &D) -> Result<Outcome> {
        let ticket = self.begin();
        let result = detector.detect(image).await;
        self.complete(ticket, image.width(), image.height(), result)
    }

    /// Same as [`Analyzer::analyze`] for whichever backend is configured
    pub async fn run(&mut self, image: &DynamicImage, source: &Source) -> Result<Outcome> {
        let ticket = self.begin();
        let result = source.analyze(image).await;
        self.complete_analysis(ticket, image.width(), image.height(), result)
    }

    /// Switch the active reference and rescale the current session.
    /// On failure both the active name and the measurements stay as they were.
    pub fn set_reference(&mut self, name: &str) -> Result<()> {
        let reference = self.registry.get(name)?;
        if let Some(session) = self.session.as_mut() {
            session.recompute(reference, self.estimator.as_ref())?;
        }
        self.active = name.to_string();
        Ok(())
    }

    pub fn set_custom(&mut self, width_mm: f64, height_mm: f64) -> Result<()> {
        self.registry.set_custom(width_mm, height_mm);
        self.recompute_if_custom()
    }

    pub fn set_custom_from_input(&mut self, width: &str, height: &str) -> Result<()> {
        self.registry.set_custom_from_input(width, height);
        self.recompute_if_custom()
    }

    fn recompute_if_custom(&mut self) -> Result<()> {
        if self.active == CUSTOM {
            self.recompute()?;
        }
        Ok(())
    }

    fn recompute(&mut self) -> Result<()> {
        if let Some(session) = self.session.as_mut() {
            let reference = self.registry.get(&self.active)?;
            session.recompute(reference, self.estimator.as_ref())?;
        }
        Ok(())
    }

    pub fn active_name(&self) -> &str {
        &self.active
    }

    pub fn active_reference(&self) -> Result<&ReferenceObject> {
        self.registry.get(&self.active)
    }

    pub fn registry(&self) -> &CalibrationRegistry {
        &self.registry
    }

    pub fn session(&self) -> Option<&DetectionSession> {
        self.session.as_ref()
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        match self.session.as_mut() {
            Some(session) => session.select(index),
            None => Err(MeasureError::IndexOutOfRange { index, len: 0 }),
        }
    }

    pub fn clear_selection(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.clear_selection();
        }
    }

    pub fn click(
        &mut self,
        pointer_x: f64,
        pointer_y: f64,
        displayed_width: f64,
        displayed_height: f64,
    ) -> Option<Highlight> {
        let session = self.session.as_mut()?;
        selection::click(pointer_x, pointer_y, displayed_width, displayed_height, session)
    }

    pub fn render(&self) -> Option<RenderFrame> {
        self.session.as_ref().map(render::frame)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(CalibrationRegistry::new())
    }
}
