pub mod server;

use std::future::Future;
use std::path::PathBuf;

use image::DynamicImage;
use tracing::debug;

use crate::error::{MeasureError, Result};
use crate::models::Detection;
use server::{ServerAnalysis, ServerBackend};

/// External object detector. Results arrive as one resolved batch.
pub trait Detector {
    fn detect(&self, image: &DynamicImage) -> impl Future<Output = Result<Vec<Detection>>>;
}

/// Replays detections an external model wrote to a JSON file
#[derive(Debug, Clone)]
pub struct JsonDetector {
    path: PathBuf,
}

impl JsonDetector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Detector for JsonDetector {
    async fn detect(&self, _image: &DynamicImage) -> Result<Vec<Detection>> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            MeasureError::Detection(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        let detections = parse_detections(&text)?;
        debug!(count = detections.len(), path = %self.path.display(), "Loaded detections");
        Ok(detections)
    }
}

/// Parse a JSON array of `{bbox, class, score}` predictions
pub fn parse_detections(text: &str) -> Result<Vec<Detection>> {
    serde_json::from_str(text)
        .map_err(|e| MeasureError::Detection(format!("Malformed detections: {}", e)))
}

/// Result of one analysis, from either backend
#[derive(Debug, Clone)]
pub enum Analysis {
    Detections(Vec<Detection>),
    Server(ServerAnalysis),
}

/// Backend chosen by configuration
#[derive(Debug)]
pub enum Source {
    /// Detector boxes measured locally with the heuristic scale
    Client(JsonDetector),
    /// Contour measurement done by the analysis server
    Server(ServerBackend),
}

impl Source {
    pub async fn analyze(&self, image: &DynamicImage) -> Result<Analysis> {
        match self {
            Source::Client(detector) => detector.detect(image).await.map(Analysis::Detections),
            Source::Server(backend) => backend.analyze(image).await.map(Analysis::Server),
        }
    }
}
