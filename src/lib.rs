pub mod analysis;
pub mod calibration;
pub mod config;
pub mod detection;
pub mod error;
pub mod logging;
pub mod measurement;
pub mod models;
pub mod overlay;
pub mod render;
pub mod scale;
pub mod selection;
pub mod session;

pub use analysis::{AnalysisTicket, Analyzer, Outcome};
pub use calibration::CalibrationRegistry;
pub use detection::{Analysis, Detector, JsonDetector, Source};
pub use error::{MeasureError, Result};
pub use models::{Detection, FrameSummary, LengthUnit, MeasurementRecord, PixelBox, ReferenceObject};
pub use render::{MeasurementCard, OverlayItem, RenderFrame};
pub use scale::{HeuristicScale, ScaleEstimator, estimate_scale};
pub use selection::{Highlight, Selection, resolve_click};
pub use session::DetectionSession;
