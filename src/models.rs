use serde::{Deserialize, Serialize};

/// Axis-aligned box in source-image pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Edges are inclusive on all four sides
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// Bounding box of a polygon, `None` for an empty point list
    pub fn from_polygon(points: &[[f64; 2]]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y) = (first[0], first[1]);
        let (mut max_x, mut max_y) = (first[0], first[1]);

        for p in &points[1..] {
            min_x = min_x.min(p[0]);
            min_y = min_y.min(p[1]);
            max_x = max_x.max(p[0]);
            max_y = max_y.max(p[1]);
        }

        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }
}

/// One labeled region reported by the object detector.
///
/// Serializes in the shape most browser detectors emit:
/// `{"bbox": [x, y, w, h], "class": "cup", "score": 0.87}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDetection", into = "RawDetection")]
pub struct Detection {
    pub label: String,
    pub confidence: f64,
    pub bbox: PixelBox,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f64, bbox: PixelBox) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawDetection {
    bbox: [f64; 4],
    class: String,
    score: f64,
}

impl From<RawDetection> for Detection {
    fn from(raw: RawDetection) -> Self {
        let [x, y, width, height] = raw.bbox;
        Detection {
            label: raw.class,
            confidence: raw.score,
            bbox: PixelBox::new(x, y, width, height),
        }
    }
}

impl From<Detection> for RawDetection {
    fn from(det: Detection) -> Self {
        RawDetection {
            bbox: [det.bbox.x, det.bbox.y, det.bbox.width, det.bbox.height],
            class: det.label,
            score: det.confidence,
        }
    }
}

/// Physical size of a calibration object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceObject {
    pub name: String,
    pub width_mm: f64,
    pub height_mm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    #[serde(alias = "mm")]
    Millimeters,
    #[serde(alias = "in")]
    Inches,
}

impl LengthUnit {
    pub const MM_PER_INCH: f64 = 25.4;

    pub fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Millimeters => "mm",
            LengthUnit::Inches => "in",
        }
    }

    /// Convert a length expressed in `self` into `target`
    pub fn convert(self, value: f64, target: LengthUnit) -> f64 {
        match (self, target) {
            (LengthUnit::Millimeters, LengthUnit::Inches) => value / Self::MM_PER_INCH,
            (LengthUnit::Inches, LengthUnit::Millimeters) => value * Self::MM_PER_INCH,
            _ => value,
        }
    }
}

/// Physical dimensions derived from one detection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRecord {
    pub source_detection: Detection,
    pub width_physical: f64,
    pub height_physical: f64,
    pub area_physical: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub unit: LengthUnit,

    /// How many reference coins fit inside the object (server measurements only)
    pub coin_count: Option<f64>,

    /// Rotated outline polygon in image pixels (server measurements only)
    pub outline: Option<Vec<[f64; 2]>>,
}

/// Whole-frame size reported alongside server measurements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSummary {
    pub width: f64,
    pub height: f64,
    pub coin_count: f64,
}
