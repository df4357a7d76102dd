//! Data handed to the rendering layer: what to draw on the overlay and
//! what to list, in the same order.

use std::fmt;
use std::sync::Arc;

use image::DynamicImage;

use crate::models::{FrameSummary, LengthUnit, MeasurementRecord, PixelBox};
use crate::session::DetectionSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stroke {
    pub color: [u8; 3],
    pub width: u32,
}

pub const NORMAL_STROKE: Stroke = Stroke {
    color: [0x4C, 0xAF, 0x50],
    width: 3,
};

pub const HIGHLIGHT_STROKE: Stroke = Stroke {
    color: [0xFF, 0x00, 0x00],
    width: 4,
};

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayItem {
    pub bbox: PixelBox,
    pub label: String,
    pub confidence: f64,
    pub highlighted: bool,
    pub outline: Option<Vec<[f64; 2]>>,
}

impl OverlayItem {
    pub fn stroke(&self) -> Stroke {
        if self.highlighted {
            HIGHLIGHT_STROKE
        } else {
            NORMAL_STROKE
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub overlay: Vec<OverlayItem>,
    pub list: Vec<MeasurementRecord>,
    pub frame: Option<FrameSummary>,

    /// Image to draw the overlay on instead of the uploaded one
    pub background: Option<Arc<DynamicImage>>,
}

/// Snapshot of a session for one redraw
pub fn frame(session: &DetectionSession) -> RenderFrame {
    let selected = session.selected();

    let overlay = session
        .detections()
        .iter()
        .zip(session.measurements())
        .enumerate()
        .map(|(i, (det, rec))| OverlayItem {
            bbox: det.bbox,
            label: det.label.clone(),
            confidence: det.confidence,
            highlighted: selected == Some(i),
            outline: rec.outline.clone(),
        })
        .collect();

    RenderFrame {
        overlay,
        list: session.measurements().to_vec(),
        frame: session.frame(),
        background: session.processed_image().cloned(),
    }
}

/// One entry of the results list, formatted for display
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementCard {
    pub title: String,
    pub width: String,
    pub height: String,
    pub area: String,
    pub pixels: String,
    pub coins: Option<String>,
}

impl MeasurementCard {
    pub fn from_record(index: usize, record: &MeasurementRecord, display_unit: LengthUnit) -> Self {
        let factor = record.unit.convert(1.0, display_unit);
        let decimals = decimals_for(display_unit);
        let symbol = display_unit.symbol();

        let title = match record.unit {
            LengthUnit::Millimeters => format!(
                "{} ({}% confidence)",
                record.source_detection.label,
                (record.source_detection.confidence * 100.0).round()
            ),
            // Server objects carry no class label
            LengthUnit::Inches => format!("Object {}", index + 1),
        };

        Self {
            title,
            width: format!("{:.*} {}", decimals, record.width_physical * factor, symbol),
            height: format!("{:.*} {}", decimals, record.height_physical * factor, symbol),
            area: format!("{:.*} {}²", decimals, record.area_physical * factor * factor, symbol),
            pixels: format!(
                "{} × {}",
                record.pixel_width.round(),
                record.pixel_height.round()
            ),
            coins: record.coin_count.map(|c| format!("≈ {:.0} coins fit inside", c)),
        }
    }
}

impl fmt::Display for MeasurementCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "  Width:  {}", self.width)?;
        writeln!(f, "  Height: {}", self.height)?;
        writeln!(f, "  Area:   {}", self.area)?;
        write!(f, "  Pixels: {}", self.pixels)?;
        if let Some(coins) = &self.coins {
            write!(f, "\n  {}", coins)?;
        }
        Ok(())
    }
}

/// Frame size line shown once above the list for server results
pub fn frame_card(frame: &FrameSummary) -> String {
    format!(
        "Frame\n  Width:  {:.2} in\n  Height: {:.2} in\n  ≈ {:.0} coins fit inside",
        frame.width, frame.height, frame.coin_count
    )
}

fn decimals_for(unit: LengthUnit) -> usize {
    match unit {
        LengthUnit::Millimeters => 1,
        LengthUnit::Inches => 2,
    }
}
