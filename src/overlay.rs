use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::debug;

use crate::render::{OverlayItem, RenderFrame, Stroke};

const LABEL_SIZE: f32 = 16.0;

/// TrueType font used for box labels
pub struct LabelFont {
    font: FontVec,
    scale: PxScale,
}

impl LabelFont {
    pub fn from_bytes(data: Vec<u8>) -> Option<Self> {
        let font = FontVec::try_from_vec(data).ok()?;
        Some(Self {
            font,
            scale: PxScale::from(LABEL_SIZE),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Option<Self> {
        Self::from_bytes(std::fs::read(path).ok()?)
    }

    /// Look for a font family in the usual system locations
    pub fn try_load(family: &str) -> Option<Self> {
        let paths = [
            format!("/usr/share/fonts/truetype/dejavu/{}.ttf", family),
            format!("/usr/share/fonts/truetype/{}.ttf", family),
            format!("/usr/share/fonts/TTF/{}.ttf", family),
            format!("/Library/Fonts/{}.ttf", family),
            format!("/System/Library/Fonts/Supplemental/{}.ttf", family),
            format!("C:\\Windows\\Fonts\\{}.ttf", family),
            format!("{}.ttf", family),
        ];

        let found = paths.iter().find_map(|p| Self::load(p));
        if found.is_none() {
            debug!("Font '{}' not found, labels will not be drawn", family);
        }
        found
    }
}

/// Paint the overlay of a render frame onto an image.
/// Server outlines are drawn as polygons, everything else as labelled boxes.
pub fn draw(canvas: &mut RgbImage, frame: &RenderFrame, labels: Option<&LabelFont>) {
    // Highlighted item last so it stays on top
    let (highlighted, normal): (Vec<&OverlayItem>, Vec<&OverlayItem>) =
        frame.overlay.iter().partition(|item| item.highlighted);

    for item in normal.into_iter().chain(highlighted) {
        let stroke = item.stroke();
        match &item.outline {
            Some(points) if points.len() > 1 => draw_polygon(canvas, points, stroke),
            _ => {
                draw_box(canvas, item, stroke);
                if let Some(font) = labels {
                    draw_label(canvas, item, stroke, font);
                }
            }
        }
    }
}

/// Keep coordinates within a margin of the canvas so integer math cannot overflow
fn clamp_to_canvas(canvas: &RgbImage, x: f64, y: f64, margin: f64) -> (f64, f64) {
    (
        x.clamp(-margin, canvas.width() as f64 + margin),
        y.clamp(-margin, canvas.height() as f64 + margin),
    )
}

fn draw_box(canvas: &mut RgbImage, item: &OverlayItem, stroke: Stroke) {
    let color = Rgb(stroke.color);
    let margin = stroke.width as f64 + 1.0;
    let (left, top) = clamp_to_canvas(canvas, item.bbox.x, item.bbox.y, margin);
    let (right, bottom) = clamp_to_canvas(canvas, item.bbox.right(), item.bbox.bottom(), margin);
    if right.is_nan() || bottom.is_nan() || left.is_nan() || top.is_nan() {
        return;
    }

    let x = left.round() as i32;
    let y = top.round() as i32;
    let w = ((right - left).round() as i32).max(1);
    let h = ((bottom - top).round() as i32).max(1);

    // Thick stroke centred on the box edge, one pixel ring at a time
    let half = (stroke.width / 2) as i32;
    for offset in -half..(stroke.width as i32 - half) {
        let ring_w = w + 2 * offset;
        let ring_h = h + 2 * offset;
        if ring_w < 1 || ring_h < 1 {
            continue;
        }
        let rect = Rect::at(x - offset, y - offset).of_size(ring_w as u32, ring_h as u32);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

/// Label text sits just above the box, like the browser overlay
fn draw_label(canvas: &mut RgbImage, item: &OverlayItem, stroke: Stroke, font: &LabelFont) {
    let top = item.bbox.y - 5.0 - LABEL_SIZE as f64;
    let (x, y) = clamp_to_canvas(canvas, item.bbox.x + 5.0, top, 0.0);
    draw_text_mut(
        canvas,
        Rgb(stroke.color),
        x as i32,
        y as i32,
        font.scale,
        &font.font,
        &item.label,
    );
}

fn draw_polygon(canvas: &mut RgbImage, points: &[[f64; 2]], stroke: Stroke) {
    let color = Rgb(stroke.color);
    let margin = stroke.width as f64 + 1.0;
    let points: Vec<(f32, f32)> = points
        .iter()
        .map(|p| {
            let (x, y) = clamp_to_canvas(canvas, p[0], p[1], margin);
            (x as f32, y as f32)
        })
        .collect();
    let n = points.len();
    let half = (stroke.width / 2) as i32;

    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        for offset in -half..(stroke.width as i32 - half) {
            let d = offset as f32;
            draw_line_segment_mut(canvas, (a.0 + d, a.1 + d), (b.0 + d, b.1 + d), color);
        }
    }
}
