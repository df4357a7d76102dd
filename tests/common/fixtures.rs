use image::{DynamicImage, ImageBuffer, Rgb};
use objsize::{Detection, DetectionSession, HeuristicScale, PixelBox, ReferenceObject};
use tempfile::NamedTempFile;

/// Creates a plain grey image of the given size.
pub fn test_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |_, _| Rgb([128u8, 128u8, 128u8])))
}

pub fn coin() -> ReferenceObject {
    ReferenceObject {
        name: "coin".to_string(),
        width_mm: 24.0,
        height_mm: 24.0,
    }
}

pub fn detection(label: &str, x: f64, y: f64, width: f64, height: f64) -> Detection {
    Detection::new(label, 0.9, PixelBox::new(x, y, width, height))
}

/// Three boxes on a 1000x800 image; the first two overlap around (150..200, 150..200).
pub fn sample_detections() -> Vec<Detection> {
    vec![
        detection("cup", 100.0, 100.0, 200.0, 100.0),
        detection("book", 150.0, 150.0, 300.0, 300.0),
        detection("phone", 700.0, 500.0, 80.0, 160.0),
    ]
}

pub fn sample_session() -> DetectionSession {
    DetectionSession::create(1, 1000, 800, sample_detections(), &coin(), &HeuristicScale)
        .expect("Failed to create sample session")
}

/// Writes detections as detector JSON to a temp file.
/// The file will be automatically cleaned up when dropped.
pub fn write_detections(detections: &[Detection]) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("Failed to create temp detections file");
    let json = serde_json::to_string(detections).expect("Failed to serialize detections");
    std::fs::write(file.path(), json).expect("Failed to write detections");
    file
}
