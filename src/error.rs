/// Errors raised by the measurement core and its boundary adapters
#[derive(Debug, thiserror::Error)]
pub enum MeasureError {
    #[error("Unknown reference object: {0}")]
    UnknownReference(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidImage { width: u32, height: u32 },

    #[error("Selection index {index} out of range for {len} detections")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Detection failed: {0}")]
    Detection(String),

    #[error("Could not read image: {0}")]
    Media(String),
}

pub type Result<T> = std::result::Result<T, MeasureError>;
