//! Client for the contour-measuring analysis server.
//!
//! The server receives the image as multipart field `image` on
//! `POST /analyze`, finds object outlines, uses the smallest one as a coin
//! reference and replies with measurements in inches plus an annotated copy
//! of the image as a data URL.

use std::io::Cursor;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::{DynamicImage, ImageFormat};
use reqwest::{Client, multipart};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{MeasureError, Result};
use crate::models::FrameSummary;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// One measured object as returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerObject {
    pub width: f64,
    pub height: f64,
    pub area: f64,
    pub number_of_coins: f64,
    #[serde(rename = "box")]
    pub outline: Vec<[f64; 2]>,
    #[serde(default)]
    pub frame_width: Option<f64>,
    #[serde(default)]
    pub frame_height: Option<f64>,
    #[serde(default)]
    pub frame_dimes: Option<f64>,
}

impl ServerObject {
    pub fn frame(&self) -> Option<FrameSummary> {
        Some(FrameSummary {
            width: self.frame_width?,
            height: self.frame_height?,
            coin_count: self.frame_dimes?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ServerAnalysis {
    pub objects: Vec<ServerObject>,
    pub processed_image: Option<DynamicImage>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    objects: Vec<ServerObject>,
    #[serde(default)]
    processed_image: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug)]
pub struct ServerBackend {
    base_url: String,
    client: Client,
}

impl ServerBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| MeasureError::Detection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/analyze", self.base_url)
    }

    /// Upload the image and wait for the server's measurements
    pub async fn analyze(&self, image: &DynamicImage) -> Result<ServerAnalysis> {
        let jpeg = encode_jpeg(image)?;
        debug!(bytes = jpeg.len(), url = %self.endpoint(), "Uploading image");

        let part = multipart::Part::bytes(jpeg)
            .file_name("upload.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| MeasureError::Detection(e.to_string()))?;
        let form = multipart::Form::new().part("image", part);

        let response = self
            .client
            .post(self.endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(|e| MeasureError::Detection(format!("Failed to upload image: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MeasureError::Detection(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let detail = match parse_response(&body) {
                Err(MeasureError::Detection(msg)) => msg,
                _ => body.chars().take(200).collect(),
            };
            return Err(MeasureError::Detection(format!("Server returned {}: {}", status, detail)));
        }

        let analysis = parse_response(&body)?;
        info!(objects = analysis.objects.len(), "Server analysis complete");
        Ok(analysis)
    }
}

/// Decode an `/analyze` response body
pub fn parse_response(body: &str) -> Result<ServerAnalysis> {
    let response: AnalyzeResponse = serde_json::from_str(body)
        .map_err(|e| MeasureError::Detection(format!("Malformed server response: {}", e)))?;

    if let Some(error) = response.error {
        return Err(MeasureError::Detection(error));
    }

    // The annotated copy is optional; measurements stand on their own
    let processed_image = response
        .processed_image
        .as_deref()
        .and_then(|url| match decode_data_url(url) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Ignoring undecodable processed image: {}", e);
                None
            }
        });

    Ok(ServerAnalysis {
        objects: response.objects,
        processed_image,
    })
}

/// Decode a `data:image/...;base64,` URL into an image
pub fn decode_data_url(url: &str) -> Result<DynamicImage> {
    let (meta, payload) = url
        .split_once(',')
        .ok_or_else(|| MeasureError::Media("Data URL has no payload".to_string()))?;
    if !meta.ends_with(";base64") {
        return Err(MeasureError::Media(format!("Unsupported data URL: {}", meta)));
    }

    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|e| MeasureError::Media(format!("Invalid base64 payload: {}", e)))?;
    image::load_from_memory(&bytes).map_err(|e| MeasureError::Media(e.to_string()))
}

fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    // JPEG has no alpha channel
    DynamicImage::ImageRgb8(image.to_rgb8())
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .map_err(|e| MeasureError::Media(format!("Failed to encode image: {}", e)))?;
    Ok(buf)
}
