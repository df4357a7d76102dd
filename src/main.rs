use anyhow::Context;
use clap::{Parser, ValueEnum};
use image::ImageReader;
use std::path::PathBuf;

use objsize::config::{BackendConfig, Config};
use objsize::detection::server::ServerBackend;
use objsize::overlay::LabelFont;
use objsize::render::{self, MeasurementCard};
use objsize::{Analyzer, CalibrationRegistry, JsonDetector, LengthUnit, Outcome, Source};

#[derive(Clone, Copy, ValueEnum)]
enum UnitArg {
    Mm,
    In,
}

impl From<UnitArg> for LengthUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Mm => LengthUnit::Millimeters,
            UnitArg::In => LengthUnit::Inches,
        }
    }
}

#[derive(Parser)]
#[command(name = "objsize")]
#[command(about = "Estimate real-world sizes of detected objects in a photo")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Detections produced by an object detector (JSON array of {bbox, class, score})
    #[arg(long, value_name = "FILE", conflicts_with = "server")]
    detections: Option<PathBuf>,

    /// Use the analysis server at this base URL instead of local detections
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// YAML settings file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Reference object: coin, credit-card, phone or custom
    #[arg(short, long)]
    reference: Option<String>,

    /// Custom reference width in millimeters
    #[arg(long, value_name = "MM")]
    custom_width: Option<String>,

    /// Custom reference height in millimeters
    #[arg(long, value_name = "MM")]
    custom_height: Option<String>,

    /// Display unit
    #[arg(long, value_enum)]
    unit: Option<UnitArg>,

    /// Select the object under this point of the displayed canvas, "X,Y"
    #[arg(long, value_name = "X,Y", requires = "display")]
    click: Option<String>,

    /// Size the canvas is displayed at, "WxH"
    #[arg(long, value_name = "WxH")]
    display: Option<String>,

    /// Write the image with the detection overlay drawn on it
    #[arg(long, value_name = "OUT")]
    annotate: Option<PathBuf>,

    /// Font family used for box labels
    #[arg(long, value_name = "FAMILY", default_value = "DejaVuSans")]
    font: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_pair(text: &str, sep: char) -> anyhow::Result<(f64, f64)> {
    let (a, b) = text
        .split_once(sep)
        .ok_or_else(|| anyhow::anyhow!("Expected two numbers separated by '{}': {}", sep, text))?;
    Ok((a.trim().parse()?, b.trim().parse()?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(url) = &args.server {
        config.backend = BackendConfig::Server { url: url.clone() };
    }
    if let Some(reference) = &args.reference {
        config.reference = reference.clone();
    }
    if let Some(unit) = args.unit {
        config.unit = unit.into();
    }
    config.apply_custom_input(args.custom_width.as_deref(), args.custom_height.as_deref());

    let level = if args.verbose { "debug" } else { config.log_level.as_str() };
    objsize::logging::setup(level)?;

    tracing::debug!("Loading image: {:?}", args.image_path);
    let img = ImageReader::open(&args.image_path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
    tracing::debug!("Image loaded: {}x{}", img.width(), img.height());

    let source = match &config.backend {
        BackendConfig::Client => {
            let path = args
                .detections
                .clone()
                .context("--detections is required unless a server backend is configured")?;
            Source::Client(JsonDetector::new(path))
        }
        BackendConfig::Server { url } => Source::Server(ServerBackend::new(url.clone())?),
    };

    let mut analyzer = Analyzer::new(CalibrationRegistry::new());
    analyzer.set_custom(config.custom_width_mm, config.custom_height_mm)?;
    analyzer.set_reference(&config.reference)?;

    if analyzer.run(&img, &source).await? == Outcome::Stale {
        anyhow::bail!("Analysis was superseded");
    }

    if let Some(click) = &args.click {
        let (x, y) = parse_pair(click, ',')?;
        let display = args.display.as_deref().unwrap_or_default();
        let (w, h) = parse_pair(display, 'x')?;
        match analyzer.click(x, y, w, h) {
            Some(highlight) => tracing::info!("Selected object {}", highlight.list_index + 1),
            None => tracing::info!("No object at ({}, {})", x, y),
        }
    }

    let frame = analyzer.render().context("No analysis result")?;

    if let Some(summary) = &frame.frame {
        println!("{}\n", render::frame_card(summary));
    }

    println!("=== Measured Objects ===");
    println!("Reference: {}", analyzer.active_name());
    println!("Total objects: {}", frame.list.len());

    if frame.list.is_empty() {
        println!("No objects detected.");
    }
    for (i, (record, item)) in frame.list.iter().zip(&frame.overlay).enumerate() {
        let marker = if item.highlighted { " <- selected" } else { "" };
        println!("\n{}{}", MeasurementCard::from_record(i, record, config.unit), marker);
    }

    if let Some(out) = &args.annotate {
        // The server's annotated copy replaces the upload when it decoded
        let mut canvas = match &frame.background {
            Some(background) => background.to_rgb8(),
            None => img.to_rgb8(),
        };
        let font = LabelFont::try_load(&args.font);
        objsize::overlay::draw(&mut canvas, &frame, font.as_ref());
        canvas
            .save(out)
            .map_err(|e| anyhow::anyhow!("Failed to save annotated image: {}", e))?;
        tracing::info!("Annotated image written to {:?}", out);
    }

    Ok(())
}
