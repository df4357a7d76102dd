//! Tests for measurement building and the detection session.
//!
//! Tests cover:
//! - The 1000x800 coin scenario
//! - Index alignment between detections and measurements
//! - Recomputing after a reference change
//! - Selection state transitions

mod common;

use objsize::measurement;
use objsize::session::MeasurementOrigin;
use objsize::{CalibrationRegistry, DetectionSession, HeuristicScale, LengthUnit, MeasureError, Selection};

use common::*;

#[test]
fn test_build_coin_scenario() {
    let det = detection("cup", 100.0, 100.0, 200.0, 100.0);
    let record = measurement::build(&det, 0.375);

    assert_eq!(record.width_physical, 75.0);
    assert_eq!(record.height_physical, 37.5);
    assert_eq!(record.area_physical, 2812.5);
    assert_eq!(record.pixel_width, 200.0);
    assert_eq!(record.pixel_height, 100.0);
    assert_eq!(record.unit, LengthUnit::Millimeters);
    assert_eq!(record.source_detection, det);
}

#[test]
fn test_build_is_deterministic() {
    let det = detection("odd", 13.3, 7.7, 123.456, 78.9);
    let a = measurement::build(&det, 0.1234);
    let b = measurement::build(&det, 0.1234);
    assert_eq!(a, b);
}

#[test]
fn test_build_keeps_fractional_pixels() {
    let det = detection("thin", 0.0, 0.0, 10.6, 3.2);
    let record = measurement::build(&det, 1.0);
    assert_eq!(record.pixel_width, 10.6);
    assert_eq!(record.pixel_height, 3.2);
}

#[test]
fn test_session_alignment() -> anyhow::Result<()> {
    let detections = sample_detections();
    let session = DetectionSession::create(7, 1000, 800, detections.clone(), &coin(), &HeuristicScale)?;

    assert_eq!(session.len(), detections.len());
    assert_eq!(session.measurements().len(), detections.len());
    for (i, det) in detections.iter().enumerate() {
        assert_eq!(&session.detections()[i], det);
        assert_eq!(&session.measurements()[i].source_detection, det);
    }

    assert_eq!(session.generation(), 7);
    assert_eq!(session.image_size(), (1000, 800));
    assert_eq!(session.scale_factor(), Some(0.375));
    assert_eq!(session.selection(), Selection::Unselected);
    Ok(())
}

#[test]
fn test_session_shares_one_scale() -> anyhow::Result<()> {
    let session = sample_session();
    for record in session.measurements() {
        assert_eq!(record.width_physical, record.pixel_width * 0.375);
        assert_eq!(record.height_physical, record.pixel_height * 0.375);
    }
    Ok(())
}

#[test]
fn test_empty_session() -> anyhow::Result<()> {
    let session = DetectionSession::create(1, 640, 480, vec![], &coin(), &HeuristicScale)?;
    assert!(session.is_empty());
    assert!(session.measurements().is_empty());
    Ok(())
}

#[test]
fn test_session_rejects_zero_area_image() {
    let result = DetectionSession::create(1, 0, 480, sample_detections(), &coin(), &HeuristicScale);
    assert!(matches!(result, Err(MeasureError::InvalidImage { .. })));
}

#[test]
fn test_recompute_preserves_detections_and_selection() -> anyhow::Result<()> {
    let registry = CalibrationRegistry::new();
    let mut session = sample_session();
    session.select(1)?;
    let before = session.detections().to_vec();

    session.recompute(registry.get("credit-card")?, &HeuristicScale)?;

    assert_eq!(session.detections(), before.as_slice());
    assert_eq!(session.selected(), Some(1));
    // 85.6 mm over 64 px
    let scale = 85.6 / 64.0;
    assert_eq!(session.scale_factor(), Some(scale));
    assert_eq!(session.origin(), MeasurementOrigin::Client { scale_factor: scale });
    assert_eq!(session.measurements()[0].width_physical, 200.0 * scale);
    for (det, record) in session.detections().iter().zip(session.measurements()) {
        assert_eq!(&record.source_detection, det);
    }
    Ok(())
}

#[test]
fn test_recompute_with_unset_custom_collapses_to_zero() -> anyhow::Result<()> {
    let registry = CalibrationRegistry::new();
    let mut session = sample_session();

    session.recompute(registry.get("custom")?, &HeuristicScale)?;

    for record in session.measurements() {
        assert_eq!(record.width_physical, 0.0);
        assert_eq!(record.height_physical, 0.0);
        assert_eq!(record.area_physical, 0.0);
    }
    Ok(())
}

#[test]
fn test_select_and_clear() -> anyhow::Result<()> {
    let mut session = sample_session();

    session.select(2)?;
    assert_eq!(session.selection(), Selection::Selected(2));

    session.select(0)?;
    assert_eq!(session.selected(), Some(0));

    session.clear_selection();
    assert_eq!(session.selection(), Selection::Unselected);
    Ok(())
}

#[test]
fn test_select_out_of_range_keeps_selection() -> anyhow::Result<()> {
    let mut session = sample_session();
    session.select(1)?;

    let result = session.select(5);
    assert!(matches!(
        result,
        Err(MeasureError::IndexOutOfRange { index: 5, len: 3 })
    ));
    assert_eq!(session.selected(), Some(1));

    session.clear_selection();
    assert!(session.select(3).is_err());
    assert_eq!(session.selected(), None);
    Ok(())
}
