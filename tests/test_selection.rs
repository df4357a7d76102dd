mod common;

use objsize::render::{self, HIGHLIGHT_STROKE, NORMAL_STROKE};
use objsize::selection::{click, to_image_space};
use objsize::{DetectionSession, HeuristicScale, Highlight, Selection, resolve_click};

use common::*;

#[test]
fn test_displayed_click_maps_to_image_pixels() -> anyhow::Result<()> {
    let session = DetectionSession::create(
        1,
        1000,
        800,
        vec![detection("cup", 90.0, 90.0, 50.0, 50.0)],
        &coin(),
        &HeuristicScale,
    )?;

    assert_eq!(to_image_space(50.0, 50.0, 500.0, 400.0, &session), Some((100.0, 100.0)));
    assert_eq!(resolve_click(50.0, 50.0, 500.0, 400.0, &session), Some(0));
    Ok(())
}

#[test]
fn test_overlap_resolves_to_first_in_order() {
    let session = sample_session();

    // (160, 160) lies in both the cup and the book
    assert_eq!(resolve_click(160.0, 160.0, 1000.0, 800.0, &session), Some(0));
    // (400, 400) only in the book
    assert_eq!(resolve_click(400.0, 400.0, 1000.0, 800.0, &session), Some(1));
}

#[test]
fn test_box_edges_are_inclusive() {
    let session = sample_session();
    assert_eq!(resolve_click(700.0, 500.0, 1000.0, 800.0, &session), Some(2));
    assert_eq!(resolve_click(780.0, 660.0, 1000.0, 800.0, &session), Some(2));
    assert_eq!(resolve_click(780.5, 660.0, 1000.0, 800.0, &session), None);
}

#[test]
fn test_click_outside_every_box() {
    let session = sample_session();
    for (x, y) in [(0.0, 0.0), (999.0, 10.0), (50.0, 700.0), (-5.0, 120.0)] {
        assert_eq!(resolve_click(x, y, 1000.0, 800.0, &session), None);
    }
}

#[test]
fn test_degenerate_display_size() {
    let session = sample_session();
    assert_eq!(resolve_click(10.0, 10.0, 0.0, 400.0, &session), None);
    assert_eq!(resolve_click(10.0, 10.0, 500.0, -1.0, &session), None);
}

#[test]
fn test_click_transitions() {
    let mut session = sample_session();

    let hit = click(370.0, 270.0, 500.0, 400.0, &mut session);
    assert_eq!(
        hit,
        Some(Highlight {
            overlay_index: 2,
            list_index: 2
        })
    );
    assert_eq!(session.selection(), Selection::Selected(2));

    // Miss: selection stays
    assert_eq!(click(5.0, 5.0, 500.0, 400.0, &mut session), None);
    assert_eq!(session.selection(), Selection::Selected(2));

    assert!(click(100.0, 60.0, 500.0, 400.0, &mut session).is_some());
    assert_eq!(session.selected(), Some(0));
}

#[test]
fn test_render_frame_marks_selection() -> anyhow::Result<()> {
    let mut session = sample_session();

    let frame = render::frame(&session);
    assert_eq!(frame.overlay.len(), 3);
    assert_eq!(frame.list.len(), 3);
    assert!(frame.overlay.iter().all(|item| !item.highlighted));
    assert!(frame.overlay.iter().all(|item| item.stroke() == NORMAL_STROKE));

    session.select(1)?;
    let frame = render::frame(&session);
    let highlighted: Vec<usize> = frame
        .overlay
        .iter()
        .enumerate()
        .filter(|(_, item)| item.highlighted)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(highlighted, [1]);
    assert_eq!(frame.overlay[1].stroke(), HIGHLIGHT_STROKE);
    assert_eq!(frame.overlay[1].label, frame.list[1].source_detection.label);
    assert!(frame.frame.is_none());
    Ok(())
}
