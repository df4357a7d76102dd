use tracing::debug;

use crate::session::DetectionSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(usize),
}

impl Selection {
    pub fn index(self) -> Option<usize> {
        match self {
            Selection::Unselected => None,
            Selection::Selected(i) => Some(i),
        }
    }
}

/// Paired highlight to apply after a selection: redraw the overlay box and
/// flash the matching list entry. Both point at the same position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub overlay_index: usize,
    pub list_index: usize,
}

impl Highlight {
    fn at(index: usize) -> Self {
        Self {
            overlay_index: index,
            list_index: index,
        }
    }
}

/// Map a pointer position on the displayed (possibly CSS-scaled) canvas into
/// source-image pixels. `None` when the displayed size is degenerate.
pub fn to_image_space(
    pointer_x: f64,
    pointer_y: f64,
    displayed_width: f64,
    displayed_height: f64,
    session: &DetectionSession,
) -> Option<(f64, f64)> {
    if !(displayed_width > 0.0 && displayed_height > 0.0) {
        return None;
    }

    let (image_width, image_height) = session.image_size();
    Some((
        pointer_x * (image_width as f64 / displayed_width),
        pointer_y * (image_height as f64 / displayed_height),
    ))
}

/// Index of the first detection (in detector order) whose box contains the click
pub fn resolve_click(
    pointer_x: f64,
    pointer_y: f64,
    displayed_width: f64,
    displayed_height: f64,
    session: &DetectionSession,
) -> Option<usize> {
    let (x, y) = to_image_space(pointer_x, pointer_y, displayed_width, displayed_height, session)?;
    session
        .detections()
        .iter()
        .position(|d| d.bbox.contains(x, y))
}

/// Resolve a click and apply it to the session's selection.
/// A click outside every box leaves the selection unchanged.
pub fn click(
    pointer_x: f64,
    pointer_y: f64,
    displayed_width: f64,
    displayed_height: f64,
    session: &mut DetectionSession,
) -> Option<Highlight> {
    let index = resolve_click(pointer_x, pointer_y, displayed_width, displayed_height, session)?;
    // resolve_click only yields indices of existing detections
    session.select(index).ok()?;
    debug!(index, "Selected detection by click");
    Some(Highlight::at(index))
}
