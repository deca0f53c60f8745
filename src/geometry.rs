use crate::models::Detection;

/// Vertical gap between a box edge and its label baseline, in pixels.
pub const LABEL_MARGIN: i32 = 5;

/// Box corners and label placement for one detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxGeometry {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

/// Resolve center+size coordinates into corner form.
///
/// Division truncates toward zero, matching integer pixel addressing. The
/// result is not clamped to any frame; drawing clips later.
pub fn resolve(center_x: f32, center_y: f32, width: f32, height: f32) -> BoxGeometry {
    let (cx, cy) = (center_x as i32, center_y as i32);
    let (w, h) = (width as i32, height as i32);
    BoxGeometry {
        x0: cx - w / 2,
        y0: cy - h / 2,
        x1: cx + w / 2,
        y1: cy + h / 2,
    }
}

pub fn resolve_detection(det: &Detection) -> BoxGeometry {
    resolve(det.center_x, det.center_y, det.width, det.height)
}

impl BoxGeometry {
    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    /// Where the label text goes: just above the top-left corner, or below
    /// the box when that would land on or past the top edge. Horizontal
    /// overflow is accepted.
    pub fn label_anchor(&self) -> (i32, i32) {
        let above = self.y0 - LABEL_MARGIN;
        if above > 0 {
            (self.x0, above)
        } else {
            (self.x0, self.y1 + LABEL_MARGIN)
        }
    }
}
