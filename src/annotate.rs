use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::color::adaptive_color;
use crate::geometry::{BoxGeometry, resolve_detection};
use crate::models::{Detection, DetectionSet};

/// What the label next to each box says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMode {
    /// The detection's index only, for cross-referencing a defect table.
    Identifier,
    /// `"{class} {confidence}%"` with one decimal place.
    Descriptive,
}

/// How the stroke/label color is chosen per box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorPolicy {
    /// Contrast against the background sampled above the box.
    Adaptive,
    Fixed(Rgb<u8>),
}

/// Draws one image's full set of detections onto a copy of the frame.
///
/// The input buffer is never mutated, so repeated renders of the same set
/// (preview vs. export, different thickness or labels) produce independent
/// images with no accumulated marks.
pub struct Annotator {
    color: ColorPolicy,
    thickness: u32,
    label_mode: LabelMode,
    font: Option<FontArc>,
    font_scale: f32,
}

impl Annotator {
    pub fn new() -> Self {
        Self {
            color: ColorPolicy::Adaptive,
            thickness: 1,
            label_mode: LabelMode::Descriptive,
            font: None,
            font_scale: 14.0,
        }
    }

    pub fn with_color(mut self, color: ColorPolicy) -> Self {
        self.color = color;
        self
    }

    pub fn with_thickness(mut self, thickness: u32) -> Self {
        self.thickness = thickness.max(1);
        self
    }

    pub fn with_label_mode(mut self, mode: LabelMode) -> Self {
        self.label_mode = mode;
        self
    }

    /// Labels are rasterized only when a font is configured; box strokes are
    /// drawn either way.
    pub fn with_font(mut self, font: FontArc, scale: f32) -> Self {
        self.font = Some(font);
        self.font_scale = scale;
        self
    }

    pub fn label_mode(&self) -> LabelMode {
        self.label_mode
    }

    /// Label text for one detection under the given mode.
    pub fn label_text(det: &Detection, mode: LabelMode) -> String {
        match mode {
            LabelMode::Identifier => det.index.to_string(),
            LabelMode::Descriptive => {
                format!("{} {}", det.class_label, det.confidence_percent())
            }
        }
    }

    /// Render every detection, in index order, onto a fresh copy of `frame`.
    pub fn render(&self, frame: &RgbImage, detections: &DetectionSet) -> RgbImage {
        let mut canvas = frame.clone();
        for det in detections {
            let geom = resolve_detection(det);
            let color = match self.color {
                // Sample the clean input, not the partially drawn canvas.
                ColorPolicy::Adaptive => adaptive_color(frame, &geom),
                ColorPolicy::Fixed(c) => c,
            };
            self.stroke_box(&mut canvas, &geom, color);
            if let Some(font) = &self.font {
                let text = Self::label_text(det, self.label_mode);
                let (ax, ay) = geom.label_anchor();
                draw_text_mut(
                    &mut canvas,
                    color,
                    ax,
                    ay,
                    PxScale::from(self.font_scale),
                    font,
                    &text,
                );
            }
        }
        canvas
    }

    /// Hollow rectangle stroke, thickened by nesting inset rectangles.
    /// Out-of-frame portions are clipped by the line drawing itself.
    fn stroke_box(&self, canvas: &mut RgbImage, geom: &BoxGeometry, color: Rgb<u8>) {
        for t in 0..self.thickness as i32 {
            let (x0, y0) = (geom.x0 + t, geom.y0 + t);
            let (x1, y1) = (geom.x1 - t, geom.y1 - t);
            if x1 <= x0 || y1 <= y0 {
                break;
            }
            let rect = Rect::at(x0, y0).of_size((x1 - x0) as u32, (y1 - y0) as u32);
            draw_hollow_rect_mut(canvas, rect, color);
        }
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}
