use image::RgbImage;
use serde::Serialize;

use crate::detection::RawPrediction;

/// One predicted object instance from a single inference call.
///
/// Coordinates are center-format, as the hosted model returns them. Corner
/// coordinates are derived with truncating division so they match integer
/// pixel addressing; they may fall outside the frame and are clipped at
/// draw time, never here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// 1-based position in the prediction order, restarting per image.
    pub index: u32,
    pub class_label: String,
    /// Model confidence in [0, 1].
    pub confidence: f32,
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Detection {
    pub fn top_left(&self) -> (i32, i32) {
        (
            self.center_x as i32 - self.width as i32 / 2,
            self.center_y as i32 - self.height as i32 / 2,
        )
    }

    pub fn bottom_right(&self) -> (i32, i32) {
        (
            self.center_x as i32 + self.width as i32 / 2,
            self.center_y as i32 + self.height as i32 / 2,
        )
    }

    /// Confidence as a percentage string with one decimal place, e.g. "87.3%".
    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }
}

/// All detections from one inference call, in the order the model returned
/// them. Built wholesale per call and replaced on the next one, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectionSet {
    detections: Vec<Detection>,
}

impl DetectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert raw model predictions, assigning 1-based indices in return order.
    pub fn from_predictions(predictions: Vec<RawPrediction>) -> Self {
        let detections = predictions
            .into_iter()
            .enumerate()
            .map(|(i, p)| Detection {
                index: (i + 1) as u32,
                class_label: p.class_label,
                confidence: p.confidence,
                center_x: p.x,
                center_y: p.y,
                width: p.width,
                height: p.height,
            })
            .collect();
        Self { detections }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.detections.iter()
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

impl<'a> IntoIterator for &'a DetectionSet {
    type Item = &'a Detection;
    type IntoIter = std::slice::Iter<'a, Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.iter()
    }
}

/// Immutable snapshot of one processed image: the clean source pixels, the
/// rendered preview, and the detections that produced it.
///
/// Held once per processed image so that "save" reproduces exactly what was
/// analyzed, independent of any later inference. Export renders start from
/// the clean source again, so label modes never stack marks.
#[derive(Debug, Clone)]
pub struct AnnotatedFrame {
    source: RgbImage,
    rendered: RgbImage,
    detections: DetectionSet,
}

impl AnnotatedFrame {
    pub fn new(source: RgbImage, rendered: RgbImage, detections: DetectionSet) -> Self {
        Self {
            source,
            rendered,
            detections,
        }
    }

    pub fn source(&self) -> &RgbImage {
        &self.source
    }

    pub fn rendered(&self) -> &RgbImage {
        &self.rendered
    }

    pub fn detections(&self) -> &DetectionSet {
        &self.detections
    }

    /// Re-render from the clean source with a different annotator (e.g. the
    /// descriptive export style after an identifier-mode preview).
    pub fn render_with(&self, annotator: &crate::annotate::Annotator) -> RgbImage {
        annotator.render(&self.source, &self.detections)
    }
}
