//! Thin YOLO-style adapter over an onnxruntime session.
//!
//! The session wrapper and tensor layout follow the usual ONNX detection
//! convention: input `images` is (1, 3, H, W) normalized RGB, output
//! `output0` is (1, 4 + classes, boxes) with center-format coordinates in
//! model-input space.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use image::{RgbImage, imageops};
use ndarray::{Array4, Axis};
use ort::{inputs, session::Session};

use super::{Detector, InferenceConfig, RawPrediction};

pub struct OnnxDetector {
    session: Session,
    class_names: Vec<String>,
    input_width: u32,
    input_height: u32,
}

/// One class name per line.
pub fn load_class_names(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open class names file {:?}", path))?;
    let names: Vec<String> = BufReader::new(file).lines().collect::<std::io::Result<_>>()?;
    Ok(names)
}

impl OnnxDetector {
    pub fn new(
        model_path: &Path,
        class_names: Vec<String>,
        input_width: u32,
        input_height: u32,
    ) -> Result<Self> {
        let session = Session::builder()?
            .commit_from_file(model_path)
            .with_context(|| format!("failed to load model {:?}", model_path))?;
        Ok(Self {
            session,
            class_names,
            input_width,
            input_height,
        })
    }

    fn preprocess(&self, frame: &RgbImage) -> Array4<f32> {
        let resized = imageops::resize(
            frame,
            self.input_width,
            self.input_height,
            imageops::FilterType::Triangle,
        );
        let mut array = Array4::<f32>::zeros((
            1,
            3,
            self.input_height as usize,
            self.input_width as usize,
        ));
        for (x, y, pixel) in resized.enumerate_pixels() {
            let [r, g, b] = pixel.0;
            array[[0, 0, y as usize, x as usize]] = r as f32 / 255.0;
            array[[0, 1, y as usize, x as usize]] = g as f32 / 255.0;
            array[[0, 2, y as usize, x as usize]] = b as f32 / 255.0;
        }
        array
    }
}

impl Detector for OnnxDetector {
    fn infer(&mut self, frame: &RgbImage, config: &InferenceConfig) -> Result<Vec<RawPrediction>> {
        let input = self.preprocess(frame);
        let outputs = self.session.run(inputs!["images" => input.view()]?)?;
        let output = outputs["output0"].try_extract_tensor::<f32>()?;

        // (1, 4 + classes, boxes) -> rows of (boxes, 4 + classes).
        let preds = output.index_axis(Axis(0), 0);
        let preds = preds.t();

        let scale_x = frame.width() as f32 / self.input_width as f32;
        let scale_y = frame.height() as f32 / self.input_height as f32;

        let mut candidates: Vec<RawPrediction> = Vec::new();
        for row in preds.axis_iter(Axis(0)) {
            let row: Vec<f32> = row.iter().copied().collect();
            let (class_id, score) = row
                .iter()
                .skip(4) // skips bounding box coords.
                .copied()
                .enumerate()
                .fold((0usize, f32::MIN), |best, (id, value)| {
                    if value > best.1 { (id, value) } else { best }
                });
            if score < config.confidence_threshold {
                continue;
            }
            let class_label = self
                .class_names
                .get(class_id)
                .cloned()
                .unwrap_or_else(|| class_id.to_string());
            candidates.push(RawPrediction {
                x: row[0] * scale_x,
                y: row[1] * scale_y,
                width: row[2] * scale_x,
                height: row[3] * scale_y,
                class_label,
                confidence: score,
            });
        }

        Ok(suppress_overlaps(candidates, config.iou_threshold))
    }
}

/// Greedy per-class non-maximum suppression, highest confidence first.
fn suppress_overlaps(mut candidates: Vec<RawPrediction>, iou_threshold: f32) -> Vec<RawPrediction> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    let mut kept: Vec<RawPrediction> = Vec::new();
    for candidate in candidates {
        let overlaps = kept.iter().any(|k| {
            k.class_label == candidate.class_label && iou(k, &candidate) > iou_threshold
        });
        if !overlaps {
            kept.push(candidate);
        }
    }
    kept
}

fn iou(a: &RawPrediction, b: &RawPrediction) -> f32 {
    let (ax0, ay0) = (a.x - a.width / 2.0, a.y - a.height / 2.0);
    let (ax1, ay1) = (a.x + a.width / 2.0, a.y + a.height / 2.0);
    let (bx0, by0) = (b.x - b.width / 2.0, b.y - b.height / 2.0);
    let (bx1, by1) = (b.x + b.width / 2.0, b.y + b.height / 2.0);

    let inter_w = (ax1.min(bx1) - ax0.max(bx0)).max(0.0);
    let inter_h = (ay1.min(by1) - ay0.max(by0)).max(0.0);
    let inter = inter_w * inter_h;
    let union = a.width * a.height + b.width * b.height - inter;
    if union <= 0.0 { 0.0 } else { inter / union }
}
