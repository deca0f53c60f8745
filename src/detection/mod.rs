//! The boundary to the external detection model.
//!
//! The model is an opaque collaborator: one synchronous call that either
//! returns predictions or fails. Raw predictions are converted into
//! [`crate::models::Detection`] immediately at this boundary so the rest of
//! the core never sees the backend's response shape.

#[cfg(feature = "onnx")]
pub mod onnx;

use anyhow::Result;
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// One prediction exactly as the model returns it: center-format box,
/// class name, confidence in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub class_label: String,
    pub confidence: f32,
}

/// Thresholds passed to every inference call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Minimum score to keep a prediction.
    pub confidence_threshold: f32,
    /// Overlap suppression threshold.
    pub iou_threshold: f32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            iou_threshold: 0.5,
        }
    }
}

/// A detection model behind a single blocking call.
///
/// No retry or cancellation semantics: a call either returns the full
/// ordered prediction list or an error, and a slow call stalls the caller
/// until it returns.
pub trait Detector {
    fn infer(&mut self, frame: &RgbImage, config: &InferenceConfig) -> Result<Vec<RawPrediction>>;
}

impl<T: Detector + ?Sized> Detector for Box<T> {
    fn infer(&mut self, frame: &RgbImage, config: &InferenceConfig) -> Result<Vec<RawPrediction>> {
        (**self).infer(frame, config)
    }
}
