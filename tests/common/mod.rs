mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from defectview for tests
pub use defectview::{
    AnnotatedFrame, Annotator, CaptureController, CaptureState, ColorPolicy, DefectLedger,
    Detection, DetectionSet, Detector, ImageSession, InferenceConfig, LabelMode, RawPrediction,
};
