pub mod annotate;
pub mod capture;
pub mod color;
pub mod detection;
pub mod geometry;
pub mod ledger;
pub mod models;
pub mod report;
pub mod session;

pub use annotate::{Annotator, ColorPolicy, LabelMode};
pub use capture::{
    CaptureController, CaptureState, CycleOutput, FrameSource, ImageSequenceSource,
};
pub use detection::{Detector, InferenceConfig, RawPrediction};
pub use ledger::{DefectLedger, DefectRecord};
pub use models::{AnnotatedFrame, Detection, DetectionSet};
pub use session::{ImageSession, ProcessReport};
