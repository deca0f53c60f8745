use std::path::Path;
use std::time::Instant;

use anyhow::{Result, bail};
use image::RgbImage;

use crate::annotate::{Annotator, ColorPolicy, LabelMode};
use crate::detection::{Detector, InferenceConfig};
use crate::ledger::DefectLedger;
use crate::models::{AnnotatedFrame, DetectionSet};
use crate::report;

/// Fixed stroke color for exported images.
pub const EXPORT_COLOR: image::Rgb<u8> = image::Rgb([0, 0, 238]);

/// What one processing step reports to the display surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessReport {
    pub summary: String,
    pub time_line: String,
    pub elapsed_ms: f64,
    pub count: usize,
}

/// Still-image workflow: process one image at a time, optionally save, then
/// process another.
///
/// Owns the detector, the preview and export annotators, the defect ledger,
/// and the current annotated frame. A processing step is atomic: if
/// inference fails, the ledger and the displayed frame keep their previous
/// contents.
pub struct ImageSession<D: Detector> {
    detector: D,
    config: InferenceConfig,
    preview: Annotator,
    export: Annotator,
    ledger: DefectLedger,
    current: Option<AnnotatedFrame>,
    verbose: bool,
}

impl<D: Detector> ImageSession<D> {
    pub fn new(detector: D) -> Self {
        Self {
            detector,
            config: InferenceConfig::default(),
            preview: Annotator::new(),
            export: Annotator::new()
                .with_label_mode(LabelMode::Descriptive)
                .with_color(ColorPolicy::Fixed(EXPORT_COLOR)),
            ledger: DefectLedger::new(),
            current: None,
            verbose: false,
        }
    }

    pub fn with_config(mut self, config: InferenceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_preview(mut self, annotator: Annotator) -> Self {
        self.preview = annotator;
        self
    }

    pub fn with_export(mut self, annotator: Annotator) -> Self {
        self.export = annotator;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run infer → annotate → ledger for one image.
    ///
    /// `position`/`total` number the image within the batch for the summary
    /// line. The previous image's records are discarded only once inference
    /// has succeeded.
    pub fn process(
        &mut self,
        frame: &RgbImage,
        path: &Path,
        position: usize,
        total: usize,
    ) -> Result<ProcessReport> {
        let started = Instant::now();

        let predictions = self.detector.infer(frame, &self.config)?;
        let detections = DetectionSet::from_predictions(predictions);

        if self.verbose {
            println!("inference returned {} predictions", detections.len());
        }

        let rendered = self.preview.render(frame, &detections);
        self.ledger.record_set(&detections);
        let count = detections.len();
        self.current = Some(AnnotatedFrame::new(frame.clone(), rendered, detections));

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        Ok(ProcessReport {
            summary: report::summary_line(
                position,
                total,
                path,
                frame.width(),
                frame.height(),
                count,
            ),
            time_line: report::processing_time_line(elapsed_ms),
            elapsed_ms,
            count,
        })
    }

    /// The frame from the last successful processing step, if any.
    pub fn current(&self) -> Option<&AnnotatedFrame> {
        self.current.as_ref()
    }

    pub fn ledger(&self) -> &DefectLedger {
        &self.ledger
    }

    /// Save the export rendering of the current frame.
    ///
    /// Re-renders from the clean source with the export annotator, so saving
    /// twice without re-processing writes byte-identical files.
    pub fn save(&self, path: &Path) -> Result<()> {
        let Some(frame) = &self.current else {
            bail!("no processed image to save");
        };
        let export = frame.render_with(&self.export);
        export.save(path)?;
        if self.verbose {
            println!("saved annotated image to {:?}", path);
        }
        Ok(())
    }
}
