use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Result, bail};
use image::RgbImage;

use crate::annotate::Annotator;
use crate::detection::{Detector, InferenceConfig};
use crate::models::DetectionSet;
use crate::report;

/// A camera-like producer of frames.
///
/// `acquire` returning `None` means no frame was available this cycle; that
/// is a transient condition, not an error, and the loop keeps going.
/// Implementations must tolerate `close` being called without a prior
/// `open` and more than once.
pub trait FrameSource {
    fn open(&mut self) -> Result<()>;
    fn acquire(&mut self) -> Option<RgbImage>;
    fn close(&mut self);
}

/// Phase of the live capture loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Running,
    Paused,
    Stopped,
}

/// Everything one completed cycle publishes for display.
#[derive(Debug, Clone)]
pub struct CycleOutput {
    pub rendered: RgbImage,
    pub detections: DetectionSet,
    pub elapsed_ms: f64,
    /// Instantaneous throughput, `1 / elapsed_seconds`.
    pub fps: f64,
}

impl CycleOutput {
    pub fn time_line(&self) -> String {
        report::processing_time_line(self.elapsed_ms)
    }

    pub fn fps_line(&self) -> String {
        report::fps_line(self.fps)
    }
}

/// Drives repeated acquire → infer → annotate → publish cycles.
///
/// Owns the camera resource for its whole Running/Paused lifetime and
/// releases it exactly once. Cycles are sequential: the caller (a timer, an
/// event-loop task, or a plain loop in tests) calls [`run_cycle`] again only
/// after the previous call returned, so there is never more than one
/// inference call in flight.
///
/// [`run_cycle`]: CaptureController::run_cycle
pub struct CaptureController<S: FrameSource, D: Detector> {
    source: S,
    detector: D,
    annotator: Annotator,
    config: InferenceConfig,
    state: CaptureState,
    released: bool,
}

impl<S: FrameSource, D: Detector> CaptureController<S, D> {
    pub fn new(source: S, detector: D, annotator: Annotator) -> Self {
        Self {
            source,
            detector,
            annotator,
            config: InferenceConfig::default(),
            state: CaptureState::Idle,
            released: false,
        }
    }

    pub fn with_config(mut self, config: InferenceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Whether the caller should schedule another cycle.
    pub fn is_running(&self) -> bool {
        self.state == CaptureState::Running
    }

    /// Acquire the camera and enter Running. Valid only from Idle; once
    /// started, the loop can only pause, resume, or stop.
    pub fn start(&mut self) -> Result<()> {
        if self.state != CaptureState::Idle {
            bail!("start is only valid from the idle state");
        }
        self.source.open()?;
        self.state = CaptureState::Running;
        Ok(())
    }

    /// Stop scheduling new cycles. A cycle already underway completes and
    /// publishes once; pausing between cycles is the caller's only option
    /// since cycles are synchronous.
    pub fn pause(&mut self) -> Result<()> {
        if self.state != CaptureState::Running {
            bail!("pause is only valid while running");
        }
        self.state = CaptureState::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.state != CaptureState::Paused {
            bail!("resume is only valid while paused");
        }
        self.state = CaptureState::Running;
        Ok(())
    }

    /// Release the camera and enter Stopped. Valid from any state, including
    /// Idle, and idempotent: the source is closed exactly once.
    pub fn stop(&mut self) {
        if !self.released {
            self.source.close();
            self.released = true;
        }
        self.state = CaptureState::Stopped;
    }

    /// Run one acquire → infer → annotate cycle.
    ///
    /// Returns `Ok(None)` when no frame was available; the caller should
    /// still schedule the next cycle. Inference errors propagate without
    /// changing state, so the caller decides whether to keep looping.
    /// Elapsed time covers inference and rendering, matching the published
    /// throughput figure.
    pub fn run_cycle(&mut self) -> Result<Option<CycleOutput>> {
        if self.state != CaptureState::Running {
            bail!("cycles only run in the running state");
        }
        let Some(frame) = self.source.acquire() else {
            return Ok(None);
        };

        let started = Instant::now();
        let predictions = self.detector.infer(&frame, &self.config)?;
        let detections = DetectionSet::from_predictions(predictions);
        let rendered = self.annotator.render(&frame, &detections);
        let elapsed = started.elapsed().as_secs_f64();

        Ok(Some(CycleOutput {
            rendered,
            detections,
            elapsed_ms: elapsed * 1000.0,
            fps: 1.0 / elapsed,
        }))
    }
}

impl<S: FrameSource, D: Detector> Drop for CaptureController<S, D> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Frame source backed by a list of image files, for driving the live loop
/// without camera hardware. Unreadable files count as transient acquisition
/// failures: the cursor still advances and the loop moves on.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    cursor: usize,
}

impl ImageSequenceSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths, cursor: 0 }
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.paths.len()
    }
}

impl FrameSource for ImageSequenceSource {
    fn open(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn acquire(&mut self) -> Option<RgbImage> {
        let path = self.paths.get(self.cursor)?;
        let frame = image::open(path).ok().map(|img| img.into_rgb8());
        self.cursor += 1;
        frame
    }

    fn close(&mut self) {
        self.cursor = self.paths.len();
    }
}
