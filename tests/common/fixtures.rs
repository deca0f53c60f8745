use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::{Result, bail};
use image::{ImageBuffer, Rgb, RgbImage};

use defectview::capture::FrameSource;
use defectview::detection::{Detector, InferenceConfig, RawPrediction};

/// Creates a frame filled with a single color.
pub fn uniform_frame(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    ImageBuffer::from_fn(width, height, |_, _| Rgb(color))
}

/// Creates a mid-gray frame, the usual backdrop for geometry tests.
pub fn gray_frame(width: u32, height: u32) -> RgbImage {
    uniform_frame(width, height, [60, 60, 60])
}

/// Builds a center-format prediction.
pub fn prediction(x: f32, y: f32, w: f32, h: f32, label: &str, confidence: f32) -> RawPrediction {
    RawPrediction {
        x,
        y,
        width: w,
        height: h,
        class_label: label.to_string(),
        confidence,
    }
}

/// One scripted inference outcome.
pub enum InferStep {
    Predict(Vec<RawPrediction>),
    Fail,
}

/// Detector that replays a fixed script of outcomes. Once the script runs
/// out, the last `Predict` step keeps replaying (empty list if there was
/// none). The call counter is shared so tests can inspect it after the
/// detector moves into a controller or session.
pub struct ScriptedDetector {
    script: VecDeque<InferStep>,
    calls: Rc<Cell<usize>>,
}

impl ScriptedDetector {
    pub fn new(script: Vec<InferStep>) -> Self {
        Self {
            script: script.into(),
            calls: Rc::new(Cell::new(0)),
        }
    }

    /// Detector that always returns the same predictions.
    pub fn constant(predictions: Vec<RawPrediction>) -> Self {
        Self::new(vec![InferStep::Predict(predictions)])
    }

    pub fn call_counter(&self) -> Rc<Cell<usize>> {
        self.calls.clone()
    }
}

impl Detector for ScriptedDetector {
    fn infer(
        &mut self,
        _frame: &RgbImage,
        _config: &InferenceConfig,
    ) -> Result<Vec<RawPrediction>> {
        self.calls.set(self.calls.get() + 1);
        match self.script.pop_front() {
            Some(InferStep::Predict(predictions)) => {
                if self.script.is_empty() {
                    self.script
                        .push_back(InferStep::Predict(predictions.clone()));
                }
                Ok(predictions)
            }
            Some(InferStep::Fail) => bail!("scripted inference failure"),
            None => Ok(Vec::new()),
        }
    }
}

/// Frame source replaying a fixed acquisition sequence; `None` entries are
/// transient read failures. Open/close counters are shared with the test.
pub struct ScriptedSource {
    frames: VecDeque<Option<RgbImage>>,
    opened: Rc<Cell<usize>>,
    closed: Rc<Cell<usize>>,
}

impl ScriptedSource {
    pub fn new(frames: Vec<Option<RgbImage>>) -> Self {
        Self {
            frames: frames.into(),
            opened: Rc::new(Cell::new(0)),
            closed: Rc::new(Cell::new(0)),
        }
    }

    pub fn open_counter(&self) -> Rc<Cell<usize>> {
        self.opened.clone()
    }

    pub fn close_counter(&self) -> Rc<Cell<usize>> {
        self.closed.clone()
    }
}

impl FrameSource for ScriptedSource {
    fn open(&mut self) -> Result<()> {
        self.opened.set(self.opened.get() + 1);
        Ok(())
    }

    fn acquire(&mut self) -> Option<RgbImage> {
        self.frames.pop_front().flatten()
    }

    fn close(&mut self) {
        self.closed.set(self.closed.get() + 1);
    }
}
