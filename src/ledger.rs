use serde::Serialize;

use crate::models::{Detection, DetectionSet};

/// One row of the defect table: the on-screen ID, the class, and the
/// confidence already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefectRecord {
    pub id: u32,
    pub class_label: String,
    pub confidence: String,
}

/// Per-image accumulator of detection records for tabular display and
/// export re-rendering.
///
/// Holds exactly one image's worth of data: processing a new image resets
/// it, and any unsaved export opportunity for the previous image is gone.
/// Single-slot on purpose, to keep the "process one image, optionally save,
/// then process another" workflow simple.
#[derive(Debug, Clone, Default)]
pub struct DefectLedger {
    records: Vec<DefectRecord>,
}

impl DefectLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all records ahead of a new image.
    pub fn reset(&mut self) {
        self.records.clear();
    }

    /// Append one detection's record, preserving detection-set order.
    pub fn record(&mut self, det: &Detection) {
        self.records.push(DefectRecord {
            id: det.index,
            class_label: det.class_label.clone(),
            confidence: det.confidence_percent(),
        });
    }

    /// Reset and repopulate from a full detection set.
    pub fn record_set(&mut self, detections: &DetectionSet) {
        self.reset();
        for det in detections {
            self.record(det);
        }
    }

    pub fn all(&self) -> &[DefectRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
