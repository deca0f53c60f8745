//! Still-image session: atomic processing, display strings, idempotent save.

mod common;

use std::path::Path;

use common::{InferStep, ScriptedDetector, gray_frame, prediction, uniform_frame};
use defectview::session::ImageSession;

#[test]
fn test_process_reports_the_exact_summary_strings() -> anyhow::Result<()> {
    // 1. One crack at 87.3% confidence on a 200x200 frame
    let detector = ScriptedDetector::constant(vec![prediction(
        100.0, 100.0, 40.0, 20.0, "crack", 0.873,
    )]);
    let mut session = ImageSession::new(detector);

    // 2. Process and check the display surfaces
    let frame = gray_frame(200, 200);
    let report = session.process(&frame, Path::new("steel.png"), 1, 1)?;

    assert_eq!(report.summary, "image 1/1 steel.png: 200x200 1 detections");
    assert!(report.time_line.starts_with("Total processing time: "));
    assert!(report.time_line.ends_with("ms"));
    assert_eq!(report.count, 1);

    // 3. Ledger and current frame reflect the same detection
    assert_eq!(session.ledger().len(), 1);
    assert_eq!(session.ledger().all()[0].class_label, "crack");
    assert_eq!(session.ledger().all()[0].confidence, "87.3%");
    let current = session.current().unwrap();
    assert_eq!(current.detections().len(), 1);
    Ok(())
}

#[test]
fn test_zero_predictions_is_success_not_error() -> anyhow::Result<()> {
    let detector = ScriptedDetector::constant(vec![]);
    let mut session = ImageSession::new(detector);

    let frame = uniform_frame(640, 480, [90, 90, 90]);
    let report = session.process(&frame, Path::new("empty.png"), 1, 1)?;

    assert_eq!(report.summary, "image 1/1 empty.png: 640x480 0 detections");
    assert_eq!(report.count, 0);
    // The rendered preview is pixel-equal to the input.
    assert_eq!(session.current().unwrap().rendered(), &frame);
    Ok(())
}

#[test]
fn test_inference_failure_leaves_previous_state_untouched() -> anyhow::Result<()> {
    // 1. First image processes fine
    let detector = ScriptedDetector::new(vec![
        InferStep::Predict(vec![prediction(50.0, 50.0, 20.0, 20.0, "crack", 0.9)]),
        InferStep::Fail,
    ]);
    let mut session = ImageSession::new(detector);
    let frame = gray_frame(100, 100);
    session.process(&frame, Path::new("first.png"), 1, 2)?;

    // 2. Second inference raises: the operation aborts
    let second = gray_frame(100, 100);
    assert!(
        session
            .process(&second, Path::new("second.png"), 2, 2)
            .is_err()
    );

    // 3. Ledger and displayed frame still show the first image
    assert_eq!(session.ledger().len(), 1);
    assert_eq!(session.ledger().all()[0].class_label, "crack");
    assert_eq!(session.current().unwrap().detections().len(), 1);
    Ok(())
}

#[test]
fn test_save_is_idempotent() -> anyhow::Result<()> {
    // 1. Process one image
    let detector = ScriptedDetector::constant(vec![prediction(
        100.0, 100.0, 40.0, 20.0, "crack", 0.873,
    )]);
    let mut session = ImageSession::new(detector);
    let frame = gray_frame(200, 200);
    session.process(&frame, Path::new("steel.png"), 1, 1)?;

    // 2. Save twice without re-processing
    let dir = tempfile::TempDir::new()?;
    let first_path = dir.path().join("first.png");
    let second_path = dir.path().join("second.png");
    session.save(&first_path)?;
    session.save(&second_path)?;

    // 3. Byte-identical files both times
    let first = std::fs::read(&first_path)?;
    let second = std::fs::read(&second_path)?;
    assert_eq!(first, second);
    assert!(!first.is_empty());
    Ok(())
}

#[test]
fn test_save_without_a_processed_image_fails() {
    let detector = ScriptedDetector::constant(vec![]);
    let session = ImageSession::new(detector);
    assert!(session.save(Path::new("/tmp/never-written.png")).is_err());
}

#[test]
fn test_export_render_does_not_stack_on_the_preview() -> anyhow::Result<()> {
    // The export starts from the clean source: no preview-colored pixels
    // survive into it.
    let detector = ScriptedDetector::constant(vec![prediction(
        100.0, 100.0, 40.0, 20.0, "crack", 0.873,
    )]);
    let mut session = ImageSession::new(detector);
    let frame = gray_frame(200, 200);
    session.process(&frame, Path::new("steel.png"), 1, 1)?;

    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("export.png");
    session.save(&path)?;
    let exported = image::open(&path)?.into_rgb8();

    // Preview stroke on a dark frame is the adaptive light color; the
    // export stroke is the fixed export blue.
    assert_eq!(
        session.current().unwrap().rendered().get_pixel(80, 90),
        &defectview::color::LIGHT_COLOR
    );
    assert_eq!(
        exported.get_pixel(80, 90),
        &defectview::session::EXPORT_COLOR
    );
    Ok(())
}
