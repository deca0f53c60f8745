//! Display-surface strings. The decimal formatting here is relied on by
//! downstream consumers; keep it exact.

use std::path::Path;

/// `"image {i}/{n} {path}: {w}x{h} {count} detections"`
pub fn summary_line(
    position: usize,
    total: usize,
    path: &Path,
    width: u32,
    height: u32,
    count: usize,
) -> String {
    format!(
        "image {}/{} {}: {}x{} {} detections",
        position,
        total,
        path.display(),
        width,
        height,
        count
    )
}

/// `"Total processing time: {ms}ms"` with one decimal place.
pub fn processing_time_line(elapsed_ms: f64) -> String {
    format!("Total processing time: {:.1}ms", elapsed_ms)
}

/// `"FPS: {value}"` with two decimal places.
pub fn fps_line(fps: f64) -> String {
    format!("FPS: {:.2}", fps)
}
