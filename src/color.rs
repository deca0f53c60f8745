use image::{Rgb, RgbImage};

use crate::geometry::BoxGeometry;

/// Height of the brightness-sampling strip above a box, in pixels.
pub const SAMPLE_STRIP_HEIGHT: i32 = 20;

/// Brightness at or above this value counts as a light background.
pub const BRIGHTNESS_SPLIT: f32 = 128.0;

/// Draw color over dark backgrounds.
pub const LIGHT_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

/// Draw color over light backgrounds.
pub const DARK_COLOR: Rgb<u8> = Rgb([100, 100, 0]);

/// Mean brightness of the strip immediately above the box, clamped to the
/// frame on all sides. Per-channel means are computed first and then
/// averaged into one scalar in [0, 255]. Returns `None` when the clamped
/// region is empty (box touching the top or left frame edge).
pub fn strip_brightness(frame: &RgbImage, geom: &BoxGeometry) -> Option<f32> {
    let (w, h) = (frame.width() as i32, frame.height() as i32);
    let y_start = (geom.y0 - SAMPLE_STRIP_HEIGHT).max(0);
    let y_end = geom.y0.min(h);
    let x_start = geom.x0.max(0);
    let x_end = geom.x1.min(w);

    if y_start >= y_end || x_start >= x_end {
        return None;
    }

    let mut sums = [0u64; 3];
    let mut count = 0u64;
    for y in y_start..y_end {
        for x in x_start..x_end {
            let px = frame.get_pixel(x as u32, y as u32);
            sums[0] += px[0] as u64;
            sums[1] += px[1] as u64;
            sums[2] += px[2] as u64;
            count += 1;
        }
    }

    let channel_means = sums.map(|s| s as f32 / count as f32);
    Some(channel_means.iter().sum::<f32>() / 3.0)
}

/// Pick a draw color that contrasts with the background above the box.
///
/// An empty sample region reads as brightness 0, so edge-hugging boxes get
/// the light color deterministically.
pub fn adaptive_color(frame: &RgbImage, geom: &BoxGeometry) -> Rgb<u8> {
    let brightness = strip_brightness(frame, geom).unwrap_or(0.0);
    if brightness < BRIGHTNESS_SPLIT {
        LIGHT_COLOR
    } else {
        DARK_COLOR
    }
}
