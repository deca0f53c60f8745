//! Adaptive color selector: brightness sampling and the 128 split.

mod common;

use common::uniform_frame;
use defectview::color::{
    DARK_COLOR, LIGHT_COLOR, adaptive_color, strip_brightness,
};
use defectview::geometry::resolve;

#[test]
fn test_brightness_is_mean_of_channel_means() -> anyhow::Result<()> {
    let frame = uniform_frame(200, 200, [30, 60, 90]);
    let geom = resolve(100.0, 100.0, 40.0, 20.0);
    let brightness = strip_brightness(&frame, &geom).unwrap();
    assert!((brightness - 60.0).abs() < 1e-3);
    Ok(())
}

#[test]
fn test_split_is_inclusive_on_the_dark_side() {
    let geom = resolve(100.0, 100.0, 40.0, 20.0);

    // 127 is still a dark background: pick the light color.
    let frame = uniform_frame(200, 200, [127, 127, 127]);
    assert_eq!(adaptive_color(&frame, &geom), LIGHT_COLOR);

    // 128 counts as light: pick the dark color.
    let frame = uniform_frame(200, 200, [128, 128, 128]);
    assert_eq!(adaptive_color(&frame, &geom), DARK_COLOR);
}

#[test]
fn test_channel_means_averaged_before_split() {
    let geom = resolve(100.0, 100.0, 40.0, 20.0);

    // (255 + 129 + 0) / 3 = 128: dark side of the split.
    let frame = uniform_frame(200, 200, [255, 129, 0]);
    assert_eq!(adaptive_color(&frame, &geom), DARK_COLOR);

    // (255 + 126 + 0) / 3 = 127: light side.
    let frame = uniform_frame(200, 200, [255, 126, 0]);
    assert_eq!(adaptive_color(&frame, &geom), LIGHT_COLOR);
}

#[test]
fn test_sample_strip_sits_above_the_box() {
    // Bright band in rows 70..90 (the strip for a box with y0 = 90), dark
    // everywhere else. The selector must react to the band alone.
    let frame = image::ImageBuffer::from_fn(200, 200, |_, y| {
        if (70..90).contains(&y) {
            image::Rgb([200, 200, 200])
        } else {
            image::Rgb([10, 10, 10])
        }
    });
    let geom = resolve(100.0, 100.0, 40.0, 20.0);
    assert_eq!(adaptive_color(&frame, &geom), DARK_COLOR);
}

#[test]
fn test_empty_sample_region_defaults_to_light() {
    // Box flush with the top-left corner: the strip above it is empty.
    let frame = uniform_frame(200, 200, [255, 255, 255]);
    let geom = resolve(20.0, 10.0, 40.0, 20.0);
    assert_eq!(geom.y0, 0);
    assert_eq!(strip_brightness(&frame, &geom), None);
    assert_eq!(adaptive_color(&frame, &geom), LIGHT_COLOR);
}

#[test]
fn test_sampling_clamps_to_frame_bounds() {
    // Box partially past the right edge; sampling must clamp, not panic.
    let frame = uniform_frame(100, 100, [200, 200, 200]);
    let geom = resolve(95.0, 50.0, 40.0, 20.0);
    assert!(geom.x1 > 100);
    let brightness = strip_brightness(&frame, &geom).unwrap();
    assert!((brightness - 200.0).abs() < 1e-3);
}
