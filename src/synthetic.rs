//! Deterministic test scenes: random textures, shifted copies and frames built
//! from grey intensities.

use nalgebra as na;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::error::TrackerResult;
use crate::luminance::VideoFrame;
use crate::target::{FeatureCoord, FeatureSet, Target, TargetImage};

/// Uniform noise texture, reproducible from `seed`.
pub fn random_texture(width: u32, height: u32, seed: u64) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..width as usize * height as usize)
        .map(|_| rng.random_range(0..=255u8))
        .collect()
}

/// Copy of `pixels` moved by `(dx, dy)`; uncovered pixels take `fill`.
pub fn translate(pixels: &[u8], width: u32, height: u32, dx: i32, dy: i32, fill: u8) -> Vec<u8> {
    let (w, h) = (width as i32, height as i32);
    (0..h)
        .flat_map(|y| (0..w).map(move |x| (x - dx, y - dy)))
        .map(|(sx, sy)| {
            if sx < 0 || sx >= w || sy < 0 || sy >= h {
                fill
            } else {
                pixels[(sy * w + sx) as usize]
            }
        })
        .collect()
}

/// Grey RGB frame whose luminance reproduces `pixels` (top row first).
pub fn frame_from_intensity(pixels: &[u8], width: u32, height: u32) -> TrackerResult<VideoFrame> {
    let w = width as usize;
    let data = pixels
        .chunks(w.max(1))
        .rev()
        .flat_map(|row| row.iter())
        .flat_map(|&v| {
            let c = v as f32 / 255.0;
            [c, c, c]
        })
        .collect();
    VideoFrame::from_vec(width, height, 3, data)
}

/// Frame of one flat colour.
pub fn uniform_frame(width: u32, height: u32, rgb: [f32; 3]) -> TrackerResult<VideoFrame> {
    let data = (0..width as usize * height as usize).flat_map(|_| rgb).collect();
    VideoFrame::from_vec(width, height, 3, data)
}

/// Model-view that, under an identity projection, maps marker point
/// `(mx, my)` onto pixel `(mx * dpi, height - my * dpi)`, i.e. the reference
/// image appears 1:1 and upright on screen.
pub fn fronto_parallel_model_view(image_height: f64, dpi: f64) -> na::Matrix3x4<f64> {
    na::Matrix3x4::new(
        dpi, 0.0, 0.0, 0.0, //
        0.0, -dpi, 0.0, image_height, //
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Single-level target over `pixels` with features at the given pixel
/// positions (top-down rows, converted to marker units).
pub fn single_level_target(
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    dpi: f32,
    feature_pixels: &[(f32, f32)],
) -> TrackerResult<Target> {
    let coords = feature_pixels
        .iter()
        .map(|&(x, y)| FeatureCoord {
            mx: x / dpi,
            my: (height as f32 - y) / dpi,
        })
        .collect();
    let image = TargetImage {
        width,
        height,
        dpi,
        pixels,
    };
    Target::from_levels(&[FeatureSet { coords }], &[image])
}
