use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureCoord {
    pub mx: f32,
    pub my: f32,
}

/// Feature coordinates belonging to one pyramid level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub coords: Vec<FeatureCoord>,
}

/// One pyramid level raster: 8-bit grey, row-major, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetImage {
    pub width: u32,
    pub height: u32,
    pub dpi: f32,
    pub pixels: Vec<u8>,
}

impl TargetImage {
    pub fn from_luma(img: &image::GrayImage, dpi: f32) -> TargetImage {
        TargetImage {
            width: img.width(),
            height: img.height(),
            dpi,
            pixels: img.as_raw().clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelInfo {
    pub width: u32,
    pub height: u32,
    pub dpi: f64,
    pub pixel_offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerFeature {
    pub marker: Vec2,
    pub level: usize,
}

/// Immutable reference data of one tracked image.
///
/// All pyramid levels share one pixel buffer; `levels[l].pixel_offset` points
/// at the first pixel of level `l`. Feature order is fixed at construction and
/// every per-feature buffer of a frame follows it.
#[derive(Debug, Clone)]
pub struct Target {
    levels: Vec<LevelInfo>,
    pixels: Vec<u8>,
    features: Vec<MarkerFeature>,
}

impl Target {
    pub fn from_levels(
        feature_sets: &[FeatureSet],
        images: &[TargetImage],
    ) -> TrackerResult<Target> {
        if feature_sets.len() != images.len() {
            return Err(TrackerError::LevelMismatch {
                feature_sets: feature_sets.len(),
                images: images.len(),
            });
        }

        let mut levels = Vec::with_capacity(images.len());
        let mut total_pixels = 0;
        for (level, img) in images.iter().enumerate() {
            let expected = img.width as usize * img.height as usize;
            if img.pixels.len() != expected {
                return Err(TrackerError::PixelBufferSize {
                    level,
                    expected,
                    actual: img.pixels.len(),
                });
            }
            if !(img.dpi.is_finite() && img.dpi > 0.0) {
                return Err(TrackerError::InvalidDpi { level });
            }
            levels.push(LevelInfo {
                width: img.width,
                height: img.height,
                dpi: img.dpi as f64,
                pixel_offset: total_pixels,
            });
            total_pixels += expected;
        }

        let mut pixels = Vec::with_capacity(total_pixels);
        for img in images {
            pixels.extend_from_slice(&img.pixels);
        }

        let features: Vec<_> = feature_sets
            .iter()
            .enumerate()
            .flat_map(|(level, set)| {
                set.coords.iter().map(move |c| MarkerFeature {
                    marker: Vec2::new(c.mx, c.my),
                    level,
                })
            })
            .collect();

        if levels.is_empty() || features.is_empty() {
            return Err(TrackerError::EmptyTarget);
        }
        log::debug!(
            "target: {} levels, {} pixels, {} features",
            levels.len(),
            pixels.len(),
            features.len()
        );
        Ok(Target {
            levels,
            pixels,
            features,
        })
    }

    pub fn levels(&self) -> &[LevelInfo] {
        &self.levels
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn features(&self) -> &[MarkerFeature] {
        &self.features
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Pixel of `level` at column `ix`, row `iy`; `None` outside the level.
    #[inline]
    pub fn sample(&self, level: usize, ix: i64, iy: i64) -> Option<u8> {
        let info = &self.levels[level];
        if ix < 0 || ix >= info.width as i64 || iy < 0 || iy >= info.height as i64 {
            return None;
        }
        Some(self.pixels[info.pixel_offset + iy as usize * info.width as usize + ix as usize])
    }
}
