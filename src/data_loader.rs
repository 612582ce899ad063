use std::path::{Path, PathBuf};

use glob::glob;
use image::ImageReader;
use indicatif::ParallelProgressIterator;
use nalgebra as na;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::TrackerResult;
use crate::io::object_from_json;
use crate::luminance::VideoFrame;
use crate::target::{FeatureCoord, FeatureSet, Target, TargetImage};

/// One pyramid level of a target description file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDescription {
    /// Image path, relative to the description file.
    pub image: String,
    pub dpi: f32,
    pub features: Vec<FeatureCoord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDescription {
    pub levels: Vec<LevelDescription>,
}

/// Camera projection and starting pose, both row-major.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraDescription {
    pub projection: [[f64; 3]; 3],
    pub model_view: [[f64; 4]; 3],
}

impl CameraDescription {
    pub fn projection_matrix(&self) -> na::Matrix3<f64> {
        na::Matrix3::from_fn(|r, c| self.projection[r][c])
    }

    pub fn model_view_matrix(&self) -> na::Matrix3x4<f64> {
        na::Matrix3x4::from_fn(|r, c| self.model_view[r][c])
    }
}

pub struct TimedFrame {
    pub time_ns: i64,
    pub frame: VideoFrame,
}

/// Loads a target description and decodes its level images to grey.
pub fn load_target(description_path: &str) -> TrackerResult<Target> {
    let description: TargetDescription = object_from_json(description_path)?;
    let base = Path::new(description_path)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let images = description
        .levels
        .iter()
        .map(|level| -> TrackerResult<TargetImage> {
            let img = ImageReader::open(base.join(&level.image))?.decode()?;
            Ok(TargetImage::from_luma(&img.to_luma8(), level.dpi))
        })
        .collect::<TrackerResult<Vec<_>>>()?;
    let feature_sets: Vec<_> = description
        .levels
        .iter()
        .map(|level| FeatureSet {
            coords: level.features.clone(),
        })
        .collect();
    Target::from_levels(&feature_sets, &images)
}

/// Parses the timestamp from a file path.
///
/// Assumes the filename (without extension) is a timestamp in nanoseconds.
fn path_to_timestamp(path: &Path) -> Option<i64> {
    path.file_stem()?.to_str()?.parse().ok()
}

fn img_filter(rp: glob::GlobResult) -> Option<PathBuf> {
    if let Ok(p) = rp {
        for ext in &[".png", ".jpg"] {
            if p.as_os_str().to_string_lossy().ends_with(ext) {
                return Some(p);
            }
        }
    }
    None
}

/// Loads the frames of a folder in file name order.
///
/// Images are decoded in parallel. Frames whose file stem is not a nanosecond
/// timestamp are spaced 100 ms apart by index.
///
/// # Arguments
/// * `folder` - Folder holding `.png` / `.jpg` frames.
/// * `start_idx` - Starting image index.
/// * `step` - Step size for sampling images.
pub fn load_frames(folder: &str, start_idx: usize, step: usize) -> TrackerResult<Vec<TimedFrame>> {
    let img_paths = glob(format!("{}/*", folder).as_str())?;
    let mut sorted_path: Vec<PathBuf> = img_paths.into_iter().filter_map(img_filter).collect();
    sorted_path.sort();
    log::trace!("{} frames in {}", sorted_path.len(), folder);

    let new_paths: Vec<_> = sorted_path
        .iter()
        .skip(start_idx)
        .step_by(step.max(1))
        .enumerate()
        .collect();
    let mut frames = new_paths
        .par_iter()
        .progress_count(new_paths.len() as u64)
        .map(|(idx, path)| -> TrackerResult<TimedFrame> {
            let time_ns = path_to_timestamp(path).unwrap_or(*idx as i64 * 100_000_000);
            let img = ImageReader::open(path)?.decode()?;
            Ok(TimedFrame {
                time_ns,
                frame: VideoFrame::from_image(&img),
            })
        })
        .collect::<TrackerResult<Vec<_>>>()?;
    frames.sort_by_key(|f| f.time_ns);
    Ok(frames)
}
