use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::correspondence::Correspondence;
use crate::error::TrackerResult;
use crate::tracker::StageTiming;

/// Serializes an object to a JSON file.
pub fn object_to_json<T: Serialize>(
    output_path: impl AsRef<Path>,
    object: &T,
) -> TrackerResult<()> {
    let j = serde_json::to_string_pretty(object)?;
    std::fs::write(output_path, j)?;
    Ok(())
}

/// Deserializes an object from a JSON file.
pub fn object_from_json<T: DeserializeOwned>(file_path: impl AsRef<Path>) -> TrackerResult<T> {
    let contents = std::fs::read_to_string(file_path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub time_ns: i64,
    pub lost: bool,
    pub correspondences: Vec<Correspondence>,
    pub timing: StageTiming,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackingReport {
    pub created_unix: i64,
    pub target_index: usize,
    pub frames_tracked: usize,
    pub frames_lost: usize,
    pub frames: Vec<FrameReport>,
}

impl TrackingReport {
    pub fn new(target_index: usize, frames: Vec<FrameReport>) -> TrackingReport {
        let created =
            time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc());
        let frames_lost = frames.iter().filter(|f| f.lost).count();
        TrackingReport {
            created_unix: created.unix_timestamp(),
            target_index,
            frames_tracked: frames.len() - frames_lost,
            frames_lost,
            frames,
        }
    }
}

/// Writes a per-frame tracking report as JSON.
pub fn write_report(output_path: impl AsRef<Path>, report: &TrackingReport) -> TrackerResult<()> {
    object_to_json(output_path, report)
}
