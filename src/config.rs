use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};

/// Largest accepted template or search half size.
pub const MAX_HALF_SIZE: u32 = 1024;

/// Tracker parameters. Fixed for the lifetime of a [`crate::tracker::Tracker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Template patch side is `2 * template_half_size + 1`.
    pub template_half_size: u32,
    /// Search window side is `2 * search_half_size + 1`.
    pub search_half_size: u32,
    /// A match is kept only when its score is strictly above this.
    pub similarity_threshold: f32,
    /// Below this many surviving matches the frame counts as lost.
    pub min_correspondences: usize,
    /// Perspective divides with `|w|` below this are rejected.
    pub projection_epsilon: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            template_half_size: 6,
            search_half_size: 6,
            similarity_threshold: 0.9,
            min_correspondences: 4,
            projection_epsilon: 1e-6,
        }
    }
}

impl TrackerConfig {
    /// Checks values that would break kernel construction or make every frame
    /// lost. Called once by [`crate::tracker::Tracker::new`].
    pub fn validate(&self) -> TrackerResult<()> {
        if self.template_half_size > MAX_HALF_SIZE {
            return Err(TrackerError::InvalidConfig("template_half_size too large"));
        }
        if self.search_half_size > MAX_HALF_SIZE {
            return Err(TrackerError::InvalidConfig("search_half_size too large"));
        }
        if !self.similarity_threshold.is_finite() {
            return Err(TrackerError::InvalidConfig("similarity_threshold must be finite"));
        }
        if !(self.projection_epsilon.is_finite() && self.projection_epsilon >= 0.0) {
            return Err(TrackerError::InvalidConfig(
                "projection_epsilon must be finite and non-negative",
            ));
        }
        Ok(())
    }

    pub fn search_size(&self) -> usize {
        2 * self.search_half_size as usize + 1
    }

    pub fn search_cells(&self) -> usize {
        self.search_size() * self.search_size()
    }
}
