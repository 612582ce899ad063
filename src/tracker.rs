use std::time::Instant;

use nalgebra as na;
use serde::Serialize;

use crate::config::TrackerConfig;
use crate::correlation::CorrelateArgs;
use crate::correspondence::Correspondence;
use crate::error::{TrackerError, TrackerResult};
use crate::kernel::{Kernel, Stage};
use crate::luminance::VideoFrame;
use crate::pipeline::PipelineCache;
use crate::projector::ProjectArgs;
use crate::selector::{SelectArgs, assemble_correspondences};
use crate::target::Target;
use crate::template::SampleArgs;
use crate::types::{BestMatch, build_model_view_projection};

/// Wall time spent in each stage of one frame, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StageTiming {
    pub luminance_ms: f64,
    pub project_ms: f64,
    pub sample_ms: f64,
    pub correlate_ms: f64,
    pub select_ms: f64,
}

impl StageTiming {
    fn record(&mut self, stage: Stage, start: Instant) {
        let ms = start.elapsed().as_secs_f64() * 1000.0;
        log::trace!("{stage}: {ms:.3} ms");
        match stage {
            Stage::Luminance => self.luminance_ms = ms,
            Stage::Project => self.project_ms = ms,
            Stage::Sample => self.sample_ms = ms,
            Stage::Correlate => self.correlate_ms = ms,
            Stage::Select => self.select_ms = ms,
        }
    }

    pub fn total_ms(&self) -> f64 {
        self.luminance_ms + self.project_ms + self.sample_ms + self.correlate_ms + self.select_ms
    }
}

/// Everything one tracking call produced.
#[derive(Debug, Clone)]
pub struct TrackingResult {
    /// `None` when fewer than the minimum number of matches survived.
    pub correspondences: Option<Vec<Correspondence>>,
    /// Best match per feature, before thresholding.
    pub matches: Vec<Option<BestMatch>>,
    pub timing: StageTiming,
}

/// Re-locates the reference features of registered targets in new frames.
pub struct Tracker {
    config: TrackerConfig,
    projection: na::Matrix3<f64>,
    frame_width: u32,
    frame_height: u32,
    targets: Vec<Target>,
    pipelines: PipelineCache,
}

impl Tracker {
    /// Fails with [`TrackerError::InvalidConfig`] for out-of-range parameters.
    pub fn new(
        targets: Vec<Target>,
        projection: na::Matrix3<f64>,
        frame_width: u32,
        frame_height: u32,
        config: TrackerConfig,
    ) -> TrackerResult<Tracker> {
        config.validate()?;
        let feature_counts: Vec<_> = targets.iter().map(Target::feature_count).collect();
        let pipelines = PipelineCache::new(frame_width, frame_height, &feature_counts, &config);
        log::debug!(
            "tracker: {} targets, {} pipeline shapes, input {}x{}",
            targets.len(),
            pipelines.slot_count(),
            frame_width,
            frame_height
        );
        Ok(Tracker {
            config,
            projection,
            frame_width,
            frame_height,
            targets,
            pipelines,
        })
    }

    pub fn pipelines(&self) -> &PipelineCache {
        &self.pipelines
    }

    /// Tracks one target in `frame` starting from the last known pose.
    ///
    /// `Ok(None)` means the track was lost for this frame.
    pub fn track(
        &self,
        frame: &VideoFrame,
        model_view: &na::Matrix3x4<f64>,
        target_idx: usize,
    ) -> TrackerResult<Option<Vec<Correspondence>>> {
        self.track_detailed(frame, model_view, target_idx)
            .map(|r| r.correspondences)
    }

    pub fn track_detailed(
        &self,
        frame: &VideoFrame,
        model_view: &na::Matrix3x4<f64>,
        target_idx: usize,
    ) -> TrackerResult<TrackingResult> {
        let target = self
            .targets
            .get(target_idx)
            .ok_or(TrackerError::TargetIndexOutOfRange {
                index: target_idx,
                len: self.targets.len(),
            })?;
        if (frame.width(), frame.height()) != (self.frame_width, self.frame_height) {
            return Err(TrackerError::FrameSizeMismatch {
                expected: (self.frame_width, self.frame_height),
                actual: (frame.width(), frame.height()),
            });
        }

        let mut timing = StageTiming::default();

        let now = Instant::now();
        let luma = self.pipelines.luminance().dispatch(frame);
        timing.record(Stage::Luminance, now);

        let mvp = build_model_view_projection(&self.projection, model_view);

        let now = Instant::now();
        let search_points = self.pipelines.project(target_idx).dispatch(ProjectArgs {
            features: target.features(),
            mvp: &mvp,
        });
        timing.record(Stage::Project, now);

        let now = Instant::now();
        let templates = self.pipelines.sample(target_idx).dispatch(SampleArgs {
            target,
            search_points: &search_points,
            mvp: &mvp,
        });
        timing.record(Stage::Sample, now);

        let now = Instant::now();
        let similarities = self.pipelines.correlate(target_idx).dispatch(CorrelateArgs {
            luma: &luma,
            search_points: &search_points,
            templates: &templates,
        });
        timing.record(Stage::Correlate, now);

        let now = Instant::now();
        let matches = self.pipelines.select(target_idx).dispatch(SelectArgs {
            search_points: &search_points,
            similarities: &similarities,
        });
        timing.record(Stage::Select, now);

        let correspondences = assemble_correspondences(
            &matches,
            target.features(),
            self.config.similarity_threshold,
            self.config.min_correspondences,
        );
        log::trace!(
            "target {}: {} correspondences in {:.3} ms",
            target_idx,
            correspondences.as_ref().map_or(0, Vec::len),
            timing.total_ms()
        );
        Ok(TrackingResult {
            correspondences,
            matches,
            timing,
        })
    }
}
