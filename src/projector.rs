use glam::IVec2;
use rayon::prelude::*;

use crate::kernel::{Kernel, Stage};
use crate::projection::{marker_to_screen, round_half_up};
use crate::target::MarkerFeature;
use crate::types::{Mvp, SearchPoint};

/// Projects every reference feature into the current frame.
pub struct ProjectKernel {
    feature_count: usize,
    epsilon: f64,
}

impl ProjectKernel {
    pub fn new(feature_count: usize, epsilon: f64) -> Self {
        Self {
            feature_count,
            epsilon,
        }
    }
}

pub struct ProjectArgs<'a> {
    pub features: &'a [MarkerFeature],
    pub mvp: &'a Mvp,
}

impl Kernel for ProjectKernel {
    type Args<'a> = ProjectArgs<'a>;
    type Output = Vec<SearchPoint>;

    const STAGE: Stage = Stage::Project;

    fn lanes(&self) -> usize {
        self.feature_count
    }

    fn dispatch(&self, args: Self::Args<'_>) -> Self::Output {
        debug_assert_eq!(args.features.len(), self.feature_count);
        args.features
            .par_iter()
            .map(|f| search_point(f, args.mvp, self.epsilon))
            .collect()
    }
}

/// Rounded screen position of one feature, `None` for a degenerate divide.
pub fn search_point(feature: &MarkerFeature, mvp: &Mvp, epsilon: f64) -> SearchPoint {
    let p = marker_to_screen(mvp, feature.marker.x as f64, feature.marker.y as f64, epsilon)?;
    Some(IVec2::new(round_half_up(p.x) as i32, round_half_up(p.y) as i32))
}

pub fn compute_search_points(
    features: &[MarkerFeature],
    mvp: &Mvp,
    epsilon: f64,
) -> Vec<SearchPoint> {
    ProjectKernel::new(features.len(), epsilon).dispatch(ProjectArgs { features, mvp })
}
