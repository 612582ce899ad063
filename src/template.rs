use glam::IVec2;
use rayon::prelude::*;

use crate::kernel::{Kernel, Stage};
use crate::projection::{round_half_up, screen_to_marker};
use crate::target::Target;
use crate::types::{FeatureBuffer, Mvp, SearchPoint, Templates};

/// Samples, for every feature, a square screen-space patch around its search
/// point back from the reference pyramid.
pub struct TemplateKernel {
    feature_count: usize,
    /// Cell `k` of a patch sits at `offsets[k]` from the search point.
    offsets: Vec<IVec2>,
}

impl TemplateKernel {
    pub fn new(feature_count: usize, half_size: u32) -> Self {
        let half = half_size as i32;
        let size = 2 * half + 1;
        let offsets = (0..size)
            .flat_map(|j| (0..size).map(move |i| IVec2::new(i - half, j - half)))
            .collect();
        Self {
            feature_count,
            offsets,
        }
    }

    pub fn cells(&self) -> usize {
        self.offsets.len()
    }
}

pub struct SampleArgs<'a> {
    pub target: &'a Target,
    pub search_points: &'a [SearchPoint],
    pub mvp: &'a Mvp,
}

impl Kernel for TemplateKernel {
    type Args<'a> = SampleArgs<'a>;
    type Output = Templates;

    const STAGE: Stage = Stage::Sample;

    fn lanes(&self) -> usize {
        self.feature_count * self.cells()
    }

    fn dispatch(&self, args: Self::Args<'_>) -> Self::Output {
        debug_assert_eq!(args.search_points.len(), self.feature_count);
        let cells = self.cells();
        let features = args.target.features();
        let data = (0..self.lanes())
            .into_par_iter()
            .map(|lane| {
                let f = lane / cells;
                let screen = args.search_points[f]?.saturating_add(self.offsets[lane % cells]);
                sample_cell(args.target, features[f].level, screen, args.mvp)
            })
            .collect();
        FeatureBuffer::from_vec(cells, data)
    }
}

/// Reference intensity seen at screen pixel `screen` if it lies on the marker.
pub fn sample_cell(target: &Target, level: usize, screen: IVec2, mvp: &Mvp) -> Option<f32> {
    let m = screen_to_marker(mvp, screen.x as f64, screen.y as f64);
    let info = &target.levels()[level];
    let ix = round_half_up(m.x * info.dpi);
    let iy = round_half_up(info.height as f64 - m.y * info.dpi);
    // NaN and infinities from a singular solve fall out here
    if !(ix >= 0.0 && ix < info.width as f64 && iy >= 0.0 && iy < info.height as f64) {
        return None;
    }
    target.sample(level, ix as i64, iy as i64).map(f32::from)
}

pub fn build_templates(
    target: &Target,
    search_points: &[SearchPoint],
    mvp: &Mvp,
    half_size: u32,
) -> Templates {
    TemplateKernel::new(search_points.len(), half_size).dispatch(SampleArgs {
        target,
        search_points,
        mvp,
    })
}
