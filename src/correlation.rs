use glam::IVec2;
use rayon::prelude::*;

use crate::kernel::{Kernel, Stage};
use crate::luminance::LumaFrame;
use crate::types::{FeatureBuffer, SearchPoint, Similarities, Templates};

/// Normalised cross-correlation of each feature's template against every
/// offset of its search window.
pub struct CorrelationKernel {
    feature_count: usize,
    template_half_size: u32,
    /// Window cell `k` is centred at `offsets[k]` from the search point.
    offsets: Vec<IVec2>,
}

impl CorrelationKernel {
    pub fn new(feature_count: usize, template_half_size: u32, search_half_size: u32) -> Self {
        let half = search_half_size as i32;
        let size = 2 * half + 1;
        let offsets = (0..size)
            .flat_map(|dy| (0..size).map(move |dx| IVec2::new(dx - half, dy - half)))
            .collect();
        Self {
            feature_count,
            template_half_size,
            offsets,
        }
    }

    pub fn cells(&self) -> usize {
        self.offsets.len()
    }
}

pub struct CorrelateArgs<'a> {
    pub luma: &'a LumaFrame,
    pub search_points: &'a [SearchPoint],
    pub templates: &'a Templates,
}

impl Kernel for CorrelationKernel {
    type Args<'a> = CorrelateArgs<'a>;
    type Output = Similarities;

    const STAGE: Stage = Stage::Correlate;

    fn lanes(&self) -> usize {
        self.feature_count * self.cells()
    }

    fn dispatch(&self, args: Self::Args<'_>) -> Self::Output {
        debug_assert_eq!(args.templates.feature_count(), self.feature_count);
        let cells = self.cells();
        let data = (0..self.lanes())
            .into_par_iter()
            .map(|lane| {
                let f = lane / cells;
                let center = args.search_points[f]?.saturating_add(self.offsets[lane % cells]);
                score_at(
                    args.luma,
                    args.templates.feature(f),
                    self.template_half_size,
                    center.x as i64,
                    center.y as i64,
                )
            })
            .collect();
        FeatureBuffer::from_vec(cells, data)
    }
}

/// NCC of `template` against the frame patch centred at `(px, py)`.
///
/// `n` counts every valid template cell, while the frame-side sums only see
/// cells whose frame pixel is inside the image. Near the border this skews the
/// normalisation; the 0.9 acceptance threshold was tuned with this behaviour,
/// so it is kept as is.
pub fn score_at(
    luma: &LumaFrame,
    template: &[Option<f32>],
    template_half_size: u32,
    px: i64,
    py: i64,
) -> Option<f32> {
    if !luma.contains(px, py) {
        return None;
    }
    let half = template_half_size as i64;
    let size = 2 * half + 1;
    debug_assert_eq!(template.len() as i64, size * size);

    let mut sum_point = 0.0f64;
    let mut sum_point_sq = 0.0f64;
    let mut sum_template = 0.0f64;
    let mut sum_template_sq = 0.0f64;
    let mut sum_point_template = 0.0f64;
    let mut valid_count = 0usize;

    for j in 0..size {
        for i in 0..size {
            let Some(t) = template[(j * size + i) as usize] else {
                continue;
            };
            let t = t as f64;
            sum_template += t;
            sum_template_sq += t * t;
            valid_count += 1;

            if let Some(v) = luma.get(px - half + i, py - half + j) {
                let v = v as f64;
                sum_point += v;
                sum_point_sq += v * v;
                sum_point_template += v * t;
            }
        }
    }
    if valid_count == 0 {
        return None;
    }
    let n = valid_count as f64;
    sum_point_template -= sum_point * sum_template / n;

    let point_var = (sum_point_sq - sum_point * sum_point / n).sqrt();
    if point_var == 0.0 {
        return None;
    }
    let template_var = (sum_template_sq - sum_template * sum_template / n).sqrt();
    if template_var == 0.0 {
        return None;
    }
    let score = (sum_point_template / template_var / point_var) as f32;
    // sqrt of a negative rounding residue
    score.is_finite().then_some(score)
}

pub fn compute_similarities(
    luma: &LumaFrame,
    search_points: &[SearchPoint],
    templates: &Templates,
    template_half_size: u32,
    search_half_size: u32,
) -> Similarities {
    CorrelationKernel::new(search_points.len(), template_half_size, search_half_size).dispatch(
        CorrelateArgs {
            luma,
            search_points,
            templates,
        },
    )
}
