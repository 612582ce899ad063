use glam::{IVec2, Vec3};
use rayon::prelude::*;

use crate::correspondence::Correspondence;
use crate::kernel::{Kernel, Stage};
use crate::target::MarkerFeature;
use crate::types::{BestMatch, SearchPoint, Similarities};

/// Scores at or below this never win.
pub const SCORE_FLOOR: f32 = -1.0;

pub struct SelectKernel {
    feature_count: usize,
    search_half_size: u32,
}

impl SelectKernel {
    pub fn new(feature_count: usize, search_half_size: u32) -> Self {
        Self {
            feature_count,
            search_half_size,
        }
    }
}

pub struct SelectArgs<'a> {
    pub search_points: &'a [SearchPoint],
    pub similarities: &'a Similarities,
}

impl Kernel for SelectKernel {
    type Args<'a> = SelectArgs<'a>;
    type Output = Vec<Option<BestMatch>>;

    const STAGE: Stage = Stage::Select;

    fn lanes(&self) -> usize {
        self.feature_count
    }

    fn dispatch(&self, args: Self::Args<'_>) -> Self::Output {
        debug_assert_eq!(args.search_points.len(), self.feature_count);
        args.search_points
            .par_iter()
            .enumerate()
            .map(|(f, sp)| pick_best(*sp, args.similarities.feature(f), self.search_half_size))
            .collect()
    }
}

/// Arg-max of one feature's surface. Ties go to the first cell in scan order
/// (lowest `dy`, then lowest `dx`).
pub fn pick_best(
    search_point: SearchPoint,
    surface: &[Option<f32>],
    search_half_size: u32,
) -> Option<BestMatch> {
    let sp = search_point?;
    let size = 2 * search_half_size as usize + 1;

    let mut max = SCORE_FLOOR;
    let mut max_idx = None;
    for (idx, score) in surface.iter().enumerate() {
        if let Some(s) = *score {
            if s > max {
                max = s;
                max_idx = Some(idx);
            }
        }
    }
    let idx = max_idx?;
    let half = search_half_size as i32;
    let offset = IVec2::new((idx % size) as i32 - half, (idx / size) as i32 - half);
    Some(BestMatch {
        position: sp.saturating_add(offset),
        score: max,
    })
}

/// Turns best matches into correspondences.
///
/// Only matches scoring strictly above `threshold` survive; with fewer than
/// `min_count` survivors the frame is lost and `None` is returned.
pub fn assemble_correspondences(
    best: &[Option<BestMatch>],
    features: &[MarkerFeature],
    threshold: f32,
    min_count: usize,
) -> Option<Vec<Correspondence>> {
    let selected: Vec<_> = best
        .iter()
        .zip(features)
        .filter_map(|(b, f)| {
            let b = b.as_ref()?;
            (b.score > threshold).then(|| Correspondence {
                p2d: b.position.as_vec2(),
                p3d: Vec3::new(f.marker.x, f.marker.y, 0.0),
                similarity: b.score,
            })
        })
        .collect();
    if selected.len() < min_count {
        log::debug!(
            "lost track: {} of {} matches above {}",
            selected.len(),
            best.len(),
            threshold
        );
        return None;
    }
    Some(selected)
}
