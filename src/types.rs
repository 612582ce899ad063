use glam::IVec2;
use nalgebra as na;

/// Model-view-projection transform, maps marker-plane points to frame pixels.
pub type Mvp = na::Matrix3x4<f64>;

/// Integer screen position of a projected feature, `None` when the perspective
/// divide was degenerate.
pub type SearchPoint = Option<IVec2>;

/// Combines the camera projection with the last model-view pose.
pub fn build_model_view_projection(
    projection: &na::Matrix3<f64>,
    model_view: &na::Matrix3x4<f64>,
) -> Mvp {
    projection * model_view
}

/// Best offset found in one feature's search window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch {
    pub position: IVec2,
    pub score: f32,
}

/// Flat per-feature buffer with a fixed number of cells per feature.
///
/// Feature `f` owns `data[f * stride..(f + 1) * stride]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBuffer<T> {
    stride: usize,
    data: Vec<T>,
}

impl<T> FeatureBuffer<T> {
    pub fn from_vec(stride: usize, data: Vec<T>) -> Self {
        debug_assert!(stride > 0 && data.len() % stride == 0);
        Self { stride, data }
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn feature_count(&self) -> usize {
        self.data.len() / self.stride
    }

    pub fn feature(&self, idx: usize) -> &[T] {
        &self.data[idx * self.stride..(idx + 1) * self.stride]
    }
}

/// Template patches, one `Option` sample per cell, row-major per feature.
pub type Templates = FeatureBuffer<Option<f32>>;

/// NCC scores per search-window offset, row-major per feature.
pub type Similarities = FeatureBuffer<Option<f32>>;
