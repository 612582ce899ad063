//! Data-parallel compute kernels.
//!
//! Each tracking stage is a [`Kernel`]: built once for a fixed output shape,
//! then dispatched every frame. A dispatch runs one independent lane per output
//! slot on the rayon pool and returns only after every lane has finished, so
//! the next stage always sees a complete buffer.

use std::fmt;

/// Stages of one tracking call, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Luminance,
    Project,
    Sample,
    Correlate,
    Select,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Luminance,
        Stage::Project,
        Stage::Sample,
        Stage::Correlate,
        Stage::Select,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Luminance => "luminance",
            Stage::Project => "project",
            Stage::Sample => "sample",
            Stage::Correlate => "correlate",
            Stage::Select => "select",
        };
        f.write_str(name)
    }
}

/// Everything that fixes the buffer shapes of the per-feature stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineShape {
    pub feature_count: usize,
    pub frame_width: u32,
    pub frame_height: u32,
    pub template_half_size: u32,
    pub search_half_size: u32,
}

pub trait Kernel: Send + Sync {
    type Args<'a>;
    type Output;

    const STAGE: Stage;

    /// Number of independent lanes, one per output slot.
    fn lanes(&self) -> usize;

    fn dispatch(&self, args: Self::Args<'_>) -> Self::Output;
}
