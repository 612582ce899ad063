//! Lazily built, reused kernels for every stage of a tracking call.
//!
//! The stage table is laid out once when the tracker is created: one slot per
//! distinct [`PipelineShape`], each holding one kernel per [`Stage`]. Targets
//! with the same feature count share a slot. Kernels are constructed on their
//! first dispatch and reused verbatim afterwards.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::config::TrackerConfig;
use crate::correlation::CorrelationKernel;
use crate::kernel::{Kernel, PipelineShape};
use crate::luminance::LuminanceKernel;
use crate::projector::ProjectKernel;
use crate::selector::SelectKernel;
use crate::template::TemplateKernel;

struct StageSlot {
    shape: PipelineShape,
    project: OnceLock<ProjectKernel>,
    sample: OnceLock<TemplateKernel>,
    correlate: OnceLock<CorrelationKernel>,
    select: OnceLock<SelectKernel>,
}

impl StageSlot {
    fn new(shape: PipelineShape) -> Self {
        Self {
            shape,
            project: OnceLock::new(),
            sample: OnceLock::new(),
            correlate: OnceLock::new(),
            select: OnceLock::new(),
        }
    }

    fn built(&self) -> usize {
        [
            self.project.get().is_some(),
            self.sample.get().is_some(),
            self.correlate.get().is_some(),
            self.select.get().is_some(),
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }
}

pub struct PipelineCache {
    frame_width: u32,
    frame_height: u32,
    projection_epsilon: f64,
    luminance: OnceLock<LuminanceKernel>,
    slots: Vec<StageSlot>,
    target_slot: Vec<usize>,
}

fn get_or_build<'a, K: Kernel>(
    cell: &'a OnceLock<K>,
    shape: &PipelineShape,
    build: impl FnOnce() -> K,
) -> &'a K {
    cell.get_or_init(|| {
        let kernel = build();
        log::debug!("built {} kernel, {} lanes, {:?}", K::STAGE, kernel.lanes(), shape);
        kernel
    })
}

impl PipelineCache {
    /// Lays out the stage table for targets with the given feature counts.
    pub fn new(
        frame_width: u32,
        frame_height: u32,
        feature_counts: &[usize],
        config: &TrackerConfig,
    ) -> Self {
        let mut slot_of_shape: HashMap<PipelineShape, usize> = HashMap::new();
        let mut slots = Vec::new();
        let target_slot = feature_counts
            .iter()
            .map(|&feature_count| {
                let shape = PipelineShape {
                    feature_count,
                    frame_width,
                    frame_height,
                    template_half_size: config.template_half_size,
                    search_half_size: config.search_half_size,
                };
                *slot_of_shape.entry(shape).or_insert_with(|| {
                    slots.push(StageSlot::new(shape));
                    slots.len() - 1
                })
            })
            .collect();
        Self {
            frame_width,
            frame_height,
            projection_epsilon: config.projection_epsilon,
            luminance: OnceLock::new(),
            slots,
            target_slot,
        }
    }

    fn slot(&self, target_idx: usize) -> &StageSlot {
        &self.slots[self.target_slot[target_idx]]
    }

    pub fn shape(&self, target_idx: usize) -> PipelineShape {
        self.slot(target_idx).shape
    }

    pub fn luminance(&self) -> &LuminanceKernel {
        self.luminance.get_or_init(|| {
            let kernel = LuminanceKernel::new(self.frame_width, self.frame_height);
            log::debug!(
                "built luminance kernel, {} lanes, {}x{}",
                kernel.lanes(),
                self.frame_width,
                self.frame_height
            );
            kernel
        })
    }

    pub fn project(&self, target_idx: usize) -> &ProjectKernel {
        let slot = self.slot(target_idx);
        get_or_build(&slot.project, &slot.shape, || {
            ProjectKernel::new(slot.shape.feature_count, self.projection_epsilon)
        })
    }

    pub fn sample(&self, target_idx: usize) -> &TemplateKernel {
        let slot = self.slot(target_idx);
        get_or_build(&slot.sample, &slot.shape, || {
            TemplateKernel::new(slot.shape.feature_count, slot.shape.template_half_size)
        })
    }

    pub fn correlate(&self, target_idx: usize) -> &CorrelationKernel {
        let slot = self.slot(target_idx);
        get_or_build(&slot.correlate, &slot.shape, || {
            CorrelationKernel::new(
                slot.shape.feature_count,
                slot.shape.template_half_size,
                slot.shape.search_half_size,
            )
        })
    }

    pub fn select(&self, target_idx: usize) -> &SelectKernel {
        let slot = self.slot(target_idx);
        get_or_build(&slot.select, &slot.shape, || {
            SelectKernel::new(slot.shape.feature_count, slot.shape.search_half_size)
        })
    }

    /// Number of distinct per-feature pipeline shapes.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of kernels constructed so far, luminance included.
    pub fn built_kernels(&self) -> usize {
        let luminance = usize::from(self.luminance.get().is_some());
        luminance + self.slots.iter().map(StageSlot::built).sum::<usize>()
    }
}
