use image::DynamicImage;
use rayon::prelude::*;

use crate::error::{TrackerError, TrackerResult};
use crate::kernel::{Kernel, Stage};

const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

/// Video frame with RGB or RGBA samples normalised to `[0, 1]`.
///
/// Rows are stored bottom-up (texture order): row 0 is the bottom of the
/// picture.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<f32>,
}

impl VideoFrame {
    pub fn from_vec(
        width: u32,
        height: u32,
        channels: usize,
        data: Vec<f32>,
    ) -> TrackerResult<Self> {
        if channels != 3 && channels != 4 {
            return Err(TrackerError::UnsupportedChannels(channels));
        }
        let expected = width as usize * height as usize * channels;
        if data.len() != expected {
            return Err(TrackerError::FrameBufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Converts a decoded top-down image into a bottom-up RGB frame.
    pub fn from_image(img: &DynamicImage) -> Self {
        let rgb = image::imageops::flip_vertical(&img.to_rgb32f());
        Self {
            width: rgb.width(),
            height: rgb.height(),
            channels: 3,
            data: rgb.into_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    fn rgb(&self, col: usize, row: usize) -> (f32, f32, f32) {
        let idx = (row * self.width as usize + col) * self.channels;
        (self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }
}

/// Single-channel intensity image in `[0, 255]`, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct LumaFrame {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl LumaFrame {
    pub fn from_vec(width: u32, height: u32, data: Vec<f32>) -> TrackerResult<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(TrackerError::FrameBufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && x < self.width as i64 && y >= 0 && y < self.height as i64
    }

    /// Intensity at column `x`, row `y`; `None` outside the frame.
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Option<f32> {
        if !self.contains(x, y) {
            return None;
        }
        Some(self.data[y as usize * self.width as usize + x as usize])
    }
}

#[inline]
pub fn luminance_of(r: f32, g: f32, b: f32) -> f32 {
    255.0 * (LUMA_R * r + LUMA_G * g + LUMA_B * b)
}

/// Grey conversion for frames of one fixed size.
pub struct LuminanceKernel {
    width: u32,
    height: u32,
}

impl LuminanceKernel {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Kernel for LuminanceKernel {
    type Args<'a> = &'a VideoFrame;
    type Output = LumaFrame;

    const STAGE: Stage = Stage::Luminance;

    fn lanes(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn dispatch(&self, frame: Self::Args<'_>) -> Self::Output {
        debug_assert_eq!((frame.width, frame.height), (self.width, self.height));
        let w = self.width as usize;
        let h = self.height as usize;
        let data = (0..self.lanes())
            .into_par_iter()
            .map(|i| {
                let (r, g, b) = frame.rgb(i % w, h - 1 - i / w);
                luminance_of(r, g, b)
            })
            .collect();
        LumaFrame {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// One-off conversion without a cached kernel.
pub fn luminance(frame: &VideoFrame) -> LumaFrame {
    LuminanceKernel::new(frame.width, frame.height).dispatch(frame)
}
