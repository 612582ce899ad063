pub mod config;
pub mod correlation;
pub mod correspondence;
pub mod data_loader;
pub mod error;
pub mod io;
pub mod kernel;
pub mod luminance;
pub mod pipeline;
pub mod projection;
pub mod projector;
pub mod selector;
pub mod synthetic;
pub mod target;
pub mod template;
pub mod tracker;
pub mod types;

pub use config::TrackerConfig;
pub use correspondence::Correspondence;
pub use error::{TrackerError, TrackerResult};
pub use luminance::VideoFrame;
pub use target::Target;
pub use tracker::{Tracker, TrackingResult};
