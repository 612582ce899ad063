use std::fmt;

/// Contract violations detected at the tracker boundary.
///
/// Numeric degeneracies inside a frame never surface here; they become invalid
/// cells and, at worst, a lost track.
#[derive(Debug)]
pub enum TrackerError {
    TargetIndexOutOfRange { index: usize, len: usize },
    EmptyTarget,
    LevelMismatch { feature_sets: usize, images: usize },
    PixelBufferSize { level: usize, expected: usize, actual: usize },
    InvalidDpi { level: usize },
    FrameSizeMismatch { expected: (u32, u32), actual: (u32, u32) },
    FrameBufferSize { expected: usize, actual: usize },
    UnsupportedChannels(usize),
    InvalidConfig(&'static str),
    Io(std::io::Error),
    Json(serde_json::Error),
    Image(image::ImageError),
    Pattern(glob::PatternError),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetIndexOutOfRange { index, len } => {
                write!(f, "target index {index} out of range, {len} targets registered")
            }
            Self::EmptyTarget => write!(f, "target has no pyramid levels or no feature points"),
            Self::LevelMismatch {
                feature_sets,
                images,
            } => write!(
                f,
                "{feature_sets} feature sets but {images} pyramid images"
            ),
            Self::PixelBufferSize {
                level,
                expected,
                actual,
            } => write!(
                f,
                "level {level}: expected {expected} pixels, got {actual}"
            ),
            Self::InvalidDpi { level } => write!(f, "level {level}: dpi must be positive"),
            Self::FrameSizeMismatch { expected, actual } => write!(
                f,
                "frame size {}x{} does not match tracker input {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
            Self::FrameBufferSize { expected, actual } => {
                write!(f, "frame buffer: expected {expected} samples, got {actual}")
            }
            Self::UnsupportedChannels(c) => write!(f, "unsupported channel count {c}"),
            Self::InvalidConfig(reason) => write!(f, "invalid tracker config: {reason}"),
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Json(e) => write!(f, "json: {e}"),
            Self::Image(e) => write!(f, "image: {e}"),
            Self::Pattern(e) => write!(f, "glob pattern: {e}"),
        }
    }
}

impl std::error::Error for TrackerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Image(e) => Some(e),
            Self::Pattern(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<image::ImageError> for TrackerError {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e)
    }
}

impl From<glob::PatternError> for TrackerError {
    fn from(e: glob::PatternError) -> Self {
        Self::Pattern(e)
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;
