//! Error kinds for frame scanning
//!
//! Every failure keeps its own variant so logs can tell a camera glitch from a
//! detector fault. The frame analyzer still collapses all of them into a single
//! failure callback; "no code present" is not an error and never appears here.

use thiserror::Error;

/// Errors raised while extracting frames, running engines or loading images
#[derive(Debug, Error)]
pub enum ScanError {
    /// The frame source could not produce a raster image
    #[error("frame extraction failed: {0}")]
    FrameExtraction(String),

    /// The frame source panicked while converting a frame
    #[error("frame extraction panicked")]
    ExtractionPanic,

    /// The detection engine reported an error
    #[error("{engine} detector failed: {message}")]
    Detector {
        /// Engine name (`rqrr`, `quirc`, ...)
        engine: &'static str,
        /// Engine-specific error text
        message: String,
    },

    /// The detection engine panicked while processing an attempt
    #[error("{engine} detector panicked")]
    EnginePanic {
        /// Engine name
        engine: &'static str,
    },

    /// Pixel buffer does not match the declared dimensions
    #[error("invalid image: expected {expected} values for {width}x{height}, got {actual}")]
    InvalidImage {
        /// Declared width
        width: usize,
        /// Declared height
        height: usize,
        /// Number of values required
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },

    /// Images combined into one composite differ in size
    #[error("channel images differ in size: {0:?}")]
    ChannelMismatch(Vec<(usize, usize)>),

    /// Unknown engine name
    #[error("unknown engine '{0}'")]
    UnknownEngine(String),

    /// Image file could not be decoded or encoded
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// Filesystem error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScanError {
    /// Build a detector error from any displayable engine error
    pub fn detector(engine: &'static str, err: impl std::fmt::Display) -> Self {
        ScanError::Detector {
            engine,
            message: err.to_string(),
        }
    }

    /// Short stable name of the error kind, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::FrameExtraction(_) => "frame_extraction",
            ScanError::ExtractionPanic => "extraction_panic",
            ScanError::Detector { .. } => "detector",
            ScanError::EnginePanic { .. } => "engine_panic",
            ScanError::InvalidImage { .. } => "invalid_image",
            ScanError::ChannelMismatch(_) => "channel_mismatch",
            ScanError::UnknownEngine(_) => "unknown_engine",
            ScanError::Image(_) => "image",
            ScanError::Io(_) => "io",
        }
    }
}
