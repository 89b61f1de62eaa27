//! chroma_qr - multi-channel QR code scanning
//!
//! Decodes QR codes from full-color frames and additionally probes each color
//! channel in isolation, so a "color QR code" (three codes stacked in the red,
//! green and blue components of one image) yields all of its payloads.
//!
//! ```no_run
//! use chroma_qr::{FrameAnalyzer, RqrrEngine, ScanOptions};
//! use chroma_qr::analyzer::{DirectSource, FrameOutcome};
//!
//! let analyzer = FrameAnalyzer::with_options(
//!     DirectSource,
//!     RqrrEngine::new(),
//!     ScanOptions::multi_channel(),
//! );
//! let frame = chroma_qr::tools::load_image("frame.png").unwrap();
//! if let FrameOutcome::Success(result, _) = analyzer.analyze_frame(&frame) {
//!     for entry in &result.entries {
//!         println!("{}: {}", entry.label, entry.text);
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Frame analyzer adapter (frame source, listener, per-frame driver)
pub mod analyzer;
/// Scan options and environment-driven tuning
pub mod config;
/// Detection engines (rqrr, quirc, optional OpenCV)
pub mod detector;
/// Error kinds
pub mod error;
/// Core data structures (ArgbImage, ScanResult, CornerGeometry, etc.)
pub mod models;
/// Multi-attempt decode
pub mod pipeline;
/// Image file I/O and dataset helpers
pub mod tools;
/// Pixel utilities (grayscale, channel isolation, composition)
pub mod utils;

pub use analyzer::{AnalyzeListener, FrameAnalyzer, FrameSource};
pub use config::{EmptyChannelPolicy, ScanOptions};
pub use detector::{EngineKind, QrEngine, QuircEngine, RqrrEngine};
pub use error::ScanError;
pub use models::{ArgbImage, ChannelLabel, ChannelSet, ColorChannel, LabeledText, ScanResult};
pub use pipeline::{Scanner, scan_image};
pub use utils::channels::{compose_channels, isolate_channel, split_channels};

/// Scan one image with the default engine
///
/// Convenience wrapper around [`scan_image`] with an [`RqrrEngine`].
pub fn scan(image: &ArgbImage, options: &ScanOptions) -> Result<ScanResult, ScanError> {
    scan_image(&RqrrEngine::new(), image, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_solid_frame_is_empty() {
        let image = ArgbImage::filled(32, 32, models::color::rgb(30, 120, 200));
        let result = scan(&image, &ScanOptions::multi_channel()).unwrap();
        assert!(result.is_empty());
    }
}
