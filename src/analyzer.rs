//! Per-frame analyzer
//!
//! Glue between a frame delivery mechanism (camera callback, video decoder,
//! test harness) and the multi-attempt decode. Every invocation handles exactly
//! one frame and ends in exactly one listener callback. Errors never leave
//! [`FrameAnalyzer::analyze`].

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::config::ScanOptions;
use crate::detector::QrEngine;
use crate::error::ScanError;
use crate::models::{ArgbImage, ScanResult};
use crate::pipeline::scan_image;

/// Turns a delivered frame handle into a raster image
pub trait FrameSource {
    /// Frame handle type delivered by the camera pipeline
    type Frame: ?Sized;

    /// Extract a full-color image from `frame`
    fn extract(&self, frame: &Self::Frame) -> Result<ArgbImage, ScanError>;
}

/// Frames that already are raster images
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectSource;

impl FrameSource for DirectSource {
    type Frame = ArgbImage;

    fn extract(&self, frame: &ArgbImage) -> Result<ArgbImage, ScanError> {
        Ok(frame.clone())
    }
}

/// Frame source backed by a closure
pub struct FnSource<T: ?Sized, F> {
    extract: F,
    _frame: std::marker::PhantomData<fn(&T)>,
}

impl<T: ?Sized, F> FnSource<T, F>
where
    F: Fn(&T) -> Result<ArgbImage, ScanError>,
{
    /// Wrap `extract`
    pub fn new(extract: F) -> Self {
        Self {
            extract,
            _frame: std::marker::PhantomData,
        }
    }
}

impl<T: ?Sized, F> FrameSource for FnSource<T, F>
where
    F: Fn(&T) -> Result<ArgbImage, ScanError>,
{
    type Frame = T;

    fn extract(&self, frame: &T) -> Result<ArgbImage, ScanError> {
        (self.extract)(frame)
    }
}

/// Receives the outcome of each analyzed frame
pub trait AnalyzeListener {
    /// At least the raw attempt decoded something; `image` is the extracted
    /// source image
    fn on_success(&mut self, result: &ScanResult, image: &ArgbImage);

    /// Nothing decoded, or extraction or detection failed
    fn on_failure(&mut self);
}

/// Outcome of one analyzed frame, for callers that prefer a value over a
/// listener
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Decoded payloads and the source image
    Success(ScanResult, ArgbImage),
    /// No detection
    Failure,
}

impl AnalyzeListener for Vec<FrameOutcome> {
    fn on_success(&mut self, result: &ScanResult, image: &ArgbImage) {
        self.push(FrameOutcome::Success(result.clone(), image.clone()));
    }

    fn on_failure(&mut self) {
        self.push(FrameOutcome::Failure);
    }
}

/// Single-frame analyzer owning its frame source and engine
pub struct FrameAnalyzer<S, E> {
    source: S,
    engine: E,
    options: ScanOptions,
}

impl<S: FrameSource, E: QrEngine> FrameAnalyzer<S, E> {
    /// Analyzer probing the raw frame only
    pub fn new(source: S, engine: E) -> Self {
        Self::with_options(source, engine, ScanOptions::default())
    }

    /// Analyzer with explicit scan options
    pub fn with_options(source: S, engine: E, options: ScanOptions) -> Self {
        Self {
            source,
            engine,
            options,
        }
    }

    /// Scan options in use
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Analyze one frame and report through `listener`
    ///
    /// Calls exactly one of `on_success` or `on_failure`.
    pub fn analyze<L: AnalyzeListener + ?Sized>(&self, frame: &S::Frame, listener: &mut L) {
        match self.try_analyze(frame) {
            Ok(Some((result, image))) => listener.on_success(&result, &image),
            Ok(None) => listener.on_failure(),
            Err(err) => {
                warn!(
                    engine = self.engine.name(),
                    kind = err.kind(),
                    error = %err,
                    "frame analysis failed"
                );
                listener.on_failure();
            }
        }
    }

    /// Analyze one frame and return the outcome as a value
    pub fn analyze_frame(&self, frame: &S::Frame) -> FrameOutcome {
        let mut outcomes = Vec::with_capacity(1);
        self.analyze(frame, &mut outcomes);
        outcomes.pop().unwrap_or(FrameOutcome::Failure)
    }

    fn try_analyze(&self, frame: &S::Frame) -> Result<Option<(ScanResult, ArgbImage)>, ScanError> {
        let image = panic::catch_unwind(AssertUnwindSafe(|| self.source.extract(frame)))
            .map_err(|_| ScanError::ExtractionPanic)??;
        let result = scan_image(&self.engine, &image, &self.options)?;
        if result.is_empty() {
            debug!(
                engine = self.engine.name(),
                width = image.width(),
                height = image.height(),
                "no code in frame"
            );
            return Ok(None);
        }
        debug!(
            engine = self.engine.name(),
            entries = result.len(),
            "frame decoded"
        );
        Ok(Some((result, image)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::FnEngine;
    use crate::models::Detection;

    #[derive(Default)]
    struct Counter {
        success: usize,
        failure: usize,
    }

    impl AnalyzeListener for Counter {
        fn on_success(&mut self, _result: &ScanResult, _image: &ArgbImage) {
            self.success += 1;
        }

        fn on_failure(&mut self) {
            self.failure += 1;
        }
    }

    fn always(text: &'static str) -> impl QrEngine {
        FnEngine::new("always", move |_: &ArgbImage, _: bool| {
            Ok(Detection::new(vec![text.to_string()], None))
        })
    }

    #[test]
    fn test_success_reports_source_image() {
        let analyzer = FrameAnalyzer::new(DirectSource, always("hi"));
        let frame = ArgbImage::filled(2, 2, 0xFF12_3456);
        match analyzer.analyze_frame(&frame) {
            FrameOutcome::Success(result, image) => {
                assert_eq!(result.raw_text(), Some("hi"));
                assert_eq!(image, frame);
            }
            FrameOutcome::Failure => panic!("expected success"),
        }
    }

    #[test]
    fn test_extraction_error_fails_once() {
        let source = FnSource::<[u8], _>::new(|_: &[u8]| -> Result<ArgbImage, ScanError> {
            Err(ScanError::FrameExtraction("camera gone".into()))
        });
        let analyzer = FrameAnalyzer::new(source, always("hi"));
        let mut counter = Counter::default();
        analyzer.analyze(&[1u8, 2, 3][..], &mut counter);
        assert_eq!((counter.success, counter.failure), (0, 1));
    }

    #[test]
    fn test_extraction_panic_fails_once() {
        let source = FnSource::<str, _>::new(|_: &str| -> Result<ArgbImage, ScanError> {
            panic!("camera buffer gone")
        });
        let analyzer = FrameAnalyzer::new(source, always("hi"));
        let mut counter = Counter::default();
        analyzer.analyze("frame0", &mut counter);
        assert_eq!((counter.success, counter.failure), (0, 1));
        assert_eq!(analyzer.analyze_frame("frame1"), FrameOutcome::Failure);
    }

    #[test]
    fn test_detector_error_fails_once() {
        let engine = FnEngine::new("broken", |_: &ArgbImage, _: bool| {
            Err(ScanError::detector("broken", "no model"))
        });
        let analyzer = FrameAnalyzer::new(DirectSource, engine);
        let mut counter = Counter::default();
        analyzer.analyze(&ArgbImage::filled(1, 1, 0), &mut counter);
        assert_eq!((counter.success, counter.failure), (0, 1));
    }
}
