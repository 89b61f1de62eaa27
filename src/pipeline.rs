//! Multi-attempt decode
//!
//! One frame is decoded up to four times: the unmodified frame first, then one
//! isolated-channel derivation per probed channel. The raw attempt gates the
//! outcome: when it finds nothing the frame fails and the channel attempts are
//! skipped.

use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::config::{self, EmptyChannelPolicy, ScanOptions};
use crate::detector::QrEngine;
use crate::error::ScanError;
use crate::models::{ArgbImage, ChannelLabel, Detection, LabeledText, ScanResult};
use crate::utils::channels::isolate_channel;

/// Per-frame counters collected while scanning
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanTelemetry {
    /// Attempts that ran (raw included)
    pub attempts: usize,
    /// Attempts that decoded at least one payload
    pub hits: usize,
    /// Channel attempts that decoded nothing
    pub channel_misses: usize,
    /// Whether the frame was downscaled first
    pub downscaled: bool,
    /// Time spent per attempt, in attempt order
    pub durations: Vec<(ChannelLabel, Duration)>,
}

impl ScanTelemetry {
    /// Total time across all attempts
    pub fn total(&self) -> Duration {
        self.durations.iter().map(|(_, d)| *d).sum()
    }
}

/// Run every configured attempt on `image`
///
/// Returns an empty [`ScanResult`] when the raw attempt finds nothing. Detector
/// errors and engine panics are returned as `Err`; the frame analyzer turns
/// them into a failure outcome.
pub fn scan_image<E: QrEngine + ?Sized>(
    engine: &E,
    image: &ArgbImage,
    options: &ScanOptions,
) -> Result<ScanResult, ScanError> {
    scan_image_with_telemetry(engine, image, options).map(|(result, _)| result)
}

/// Like [`scan_image`] but also reports attempt counters and timings
pub fn scan_image_with_telemetry<E: QrEngine + ?Sized>(
    engine: &E,
    image: &ArgbImage,
    options: &ScanOptions,
) -> Result<(ScanResult, ScanTelemetry), ScanError> {
    let mut tel = ScanTelemetry::default();
    let (working, scale_back) = downscale(image, options.max_dimension);
    tel.downscaled = scale_back.is_some();

    let raw = run_attempt(engine, &working, ChannelLabel::Raw, options.raw_geometry, &mut tel)?;
    if !raw.is_found() {
        debug!(engine = engine.name(), "raw attempt found nothing");
        return Ok((ScanResult::empty(), tel));
    }

    let rescale = |d: Detection| match scale_back {
        Some((sx, sy)) => Detection {
            geometry: d.geometry.map(|g| g.scale_xy(sx, sy)),
            ..d
        },
        None => d,
    };

    let raw = rescale(raw);
    let mut entries: Vec<LabeledText> = raw
        .texts
        .into_iter()
        .map(|text| LabeledText::new(ChannelLabel::Raw, text))
        .collect();

    for channel in options.channels.iter() {
        let label = ChannelLabel::from(channel);
        let derived = isolate_channel(&working, channel);
        let detection = rescale(run_attempt(
            engine,
            &derived,
            label,
            options.channel_geometry,
            &mut tel,
        )?);

        if !detection.is_found() {
            tel.channel_misses += 1;
            match options.empty_channels {
                EmptyChannelPolicy::Report => entries.push(LabeledText {
                    label,
                    text: String::new(),
                    geometry: detection.geometry,
                }),
                EmptyChannelPolicy::Omit => {}
            }
            continue;
        }

        let geometry = detection.geometry;
        entries.extend(detection.texts.into_iter().map(|text| LabeledText {
            label,
            text,
            geometry: geometry.clone(),
        }));
    }

    trace!(
        engine = engine.name(),
        entries = entries.len(),
        attempts = tel.attempts,
        total_us = tel.total().as_micros() as u64,
        "scan complete"
    );
    Ok((
        ScanResult {
            entries,
            geometry: raw.geometry,
        },
        tel,
    ))
}

fn run_attempt<E: QrEngine + ?Sized>(
    engine: &E,
    image: &ArgbImage,
    label: ChannelLabel,
    want_geometry: bool,
    tel: &mut ScanTelemetry,
) -> Result<Detection, ScanError> {
    let start = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        engine.detect_and_decode(image, want_geometry)
    }));
    let elapsed = start.elapsed();

    tel.attempts += 1;
    tel.durations.push((label, elapsed));

    if elapsed > config::slow_attempt_threshold() {
        warn!(
            engine = engine.name(),
            channel = %label,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow decode attempt"
        );
    }

    let detection = match outcome {
        Ok(result) => result?,
        Err(_) => {
            return Err(ScanError::EnginePanic {
                engine: engine.name(),
            });
        }
    };
    if detection.is_found() {
        tel.hits += 1;
    }
    trace!(
        engine = engine.name(),
        channel = %label,
        codes = detection.texts.len(),
        elapsed_us = elapsed.as_micros() as u64,
        "attempt done"
    );
    Ok(detection)
}

/// Shrink `image` so its longest side is at most `max_dimension`
///
/// Returns the image to scan and, when it was shrunk, the per-axis factors
/// that map its coordinates back to the source.
fn downscale(image: &ArgbImage, max_dimension: usize) -> (Cow<'_, ArgbImage>, Option<(f32, f32)>) {
    let longest = image.width().max(image.height());
    if max_dimension == 0 || longest <= max_dimension {
        return (Cow::Borrowed(image), None);
    }
    let ratio = max_dimension as f32 / longest as f32;
    let width = ((image.width() as f32 * ratio).round() as usize).max(1);
    let height = ((image.height() as f32 * ratio).round() as usize).max(1);
    debug!(
        from_w = image.width(),
        from_h = image.height(),
        to_w = width,
        to_h = height,
        "downscaling frame"
    );
    let back = (
        image.width() as f32 / width as f32,
        image.height() as f32 / height as f32,
    );
    (Cow::Owned(image.resize_nearest(width, height)), Some(back))
}

/// A scan engine bundled with its options
///
/// Owns the engine; there is no process-wide detector instance.
pub struct Scanner<E> {
    engine: E,
    options: ScanOptions,
}

impl<E: QrEngine> Scanner<E> {
    /// Scanner with default options (raw attempt only)
    pub fn new(engine: E) -> Self {
        Self::with_options(engine, ScanOptions::default())
    }

    /// Scanner with explicit options
    pub fn with_options(engine: E, options: ScanOptions) -> Self {
        Self { engine, options }
    }

    /// Engine in use
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Options in use
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan one image
    pub fn scan(&self, image: &ArgbImage) -> Result<ScanResult, ScanError> {
        scan_image(&self.engine, image, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::FnEngine;
    use crate::models::{ChannelSet, CornerGeometry, Point, color};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reports `text` whenever the image's first pixel is not pure black
    fn lit_engine(text: &'static str) -> impl QrEngine {
        FnEngine::new("lit", move |image: &ArgbImage, geometry: bool| {
            let p = image.pixels().first().copied().unwrap_or(0);
            if p & 0x00FF_FFFF == 0 {
                return Ok(Detection::none());
            }
            let geometry = geometry.then(|| {
                CornerGeometry::from_flat_points(&[
                    Point::new(0.0, 0.0),
                    Point::new(10.0, 0.0),
                    Point::new(10.0, 10.0),
                    Point::new(0.0, 10.0),
                ])
            });
            Ok(Detection::new(vec![text.to_string()], geometry))
        })
    }

    #[test]
    fn test_raw_only_by_default() {
        let image = ArgbImage::filled(8, 8, color::rgb(200, 10, 0));
        let result = scan_image(&lit_engine("abc"), &image, &ScanOptions::default()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.raw_text(), Some("abc"));
        assert!(result.geometry.is_none());
    }

    #[test]
    fn test_empty_channels_reported_in_order() {
        let image = ArgbImage::filled(8, 8, color::rgb(200, 10, 0));
        let (result, tel) = scan_image_with_telemetry(
            &lit_engine("abc"),
            &image,
            &ScanOptions::multi_channel(),
        )
        .unwrap();
        let labels: Vec<_> = result.entries.iter().map(|e| e.label).collect();
        assert_eq!(
            labels,
            vec![
                ChannelLabel::Raw,
                ChannelLabel::Red,
                ChannelLabel::Green,
                ChannelLabel::Blue
            ]
        );
        assert_eq!(result.channel_summary(), "abc ; abc ; ");
        assert_eq!(tel.attempts, 4);
        assert_eq!(tel.channel_misses, 1);
        assert_eq!(result.geometry.as_ref().map(|g| g.len()), Some(1));
    }

    #[test]
    fn test_omit_policy_drops_misses() {
        let image = ArgbImage::filled(8, 8, color::rgb(200, 0, 0));
        let options = ScanOptions::multi_channel().with_empty_channels(EmptyChannelPolicy::Omit);
        let result = scan_image(&lit_engine("abc"), &image, &options).unwrap();
        assert_eq!(result.texts(), vec!["abc", "abc"]);
        assert_eq!(result.channel_text(ChannelLabel::Green), None);
    }

    #[test]
    fn test_raw_miss_skips_channels() {
        let calls = AtomicUsize::new(0);
        let engine = FnEngine::new("count", |_: &ArgbImage, _: bool| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Detection::none())
        });
        let image = ArgbImage::filled(4, 4, 0xFFFF_FFFF);
        let result = scan_image(&engine, &image, &ScanOptions::multi_channel()).unwrap();
        assert!(result.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_engine_becomes_error() {
        let engine = FnEngine::new("boom", |_: &ArgbImage, _: bool| -> Result<Detection, ScanError> {
            panic!("engine exploded")
        });
        let image = ArgbImage::filled(2, 2, 0);
        let err = scan_image(&engine, &image, &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, ScanError::EnginePanic { engine: "boom" }));
    }

    #[test]
    fn test_channel_subset() {
        let image = ArgbImage::filled(8, 8, color::rgb(200, 200, 200));
        let options = ScanOptions::default().with_channels(ChannelSet::GREEN);
        let result = scan_image(&lit_engine("x"), &image, &options).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.entries[1].label, ChannelLabel::Green);
        assert!(result.entries[1].geometry.is_none());
    }

    #[test]
    fn test_downscale_maps_geometry_back() {
        let image = ArgbImage::filled(40, 20, color::rgb(255, 255, 255));
        let options = ScanOptions::default()
            .with_geometry(true)
            .with_max_dimension(20);
        let (result, tel) = scan_image_with_telemetry(&lit_engine("x"), &image, &options).unwrap();
        assert!(tel.downscaled);
        let quad = result.geometry.unwrap().quads()[0];
        assert_eq!(quad.corners[2], Point::new(20.0, 20.0));
    }

    #[test]
    fn test_downscale_non_square_keeps_corners_in_frame() {
        // Reports the working image's full bounds as the code quad.
        let bounds = FnEngine::new("bounds", |image: &ArgbImage, _: bool| {
            let (w, h) = (image.width() as f32, image.height() as f32);
            let geometry = CornerGeometry::from_flat_points(&[
                Point::new(0.0, 0.0),
                Point::new(w, 0.0),
                Point::new(w, h),
                Point::new(0.0, h),
            ]);
            Ok(Detection::new(vec!["x".into()], Some(geometry)))
        });
        let image = ArgbImage::filled(41, 20, color::rgb(255, 255, 255));
        let options = ScanOptions::default()
            .with_geometry(true)
            .with_max_dimension(20);
        let result = scan_image(&bounds, &image, &options).unwrap();
        let corner = result.geometry.unwrap().quads()[0].corners[2];
        assert!((corner.x - 41.0).abs() < 1e-4);
        assert!((corner.y - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_scanner_owns_engine() {
        let scanner = Scanner::with_options(lit_engine("own"), ScanOptions::multi_channel());
        let image = ArgbImage::filled(3, 3, color::rgb(1, 1, 1));
        assert_eq!(scanner.scan(&image).unwrap().len(), 4);
        assert_eq!(scanner.engine().name(), "lit");
        assert_eq!(scanner.options().channels, ChannelSet::RGB);
    }
}
