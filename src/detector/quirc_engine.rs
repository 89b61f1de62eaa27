//! quircs-backed engine
//!
//! Single-code: stops at the first code that decodes to UTF-8 and reports its
//! corners as a flat point list, the shape single-code detectors produce.

use tracing::debug;

use super::QrEngine;
use crate::error::ScanError;
use crate::models::{ArgbImage, CornerGeometry, Detection, Point};
use crate::utils::grayscale::argb_to_grayscale;

/// Pure-Rust single-code engine
///
/// A fresh `quircs::Quirc` is built per call, so the engine itself holds no
/// state between frames.
#[derive(Debug, Clone, Default)]
pub struct QuircEngine;

impl QuircEngine {
    /// Engine with default settings
    pub fn new() -> Self {
        Self
    }
}

impl QrEngine for QuircEngine {
    fn name(&self) -> &'static str {
        "quirc"
    }

    fn detect_and_decode(&self, image: &ArgbImage, want_geometry: bool) -> Result<Detection, ScanError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Ok(Detection::none());
        }

        let gray = argb_to_grayscale(image.pixels(), width, height);
        let mut decoder = quircs::Quirc::default();

        for code in decoder.identify(width, height, &gray) {
            let code = match code {
                Ok(code) => code,
                Err(e) => {
                    debug!(error = ?e, "quirc extraction failed");
                    continue;
                }
            };
            let data = match code.decode() {
                Ok(data) => data,
                Err(e) => {
                    debug!(error = ?e, "quirc decode failed");
                    continue;
                }
            };
            let text = match String::from_utf8(data.payload) {
                Ok(text) if !text.is_empty() => text,
                Ok(_) => continue,
                Err(e) => {
                    debug!(error = %e, "quirc payload is not UTF-8");
                    continue;
                }
            };

            let geometry = want_geometry.then(|| {
                let points: Vec<Point> = code.corners.iter().map(|c| Point::from((c.x, c.y))).collect();
                CornerGeometry::from_flat_points(&points)
            });
            return Ok(Detection::new(vec![text], geometry));
        }

        Ok(Detection::new(Vec::new(), want_geometry.then(CornerGeometry::default)))
    }
}
