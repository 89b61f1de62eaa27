//! rqrr-backed engine
//!
//! Multi-code: every grid rqrr finds is decoded, and geometry is reported as
//! one quad per decoded code, mirroring detectors that hand back a list of
//! per-code point containers.

use rqrr::PreparedImage;
use tracing::{debug, trace};

use super::QrEngine;
use crate::error::ScanError;
use crate::models::{ArgbImage, CornerGeometry, Detection, Point, Quad};
use crate::utils::grayscale::argb_to_grayscale;

/// Pure-Rust multi-code engine
#[derive(Debug, Clone, Default)]
pub struct RqrrEngine {
    try_inverted: bool,
}

impl RqrrEngine {
    /// Engine with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Also try the inverted image when the direct pass finds nothing
    /// (light-on-dark codes)
    pub fn with_inverted_fallback(mut self, enabled: bool) -> Self {
        self.try_inverted = enabled;
        self
    }

    fn decode_gray(gray: &[u8], width: usize, height: usize, invert: bool) -> (Vec<String>, Vec<Quad>) {
        let mut prepared = PreparedImage::prepare_from_greyscale(width, height, |x, y| {
            let v = gray[y * width + x];
            if invert { 255 - v } else { v }
        });
        let grids = prepared.detect_grids();
        trace!(grids = grids.len(), invert, "rqrr grid search done");

        let mut texts = Vec::new();
        let mut quads = Vec::new();
        for grid in grids {
            match grid.decode() {
                Ok((_meta, content)) => {
                    if content.is_empty() {
                        continue;
                    }
                    let b = &grid.bounds;
                    quads.push(Quad::new([
                        Point::from((b[0].x, b[0].y)),
                        Point::from((b[1].x, b[1].y)),
                        Point::from((b[2].x, b[2].y)),
                        Point::from((b[3].x, b[3].y)),
                    ]));
                    texts.push(content);
                }
                Err(e) => {
                    debug!(error = ?e, "rqrr grid failed to decode");
                }
            }
        }
        (texts, quads)
    }
}

impl QrEngine for RqrrEngine {
    fn name(&self) -> &'static str {
        "rqrr"
    }

    fn detect_and_decode(&self, image: &ArgbImage, want_geometry: bool) -> Result<Detection, ScanError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Ok(Detection::none());
        }

        let gray = argb_to_grayscale(image.pixels(), width, height);
        let (mut texts, mut quads) = Self::decode_gray(&gray, width, height, false);
        if texts.is_empty() && self.try_inverted {
            (texts, quads) = Self::decode_gray(&gray, width, height, true);
        }

        let geometry = want_geometry.then(|| CornerGeometry::from_quads(quads));
        Ok(Detection::new(texts, geometry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_image_finds_nothing() {
        let engine = RqrrEngine::new().with_inverted_fallback(true);
        let image = ArgbImage::filled(64, 64, 0xFFFF_FFFF);
        let detection = engine.detect_and_decode(&image, true).unwrap();
        assert!(!detection.is_found());
        assert_eq!(detection.geometry.map(|g| g.len()), Some(0));
    }

    #[test]
    fn test_zero_sized_image() {
        let engine = RqrrEngine::new();
        let image = ArgbImage::filled(0, 0, 0);
        assert!(!engine.detect_and_decode(&image, false).unwrap().is_found());
    }
}
