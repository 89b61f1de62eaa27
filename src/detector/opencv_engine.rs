//! OpenCV-backed engines (feature `opencv`)
//!
//! `WeChatQRCode::detect_and_decode` takes `&mut self` in opencv 0.94, so each
//! engine keeps its detector behind a `Mutex` to satisfy `QrEngine: Sync`.
//! Attempts on one engine are serialized.

use std::path::Path;
use std::sync::Mutex;

use opencv::core::{Mat, Point2f, Vector};
use opencv::objdetect::QRCodeDetector;
use opencv::prelude::*;
use opencv::wechat_qrcode::WeChatQRCode;
use tracing::{debug, warn};

use super::QrEngine;
use crate::error::ScanError;
use crate::models::{color, ArgbImage, CornerGeometry, Detection, Point, Quad};

/// Pack an ARGB raster into a 3-channel BGR `Mat`
fn to_bgr_mat(image: &ArgbImage) -> opencv::Result<Mat> {
    let mut bgr = Vec::with_capacity(image.len() * 3);
    for &p in image.pixels() {
        bgr.extend_from_slice(&[color::blue(p), color::green(p), color::red(p)]);
    }
    let flat = Mat::from_slice(&bgr)?;
    let shaped = flat.reshape(3, image.height() as i32)?;
    shaped.try_clone()
}

/// Read one code's corners from a 4x2 (or 8x1) float `Mat`
fn quad_from_mat(points: &Mat) -> opencv::Result<Option<Quad>> {
    let mut corners = [Point::default(); 4];
    if points.rows() >= 4 && points.cols() >= 2 {
        for (j, corner) in corners.iter_mut().enumerate() {
            let x = *points.at_2d::<f32>(j as i32, 0)?;
            let y = *points.at_2d::<f32>(j as i32, 1)?;
            *corner = Point::new(x, y);
        }
    } else if points.total() >= 8 {
        for (j, corner) in corners.iter_mut().enumerate() {
            let x = *points.at::<f32>((j * 2) as i32)?;
            let y = *points.at::<f32>((j * 2 + 1) as i32)?;
            *corner = Point::new(x, y);
        }
    } else {
        return Ok(None);
    }
    Ok(Some(Quad::new(corners)))
}

/// OpenCV `QRCodeDetector`: one code per frame, flat corner list
pub struct OpenCvEngine {
    detector: Mutex<QRCodeDetector>,
}

impl OpenCvEngine {
    /// Create the detector
    pub fn new() -> Result<Self, ScanError> {
        let detector = QRCodeDetector::default().map_err(|e| ScanError::detector("opencv", e))?;
        Ok(Self {
            detector: Mutex::new(detector),
        })
    }

    fn run(&self, image: &ArgbImage, want_geometry: bool) -> opencv::Result<Detection> {
        let mat = to_bgr_mat(image)?;
        let mut points = Vector::<Point2f>::new();
        let mut straight = Mat::default();

        let payload = {
            let detector = self
                .detector
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            detector.detect_and_decode(&mat, &mut points, &mut straight)?
        };
        let text = match String::from_utf8(payload) {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "opencv payload is not UTF-8");
                return Ok(Detection::none());
            }
        };

        let geometry = want_geometry.then(|| {
            let flat: Vec<Point> = points.iter().map(|p| Point::new(p.x, p.y)).collect();
            CornerGeometry::from_flat_points(&flat)
        });
        Ok(Detection::new(vec![text], geometry))
    }
}

impl QrEngine for OpenCvEngine {
    fn name(&self) -> &'static str {
        "opencv"
    }

    fn detect_and_decode(&self, image: &ArgbImage, want_geometry: bool) -> Result<Detection, ScanError> {
        if image.is_empty() {
            return Ok(Detection::none());
        }
        self.run(image, want_geometry)
            .map_err(|e| ScanError::detector("opencv", e))
    }
}

/// Model files for the WeChat detector
#[derive(Debug, Clone)]
pub struct WeChatModels<'a> {
    /// Detector network description
    pub detector_prototxt: &'a Path,
    /// Detector weights
    pub detector_caffemodel: &'a Path,
    /// Super-resolution network description
    pub sr_prototxt: &'a Path,
    /// Super-resolution weights
    pub sr_caffemodel: &'a Path,
}

/// OpenCV WeChat detector: multi-code, one point container per code
pub struct WeChatEngine {
    detector: Mutex<WeChatQRCode>,
}

impl WeChatEngine {
    /// Create the detector without CNN models (traditional detection only)
    pub fn new() -> Result<Self, ScanError> {
        let detector = WeChatQRCode::new_def().map_err(|e| ScanError::detector("wechat", e))?;
        Ok(Self {
            detector: Mutex::new(detector),
        })
    }

    /// Create the detector with CNN detection and super-resolution models
    pub fn with_models(models: &WeChatModels<'_>) -> Result<Self, ScanError> {
        let paths = [
            models.detector_prototxt,
            models.detector_caffemodel,
            models.sr_prototxt,
            models.sr_caffemodel,
        ];
        for path in paths {
            if !path.exists() {
                return Err(ScanError::detector(
                    "wechat",
                    format!("model file not found: {}", path.display()),
                ));
            }
        }
        let [dp, dc, sp, sc] = paths.map(|p| p.to_string_lossy().into_owned());
        let detector = WeChatQRCode::new(&dp, &dc, &sp, &sc)
            .map_err(|e| ScanError::detector("wechat", e))?;
        Ok(Self {
            detector: Mutex::new(detector),
        })
    }

    fn run(&self, image: &ArgbImage, want_geometry: bool) -> opencv::Result<Detection> {
        let mat = to_bgr_mat(image)?;
        let mut points = Vector::<Mat>::new();

        let decoded = {
            let mut detector = self
                .detector
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            detector.detect_and_decode(&mat, &mut points)?
        };

        let texts: Vec<String> = decoded.iter().collect();
        let geometry = if want_geometry {
            let mut quads = Vec::with_capacity(points.len());
            for (i, code_points) in points.iter().enumerate() {
                match quad_from_mat(&code_points)? {
                    Some(quad) => quads.push(quad),
                    None => warn!(code = i, "wechat returned unusable corner data"),
                }
            }
            Some(CornerGeometry::from_quads(quads))
        } else {
            None
        };
        Ok(Detection::new(texts, geometry))
    }
}

impl QrEngine for WeChatEngine {
    fn name(&self) -> &'static str {
        "wechat"
    }

    fn detect_and_decode(&self, image: &ArgbImage, want_geometry: bool) -> Result<Detection, ScanError> {
        if image.is_empty() {
            return Ok(Detection::none());
        }
        self.run(image, want_geometry)
            .map_err(|e| ScanError::detector("wechat", e))
    }
}
