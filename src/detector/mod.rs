//! Detection engines
//!
//! A [`QrEngine`] is an opaque decoding backend: it receives an image and
//! reports decoded payloads, optionally with corner geometry. Engines differ in
//! how they describe geometry (a flat point list for single-code engines, one
//! point container per code for multi-code engines); each adapter folds its
//! native shape into [`CornerGeometry`](crate::models::CornerGeometry).
//!
//! Engines are owned by whoever runs the scan and must be safe to reuse across
//! frames sequentially. None of them keep per-call state.

#[cfg(feature = "opencv")]
pub mod opencv_engine;
pub mod quirc_engine;
pub mod rqrr_engine;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ScanError;
use crate::models::{ArgbImage, Detection};

#[cfg(feature = "opencv")]
pub use opencv_engine::{OpenCvEngine, WeChatEngine};
pub use quirc_engine::QuircEngine;
pub use rqrr_engine::RqrrEngine;

/// Decoding backend invoked once per attempt
pub trait QrEngine: Send + Sync {
    /// Short engine name used in logs and errors
    fn name(&self) -> &'static str;

    /// Decode every code found in `image`
    ///
    /// Returns an empty [`Detection`] when nothing is found. Geometry is filled
    /// in only when `want_geometry` is set.
    fn detect_and_decode(&self, image: &ArgbImage, want_geometry: bool) -> Result<Detection, ScanError>;
}

impl<E: QrEngine + ?Sized> QrEngine for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn detect_and_decode(&self, image: &ArgbImage, want_geometry: bool) -> Result<Detection, ScanError> {
        (**self).detect_and_decode(image, want_geometry)
    }
}

impl<E: QrEngine + ?Sized> QrEngine for Arc<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn detect_and_decode(&self, image: &ArgbImage, want_geometry: bool) -> Result<Detection, ScanError> {
        (**self).detect_and_decode(image, want_geometry)
    }
}

impl<E: QrEngine + ?Sized> QrEngine for &E {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn detect_and_decode(&self, image: &ArgbImage, want_geometry: bool) -> Result<Detection, ScanError> {
        (**self).detect_and_decode(image, want_geometry)
    }
}

/// Engine backed by a plain function or closure
///
/// ```
/// use chroma_qr::detector::{FnEngine, QrEngine};
/// use chroma_qr::models::{ArgbImage, Detection};
///
/// let engine = FnEngine::new("fixed", |_image: &ArgbImage, _geometry: bool| {
///     Ok(Detection::new(vec!["hello".into()], None))
/// });
/// let image = ArgbImage::filled(4, 4, 0xFFFF_FFFF);
/// assert_eq!(engine.detect_and_decode(&image, false).unwrap().texts, vec!["hello"]);
/// ```
pub struct FnEngine<F> {
    name: &'static str,
    decode: F,
}

impl<F> FnEngine<F>
where
    F: Fn(&ArgbImage, bool) -> Result<Detection, ScanError> + Send + Sync,
{
    /// Wrap `decode` under `name`
    pub fn new(name: &'static str, decode: F) -> Self {
        Self { name, decode }
    }
}

impl<F> QrEngine for FnEngine<F>
where
    F: Fn(&ArgbImage, bool) -> Result<Detection, ScanError> + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn detect_and_decode(&self, image: &ArgbImage, want_geometry: bool) -> Result<Detection, ScanError> {
        (self.decode)(image, want_geometry)
    }
}

#[cfg(feature = "opencv")]
const ENGINE_NAMES: &[&str] = &["rqrr", "quirc", "opencv", "wechat"];
#[cfg(not(feature = "opencv"))]
const ENGINE_NAMES: &[&str] = &["rqrr", "quirc"];

/// Selectable engine family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineKind {
    /// rqrr: multi-code, per-code corner quads
    #[default]
    Rqrr,
    /// quircs: first code only, flat corner list
    Quirc,
    /// OpenCV `QRCodeDetector`: single code, flat corner list
    #[cfg(feature = "opencv")]
    OpenCv,
    /// OpenCV WeChat detector: multi-code, per-code point containers
    #[cfg(feature = "opencv")]
    WeChat,
}

impl EngineKind {
    /// Names accepted by [`EngineKind::from_str`]
    pub fn names() -> &'static [&'static str] {
        ENGINE_NAMES
    }

    /// Instantiate the engine
    pub fn build(self) -> Result<Box<dyn QrEngine>, ScanError> {
        Ok(match self {
            EngineKind::Rqrr => Box::new(RqrrEngine::new()),
            EngineKind::Quirc => Box::new(QuircEngine::new()),
            #[cfg(feature = "opencv")]
            EngineKind::OpenCv => Box::new(OpenCvEngine::new()?),
            #[cfg(feature = "opencv")]
            EngineKind::WeChat => Box::new(WeChatEngine::new()?),
        })
    }
}

impl FromStr for EngineKind {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rqrr" => Ok(EngineKind::Rqrr),
            "quirc" | "quircs" => Ok(EngineKind::Quirc),
            #[cfg(feature = "opencv")]
            "opencv" => Ok(EngineKind::OpenCv),
            #[cfg(feature = "opencv")]
            "wechat" => Ok(EngineKind::WeChat),
            other => Err(ScanError::UnknownEngine(other.to_string())),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineKind::Rqrr => "rqrr",
            EngineKind::Quirc => "quirc",
            #[cfg(feature = "opencv")]
            EngineKind::OpenCv => "opencv",
            #[cfg(feature = "opencv")]
            EngineKind::WeChat => "wechat",
        };
        f.write_str(name)
    }
}
