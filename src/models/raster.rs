use image::{DynamicImage, RgbaImage};

use super::color;
use crate::error::ScanError;

/// Immutable full-color raster, one packed `0xAARRGGBB` value per pixel
///
/// Row-major, no stride padding. Every derivation (channel isolation,
/// downscaling, composition) allocates a new image; the pixel buffer is never
/// exposed mutably.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgbImage {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl ArgbImage {
    /// Wrap a packed ARGB buffer
    pub fn new(width: usize, height: usize, pixels: Vec<u32>) -> Result<Self, ScanError> {
        check_len(width, height, 1, pixels.len())?;
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Image with every pixel set to `argb`
    pub fn filled(width: usize, height: usize, argb: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![argb; width * height],
        }
    }

    /// Build from interleaved RGBA bytes (4 bytes per pixel)
    pub fn from_rgba(rgba: &[u8], width: usize, height: usize) -> Result<Self, ScanError> {
        check_len(width, height, 4, rgba.len())?;
        let pixels = rgba
            .chunks_exact(4)
            .map(|p| color::argb(p[3], p[0], p[1], p[2]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from interleaved RGB bytes (3 bytes per pixel), alpha forced opaque
    pub fn from_rgb(rgb: &[u8], width: usize, height: usize) -> Result<Self, ScanError> {
        check_len(width, height, 3, rgb.len())?;
        let pixels = rgb
            .chunks_exact(3)
            .map(|p| color::rgb(p[0], p[1], p[2]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from a grayscale buffer (1 byte per pixel)
    pub fn from_luma(gray: &[u8], width: usize, height: usize) -> Result<Self, ScanError> {
        check_len(width, height, 1, gray.len())?;
        let pixels = gray.iter().map(|&v| color::rgb(v, v, v)).collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Convert any decoded `image` crate picture
    pub fn from_dynamic(img: &DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        Self::from_rgba_image(&rgba)
    }

    /// Convert an `image::RgbaImage`
    pub fn from_rgba_image(img: &RgbaImage) -> Self {
        let (width, height) = (img.width() as usize, img.height() as usize);
        let pixels = img
            .pixels()
            .map(|p| color::argb(p[3], p[0], p[1], p[2]))
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Convert back into an `image::RgbaImage` (for saving or display)
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut raw = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            raw.extend_from_slice(&[color::red(p), color::green(p), color::blue(p), color::alpha(p)]);
        }
        RgbaImage::from_raw(self.width as u32, self.height as u32, raw)
            .unwrap_or_else(|| RgbaImage::new(self.width as u32, self.height as u32))
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Whether the image has no pixels
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Row-major pixel buffer
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Pixel at (x, y), `None` when out of bounds
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Apply `f` to every pixel, producing a new image of the same geometry
    pub fn map_pixels(&self, f: impl Fn(u32) -> u32) -> Self {
        Self {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(|&p| f(p)).collect(),
        }
    }

    /// Nearest-neighbor resize
    pub fn resize_nearest(&self, width: usize, height: usize) -> Self {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let mut pixels = Vec::with_capacity(width * height);
        if self.width > 0 && self.height > 0 {
            for y in 0..height {
                let sy = (y * self.height / height.max(1)).min(self.height - 1);
                let row = &self.pixels[sy * self.width..(sy + 1) * self.width];
                for x in 0..width {
                    let sx = (x * self.width / width.max(1)).min(self.width - 1);
                    pixels.push(row[sx]);
                }
            }
        } else {
            pixels.resize(width * height, color::OPAQUE);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub(crate) fn from_parts_unchecked(width: usize, height: usize, pixels: Vec<u32>) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            pixels,
        }
    }
}

fn check_len(width: usize, height: usize, per_pixel: usize, actual: usize) -> Result<(), ScanError> {
    let expected = width * height * per_pixel;
    if actual != expected {
        return Err(ScanError::InvalidImage {
            width,
            height,
            expected,
            actual,
        });
    }
    Ok(())
}
