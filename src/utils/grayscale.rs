//! Convert packed ARGB pixels to grayscale
//! Y = 0.299*R + 0.587*G + 0.114*B
//! Uses fast integer arithmetic: Y = (76*R + 150*G + 29*B) >> 8
//!
//! Alpha is ignored. Detection engines only consume luminance, so every
//! attempt (raw or channel-isolated) goes through here before reaching one.

use rayon::prelude::*;

use crate::models::color;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

/// Luminance of one packed ARGB pixel
#[inline]
pub fn luminance(pixel: u32) -> u8 {
    let r = color::red(pixel) as u32;
    let g = color::green(pixel) as u32;
    let b = color::blue(pixel) as u32;
    ((COEF_R * r + COEF_G * g + COEF_B * b) >> 8).min(255) as u8
}

/// Convert ARGB pixels to grayscale
pub fn argb_to_grayscale(pixels: &[u32], width: usize, height: usize) -> Vec<u8> {
    let pixel_count = width * height;
    let mut gray = vec![0u8; pixel_count];
    argb_to_grayscale_with_buffer(pixels, width, height, &mut gray);
    gray
}

/// Convert ARGB to grayscale into a pre-allocated buffer (no allocation)
///
/// # Returns
/// Number of pixels written (width * height)
pub fn argb_to_grayscale_with_buffer(
    pixels: &[u32],
    width: usize,
    height: usize,
    output: &mut [u8],
) -> usize {
    let pixel_count = width * height;
    assert!(output.len() >= pixel_count, "Output buffer too small");

    // Manual 8x unrolling keeps the hot loop branch-free
    let mut i = 0;
    while i + 8 <= pixel_count {
        for j in 0..8 {
            output[i + j] = luminance(pixels[i + j]);
        }
        i += 8;
    }
    for i in i..pixel_count {
        output[i] = luminance(pixels[i]);
    }

    pixel_count
}

/// Convert ARGB to grayscale using parallel processing
/// Processes rows in parallel for multi-core speedup
pub fn argb_to_grayscale_parallel(pixels: &[u32], width: usize, height: usize) -> Vec<u8> {
    let pixel_count = width * height;
    let mut gray = vec![0u8; pixel_count];
    if width == 0 {
        return gray;
    }

    gray.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let src = &pixels[y * width..(y + 1) * width];
        for (out, &p) in row.iter_mut().zip(src) {
            *out = luminance(p);
        }
    });

    gray
}
