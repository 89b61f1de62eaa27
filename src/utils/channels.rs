//! Channel isolation and color-code composition
//!
//! Isolation keeps one color component and zeroes the other two. Alpha is
//! always forced opaque, so a channel image of a translucent frame decodes the
//! same way as one of an opaque frame.
//!
//! Every function allocates a fresh image and leaves its inputs untouched:
//! one source frame feeds several derivations and is handed back to the
//! caller afterwards.

use rayon::prelude::*;

use crate::config;
use crate::error::ScanError;
use crate::models::{ArgbImage, ColorChannel, color};
use crate::utils::grayscale::luminance;

/// Keep only `channel`, zero the other two components, force alpha opaque
///
/// Large frames are processed row-parallel; the output is identical either way.
pub fn isolate_channel(image: &ArgbImage, channel: ColorChannel) -> ArgbImage {
    if image.len() >= config::parallel_min_pixels() {
        isolate_channel_parallel(image, channel)
    } else {
        isolate_channel_sequential(image, channel)
    }
}

/// Single-threaded channel isolation
pub fn isolate_channel_sequential(image: &ArgbImage, channel: ColorChannel) -> ArgbImage {
    let mask = channel.mask();
    image.map_pixels(|p| color::OPAQUE | (p & mask))
}

/// Row-parallel channel isolation
pub fn isolate_channel_parallel(image: &ArgbImage, channel: ColorChannel) -> ArgbImage {
    let (width, height) = (image.width(), image.height());
    let mask = channel.mask();
    let src = image.pixels();
    let mut out = vec![0u32; src.len()];
    if width > 0 {
        out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
            let src_row = &src[y * width..(y + 1) * width];
            for (o, &p) in row.iter_mut().zip(src_row) {
                *o = color::OPAQUE | (p & mask);
            }
        });
    }
    ArgbImage::from_parts_unchecked(width, height, out)
}

/// Red-only, green-only and blue-only derivations, in that order
pub fn split_channels(image: &ArgbImage) -> [ArgbImage; 3] {
    ColorChannel::ALL.map(|c| isolate_channel(image, c))
}

/// Build a color code: the luminance of each input becomes one color component
///
/// Output pixel = (0xFF, gray(red), gray(green), gray(blue)). Isolating channel
/// `c` of the composite yields the grayscale of input `c` in that component.
pub fn compose_channels(
    red: &ArgbImage,
    green: &ArgbImage,
    blue: &ArgbImage,
) -> Result<ArgbImage, ScanError> {
    let dims = [
        (red.width(), red.height()),
        (green.width(), green.height()),
        (blue.width(), blue.height()),
    ];
    if dims[0] != dims[1] || dims[0] != dims[2] {
        return Err(ScanError::ChannelMismatch(dims.to_vec()));
    }

    let pixels = red
        .pixels()
        .iter()
        .zip(green.pixels())
        .zip(blue.pixels())
        .map(|((&r, &g), &b)| color::rgb(luminance(r), luminance(g), luminance(b)))
        .collect();
    Ok(ArgbImage::from_parts_unchecked(red.width(), red.height(), pixels))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ArgbImage {
        let pixels = (0..6 * 5)
            .map(|i: u32| i.wrapping_mul(0x0101_0937) ^ 0x4080_C0F0)
            .collect();
        ArgbImage::new(6, 5, pixels).unwrap()
    }

    #[test]
    fn test_isolated_components() {
        let src = sample();
        let [r, g, b] = split_channels(&src);
        for (i, &p) in src.pixels().iter().enumerate() {
            let (rp, gp, bp) = (r.pixels()[i], g.pixels()[i], b.pixels()[i]);
            assert_eq!(color::red(rp), color::red(p));
            assert_eq!((color::green(rp), color::blue(rp)), (0, 0));
            assert_eq!(color::green(gp), color::green(p));
            assert_eq!((color::red(gp), color::blue(gp)), (0, 0));
            assert_eq!(color::blue(bp), color::blue(p));
            assert_eq!((color::red(bp), color::green(bp)), (0, 0));
            assert_eq!(color::alpha(rp), 0xFF);
            assert_eq!(color::alpha(gp), 0xFF);
            assert_eq!(color::alpha(bp), 0xFF);
        }
    }

    #[test]
    fn test_isolation_is_pure() {
        let src = sample();
        let before = src.clone();
        let first = split_channels(&src);
        let second = split_channels(&src);
        assert_eq!(first, second);
        assert_eq!(src, before);
        assert_eq!(first[0].width(), src.width());
        assert_eq!(first[0].height(), src.height());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let src = sample();
        for c in ColorChannel::ALL {
            assert_eq!(
                isolate_channel_parallel(&src, c),
                isolate_channel_sequential(&src, c)
            );
        }
    }

    #[test]
    fn test_empty_image() {
        let empty = ArgbImage::filled(0, 0, 0);
        let [r, _, _] = split_channels(&empty);
        assert!(r.is_empty());
        assert!(isolate_channel_parallel(&empty, ColorChannel::Red).is_empty());
    }

    #[test]
    fn test_compose_then_isolate() {
        let black = ArgbImage::filled(3, 2, color::rgb(0, 0, 0));
        let white = ArgbImage::filled(3, 2, color::rgb(255, 255, 255));
        let gray = ArgbImage::filled(3, 2, color::rgb(100, 100, 100));

        let composite = compose_channels(&white, &black, &gray).unwrap();
        let [r, g, b] = split_channels(&composite);
        assert_eq!(color::red(r.pixels()[0]), luminance(white.pixels()[0]));
        assert_eq!(color::green(g.pixels()[0]), 0);
        assert_eq!(color::blue(b.pixels()[0]), luminance(gray.pixels()[0]));
    }

    #[test]
    fn test_compose_rejects_mismatched_sizes() {
        let a = ArgbImage::filled(3, 2, 0);
        let b = ArgbImage::filled(2, 3, 0);
        let err = compose_channels(&a, &a, &b).unwrap_err();
        assert!(matches!(err, ScanError::ChannelMismatch(_)));
    }
}
