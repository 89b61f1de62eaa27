//! Packed ARGB pixel helpers
//!
//! Pixels are stored as `0xAARRGGBB`, the layout Android bitmaps and most
//! camera pipelines hand out.

/// Fully opaque alpha component
pub const OPAQUE: u32 = 0xFF00_0000;

/// Pack alpha, red, green and blue into one pixel
#[inline]
pub fn argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Pack an opaque pixel
#[inline]
pub fn rgb(r: u8, g: u8, b: u8) -> u32 {
    argb(0xFF, r, g, b)
}

/// Alpha component
#[inline]
pub fn alpha(pixel: u32) -> u8 {
    (pixel >> 24) as u8
}

/// Red component
#[inline]
pub fn red(pixel: u32) -> u8 {
    (pixel >> 16) as u8
}

/// Green component
#[inline]
pub fn green(pixel: u32) -> u8 {
    (pixel >> 8) as u8
}

/// Blue component
#[inline]
pub fn blue(pixel: u32) -> u8 {
    pixel as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack() {
        let p = argb(0x12, 0x34, 0x56, 0x78);
        assert_eq!(p, 0x1234_5678);
        assert_eq!(alpha(p), 0x12);
        assert_eq!(red(p), 0x34);
        assert_eq!(green(p), 0x56);
        assert_eq!(blue(p), 0x78);
    }

    #[test]
    fn test_rgb_is_opaque() {
        assert_eq!(alpha(rgb(1, 2, 3)), 0xFF);
        assert_eq!(rgb(0, 0, 0), OPAQUE);
    }
}
