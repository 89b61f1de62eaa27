//! Utility functions for image processing
//!
//! This module provides the pixel-level helpers used by every decode attempt:
//! - Grayscale conversion (packed ARGB to luminance)
//! - Channel isolation and color-code composition

pub mod channels;
pub mod grayscale;
