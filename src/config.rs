//! Scan configuration
//!
//! `ScanOptions` carries the per-analyzer choices. Process-wide tuning knobs
//! are read once from the environment:
//!
//! - `CHROMA_QR_MAX_DIM`: longest frame side before downscaling (0 = never)
//! - `CHROMA_QR_SLOW_ATTEMPT_MS`: attempts slower than this are logged at warn
//! - `CHROMA_QR_PARALLEL_MIN_PIXELS`: frames at least this large use the
//!   row-parallel pixel paths

use std::sync::OnceLock;
use std::time::Duration;

use crate::models::ChannelSet;

fn parse_env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

static MAX_DIMENSION: OnceLock<usize> = OnceLock::new();

pub(crate) fn max_dimension() -> usize {
    *MAX_DIMENSION.get_or_init(|| parse_env_usize("CHROMA_QR_MAX_DIM", 0))
}

static SLOW_ATTEMPT_MS: OnceLock<u64> = OnceLock::new();

pub(crate) fn slow_attempt_threshold() -> Duration {
    Duration::from_millis(*SLOW_ATTEMPT_MS.get_or_init(|| parse_env_u64("CHROMA_QR_SLOW_ATTEMPT_MS", 250)))
}

static PARALLEL_MIN_PIXELS: OnceLock<usize> = OnceLock::new();

pub(crate) fn parallel_min_pixels() -> usize {
    *PARALLEL_MIN_PIXELS
        .get_or_init(|| parse_env_usize("CHROMA_QR_PARALLEL_MIN_PIXELS", 640 * 480).max(1))
}

/// How a channel attempt that decodes nothing shows up in the aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyChannelPolicy {
    /// Keep an explicit labeled entry with empty text
    #[default]
    Report,
    /// Leave the channel out of the aggregate
    Omit,
}

/// Options for one multi-attempt scan
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    /// Channels probed after the raw attempt
    pub channels: ChannelSet,
    /// Request corner geometry for the raw attempt
    pub raw_geometry: bool,
    /// Request corner geometry for every channel attempt as well
    pub channel_geometry: bool,
    /// Treatment of channel attempts that decode nothing
    pub empty_channels: EmptyChannelPolicy,
    /// Longest side a frame may have before it is downscaled (0 = never)
    pub max_dimension: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            channels: ChannelSet::NONE,
            raw_geometry: false,
            channel_geometry: false,
            empty_channels: EmptyChannelPolicy::Report,
            max_dimension: max_dimension(),
        }
    }
}

impl ScanOptions {
    /// Raw attempt plus all three channels, geometry for the raw attempt
    pub fn multi_channel() -> Self {
        Self {
            channels: ChannelSet::RGB,
            raw_geometry: true,
            ..Self::default()
        }
    }

    /// Set the probed channel subset
    pub fn with_channels(mut self, channels: ChannelSet) -> Self {
        self.channels = channels;
        self
    }

    /// Request raw-attempt geometry
    pub fn with_geometry(mut self, enabled: bool) -> Self {
        self.raw_geometry = enabled;
        self
    }

    /// Request geometry for channel attempts too
    pub fn with_channel_geometry(mut self, enabled: bool) -> Self {
        self.channel_geometry = enabled;
        self
    }

    /// Set the empty-channel policy
    pub fn with_empty_channels(mut self, policy: EmptyChannelPolicy) -> Self {
        self.empty_channels = policy;
        self
    }

    /// Set the downscale limit (0 disables downscaling)
    pub fn with_max_dimension(mut self, max_dimension: usize) -> Self {
        self.max_dimension = max_dimension;
        self
    }
}
