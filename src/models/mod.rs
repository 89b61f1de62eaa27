/// Color channels, channel labels and channel subsets
pub mod channel;
pub mod color;
/// Per-attempt detection output and corner geometry
pub mod detection;
/// 2D point
pub mod point;
/// Packed ARGB raster
pub mod raster;
/// Aggregated, labeled scan result
pub mod scan_result;

pub use channel::{ChannelLabel, ChannelSet, ColorChannel};
pub use detection::{CornerGeometry, Detection, Quad};
pub use point::Point;
pub use raster::ArgbImage;
pub use scan_result::{LabeledText, ScanResult};
