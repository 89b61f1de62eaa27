use std::fmt;
use std::ops::BitOr;

use super::color;

/// One of the three color components of a pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorChannel {
    /// Red component (bits 16..24)
    Red,
    /// Green component (bits 8..16)
    Green,
    /// Blue component (bits 0..8)
    Blue,
}

impl ColorChannel {
    /// All channels in probe order
    pub const ALL: [ColorChannel; 3] = [ColorChannel::Red, ColorChannel::Green, ColorChannel::Blue];

    /// Read this channel's component out of a packed ARGB pixel
    #[inline]
    pub fn component(self, pixel: u32) -> u8 {
        match self {
            ColorChannel::Red => color::red(pixel),
            ColorChannel::Green => color::green(pixel),
            ColorChannel::Blue => color::blue(pixel),
        }
    }

    /// Bit mask selecting this channel inside a packed ARGB pixel
    #[inline]
    pub fn mask(self) -> u32 {
        match self {
            ColorChannel::Red => 0x00FF_0000,
            ColorChannel::Green => 0x0000_FF00,
            ColorChannel::Blue => 0x0000_00FF,
        }
    }

    fn bit(self) -> u8 {
        match self {
            ColorChannel::Red => 0b001,
            ColorChannel::Green => 0b010,
            ColorChannel::Blue => 0b100,
        }
    }
}

/// Source of a decode attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelLabel {
    /// The unmodified full-color frame
    Raw,
    /// Red-only derivation
    Red,
    /// Green-only derivation
    Green,
    /// Blue-only derivation
    Blue,
}

impl ChannelLabel {
    /// Lowercase label (`raw`, `red`, `green`, `blue`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelLabel::Raw => "raw",
            ChannelLabel::Red => "red",
            ChannelLabel::Green => "green",
            ChannelLabel::Blue => "blue",
        }
    }
}

impl From<ColorChannel> for ChannelLabel {
    fn from(channel: ColorChannel) -> Self {
        match channel {
            ColorChannel::Red => ChannelLabel::Red,
            ColorChannel::Green => ChannelLabel::Green,
            ColorChannel::Blue => ChannelLabel::Blue,
        }
    }
}

impl fmt::Display for ChannelLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subset of color channels to probe after the raw attempt
///
/// Replaces per-channel analyzer variants: a red-only scan is `ChannelSet::RED`,
/// the full multi-channel scan is `ChannelSet::RGB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ChannelSet(u8);

impl ChannelSet {
    /// Probe no channels (raw attempt only)
    pub const NONE: ChannelSet = ChannelSet(0);
    /// Red only
    pub const RED: ChannelSet = ChannelSet(0b001);
    /// Green only
    pub const GREEN: ChannelSet = ChannelSet(0b010);
    /// Blue only
    pub const BLUE: ChannelSet = ChannelSet(0b100);
    /// All three channels
    pub const RGB: ChannelSet = ChannelSet(0b111);

    /// Set containing a single channel
    pub fn only(channel: ColorChannel) -> Self {
        ChannelSet(channel.bit())
    }

    /// Whether `channel` is part of the set
    pub fn contains(&self, channel: ColorChannel) -> bool {
        self.0 & channel.bit() != 0
    }

    /// Whether no channel is selected
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of selected channels
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Selected channels in red, green, blue order
    pub fn iter(&self) -> impl Iterator<Item = ColorChannel> + '_ {
        ColorChannel::ALL.into_iter().filter(|c| self.contains(*c))
    }

    /// Parse a channel list such as `rgb`, `r`, `gb` or `none`
    pub fn parse(list: &str) -> Option<Self> {
        let list = list.trim().to_ascii_lowercase();
        match list.as_str() {
            "" | "none" => return Some(ChannelSet::NONE),
            "all" | "rgb" => return Some(ChannelSet::RGB),
            "red" => return Some(ChannelSet::RED),
            "green" => return Some(ChannelSet::GREEN),
            "blue" => return Some(ChannelSet::BLUE),
            _ => {}
        }
        let mut set = ChannelSet::NONE;
        for c in list.chars() {
            set = set
                | match c {
                    'r' => ChannelSet::RED,
                    'g' => ChannelSet::GREEN,
                    'b' => ChannelSet::BLUE,
                    ',' | ' ' => ChannelSet::NONE,
                    _ => return None,
                };
        }
        Some(set)
    }
}

impl BitOr for ChannelSet {
    type Output = ChannelSet;

    fn bitor(self, rhs: ChannelSet) -> ChannelSet {
        ChannelSet(self.0 | rhs.0)
    }
}

impl From<ColorChannel> for ChannelSet {
    fn from(channel: ColorChannel) -> Self {
        ChannelSet::only(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_component() {
        let p = 0xFF11_2233;
        assert_eq!(ColorChannel::Red.component(p), 0x11);
        assert_eq!(ColorChannel::Green.component(p), 0x22);
        assert_eq!(ColorChannel::Blue.component(p), 0x33);
        assert_eq!(p & ColorChannel::Green.mask(), 0x0000_2200);
    }

    #[test]
    fn test_channel_set_iteration_order() {
        let set = ChannelSet::BLUE | ChannelSet::RED;
        let channels: Vec<_> = set.iter().collect();
        assert_eq!(channels, vec![ColorChannel::Red, ColorChannel::Blue]);
        assert_eq!(set.len(), 2);
        assert!(!set.contains(ColorChannel::Green));
    }

    #[test]
    fn test_channel_set_parse() {
        assert_eq!(ChannelSet::parse("rgb"), Some(ChannelSet::RGB));
        assert_eq!(ChannelSet::parse("none"), Some(ChannelSet::NONE));
        assert_eq!(ChannelSet::parse("G"), Some(ChannelSet::GREEN));
        assert_eq!(ChannelSet::parse("r,b"), Some(ChannelSet::RED | ChannelSet::BLUE));
        assert_eq!(ChannelSet::parse("red"), Some(ChannelSet::RED));
        assert_eq!(ChannelSet::parse("x"), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(ChannelLabel::Raw.to_string(), "raw");
        assert_eq!(ChannelLabel::from(ColorChannel::Blue).as_str(), "blue");
    }
}
