use super::{ChannelLabel, CornerGeometry};

/// One decoded text tagged with the attempt that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledText {
    /// Attempt source
    pub label: ChannelLabel,
    /// Decoded payload; empty only for an explicitly reported channel miss
    pub text: String,
    /// Per-attempt geometry, present only for channel attempts run with
    /// per-channel geometry enabled
    pub geometry: Option<CornerGeometry>,
}

impl LabeledText {
    /// Create an entry without geometry
    pub fn new(label: ChannelLabel, text: impl Into<String>) -> Self {
        Self {
            label,
            text: text.into(),
            geometry: None,
        }
    }

    /// Whether this entry records a miss rather than a payload
    pub fn is_miss(&self) -> bool {
        self.text.is_empty()
    }
}

/// Aggregate result of all attempts for one frame
///
/// An empty result means the frame failed: the raw attempt found nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScanResult {
    /// Labeled texts in attempt order (raw first, then red, green, blue)
    pub entries: Vec<LabeledText>,
    /// Geometry of the raw attempt
    pub geometry: Option<CornerGeometry>,
}

impl ScanResult {
    /// Failed scan
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the frame produced nothing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of labeled entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// All texts in attempt order
    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.text.as_str()).collect()
    }

    /// Entries produced by `label`
    pub fn entries_for(&self, label: ChannelLabel) -> impl Iterator<Item = &LabeledText> {
        self.entries.iter().filter(move |e| e.label == label)
    }

    /// First payload decoded from the unmodified frame
    pub fn raw_text(&self) -> Option<&str> {
        self.entries_for(ChannelLabel::Raw)
            .next()
            .map(|e| e.text.as_str())
    }

    /// Text for one channel; `None` when the channel was not probed or its
    /// miss was omitted
    pub fn channel_text(&self, label: ChannelLabel) -> Option<&str> {
        self.entries_for(label).next().map(|e| e.text.as_str())
    }

    /// Per-channel texts joined as `"R ; G ; B"` in probe order
    ///
    /// One segment per probed channel: several codes decoded from the same
    /// channel share its segment, joined with `", "`. Misses stay in place as
    /// empty segments so positions keep their meaning.
    pub fn channel_summary(&self) -> String {
        let mut segments: Vec<(ChannelLabel, Vec<&str>)> = Vec::new();
        for entry in self.entries.iter().filter(|e| e.label != ChannelLabel::Raw) {
            match segments.last_mut() {
                Some((label, texts)) if *label == entry.label => {
                    if !entry.text.is_empty() {
                        texts.push(&entry.text);
                    }
                }
                _ => {
                    let texts = if entry.text.is_empty() {
                        Vec::new()
                    } else {
                        vec![entry.text.as_str()]
                    };
                    segments.push((entry.label, texts));
                }
            }
        }
        segments
            .iter()
            .map(|(_, texts)| texts.join(", "))
            .collect::<Vec<_>>()
            .join(" ; ")
    }
}
