//! Scope computation — histogram, waveform, and vectorscope.

pub mod histogram;
pub mod vectorscope;
pub mod waveform;

pub use histogram::HistogramData;
pub use vectorscope::VectorscopeData;
pub use waveform::WaveformData;

use serde::{Deserialize, Serialize};

/// Which scope the engine computes and renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeMode {
    /// Per-channel tone histogram.
    Histogram,
    /// Luminance-vs-column waveform.
    Waveform,
    /// Chromaticity density vectorscope.
    Vectorscope,
}

impl ScopeMode {
    /// Stable lowercase name, matching the host configuration keys.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Histogram => "histogram",
            Self::Waveform => "waveform",
            Self::Vectorscope => "vectorscope",
        }
    }

    /// Next mode in cycle order.
    pub const fn next(self) -> Self {
        match self {
            Self::Histogram => Self::Waveform,
            Self::Waveform => Self::Vectorscope,
            Self::Vectorscope => Self::Histogram,
        }
    }
}

/// Histogram display scaling. Toggling never alters bin counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistogramScale {
    /// `ln(1 + count)` mapping; the usual photographic view.
    Logarithmic,
    /// Direct proportional mapping.
    Linear,
}

impl HistogramScale {
    /// Next scale in cycle order.
    pub const fn next(self) -> Self {
        match self {
            Self::Logarithmic => Self::Linear,
            Self::Linear => Self::Logarithmic,
        }
    }
}

/// Waveform display sub-mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveformView {
    /// All channels overlaid in one plot.
    Overlaid,
    /// Channels side by side (RGB parade).
    Parade,
}

impl WaveformView {
    /// Next view in cycle order.
    pub const fn next(self) -> Self {
        match self {
            Self::Overlaid => Self::Parade,
            Self::Parade => Self::Overlaid,
        }
    }
}

/// Chromaticity space the vectorscope projects into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VectorscopeSpace {
    /// CIE 1976 u\*v\* from the D50 connection space.
    Cieluv,
    /// az/bz plane of JzAzBz, after adaptation to D65.
    JzAzBz,
}

impl VectorscopeSpace {
    /// Next space in cycle order.
    pub const fn next(self) -> Self {
        match self {
            Self::Cieluv => Self::JzAzBz,
            Self::JzAzBz => Self::Cieluv,
        }
    }
}

/// Per-channel visibility for histogram and overlaid waveform rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMask {
    /// Show the red channel.
    pub red: bool,
    /// Show the green channel.
    pub green: bool,
    /// Show the blue channel.
    pub blue: bool,
}

impl ChannelMask {
    /// Whether channel index 0/1/2 (R/G/B) is shown.
    pub fn shows(&self, channel: usize) -> bool {
        match channel {
            0 => self.red,
            1 => self.green,
            _ => self.blue,
        }
    }
}

impl Default for ChannelMask {
    fn default() -> Self {
        Self { red: true, green: true, blue: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_cycle_visits_all_scopes() {
        let mut mode = ScopeMode::Histogram;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(mode, ScopeMode::Histogram);
        assert_eq!(seen.len(), 3);
        assert!(seen.contains(&ScopeMode::Waveform));
        assert!(seen.contains(&ScopeMode::Vectorscope));
    }

    #[test]
    fn test_channel_mask_indexing() {
        let mask = ChannelMask { red: true, green: false, blue: true };
        assert!(mask.shows(0));
        assert!(!mask.shows(1));
        assert!(mask.shows(2));
    }
}
