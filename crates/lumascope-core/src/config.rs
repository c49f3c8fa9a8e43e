//! Engine configuration read once at startup.

use serde::{Deserialize, Serialize};

use crate::scopes::{ChannelMask, HistogramScale, ScopeMode, VectorscopeSpace, WaveformView};

/// Number of histogram bins per channel. Fixed by the display contract.
pub const HISTOGRAM_BINS: usize = 256;

/// Sizing constants and initial mode state for a [`crate::ScopeEngine`].
///
/// All buffers are allocated from these values when the engine is created;
/// they are not re-derived from buffer contents afterwards. Mode and
/// sub-mode fields are just the initial selection and can be switched at
/// runtime through the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// Upper bound on the binned waveform width. Source columns are
    /// grouped so the output never exceeds this.
    pub waveform_max_width: usize,
    /// Fixed waveform height in tone rows. Does not change with ROI.
    pub waveform_height: usize,
    /// Side of the square vectorscope density grid.
    pub vectorscope_diameter: usize,
    /// Initially selected scope.
    pub mode: ScopeMode,
    /// Initial histogram display scale.
    pub histogram_scale: HistogramScale,
    /// Initial waveform display sub-mode.
    pub waveform_view: WaveformView,
    /// Initial vectorscope chromaticity space.
    pub vectorscope_space: VectorscopeSpace,
    /// Initial channel visibility.
    pub channels: ChannelMask,
    /// Display colors used to tint the R, G, B channels when rendering.
    pub channel_colors: [[f32; 3]; 3],
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            // A 3:2 landscape preview bins to ~4 source columns per output
            // column at this width; plenty of detail for a ~350px panel.
            waveform_max_width: 360,
            // 175 rows gives good tonal gradation at reasonable cost; the
            // drawn height is scaled independently.
            waveform_height: 175,
            vectorscope_diameter: 256,
            mode: ScopeMode::Histogram,
            histogram_scale: HistogramScale::Logarithmic,
            waveform_view: WaveformView::Overlaid,
            vectorscope_space: VectorscopeSpace::Cieluv,
            channels: ChannelMask::default(),
            channel_colors: [
                [1.0, 0.22, 0.18],
                [0.25, 0.95, 0.25],
                [0.25, 0.48, 1.0],
            ],
        }
    }
}
