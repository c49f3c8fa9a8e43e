//! Per-channel tone histogram binning and rendering.

use crate::config::HISTOGRAM_BINS;
use crate::roi::Roi;
use crate::scopes::{ChannelMask, HistogramScale};
use crate::surface::RenderSurface;

/// Histogram counters for R, G, B plus one unused alpha slot.
///
/// `peak` is the normalization denominator for display: the maximum
/// single-bin count across the three color channels of the most recent
/// pass. It is recomputed from scratch on every pass, never incrementally.
/// `peak == 0` means "nothing to draw".
#[derive(Debug, Clone)]
pub struct HistogramData {
    /// Bin counts for `[R, G, B, unused]`. Each `Vec` has 256 entries.
    pub bins: [Vec<u32>; 4],
    /// Peak bin value across the color channels.
    pub peak: u32,
}

impl HistogramData {
    /// Allocate zeroed counters.
    pub fn new() -> Self {
        Self { bins: std::array::from_fn(|_| vec![0; HISTOGRAM_BINS]), peak: 0 }
    }

    /// Zero all counters and the peak.
    pub fn clear(&mut self) {
        for channel in &mut self.bins {
            channel.fill(0);
        }
        self.peak = 0;
    }

    /// Bin every pixel inside the ROI's crop rectangle.
    ///
    /// Each color channel increments `floor(value * 255)`, clamped to
    /// `[0, 255]`; out-of-range and NaN values clamp into the end bins
    /// rather than being rejected. A zero-area ROI yields all-zero
    /// counts with `peak == 0`.
    pub(crate) fn collect(&mut self, input: &[f32], roi: &Roi) {
        self.clear();
        let mul = (HISTOGRAM_BINS - 1) as f32;
        for y in roi.y_range() {
            for x in roi.x_range() {
                let px = &input[4 * (roi.width * y + x)..];
                for k in 0..3 {
                    let bin = (px[k] * mul).clamp(0.0, mul) as usize;
                    self.bins[k][bin] += 1;
                }
            }
        }
        self.peak = self.bins[..3]
            .iter()
            .flat_map(|channel| channel.iter().copied())
            .max()
            .unwrap_or(0);
    }

    /// Draw visible channels as additive bars, bottom-up.
    ///
    /// Each output column covers a contiguous bin range and draws the
    /// maximum count in that range, so narrow surfaces cannot skip over
    /// populated bins. Scale toggling only changes this mapping, never
    /// the counts. A zero peak draws nothing.
    pub(crate) fn render(
        &self,
        surface: &mut RenderSurface<'_>,
        scale: HistogramScale,
        mask: ChannelMask,
        colors: &[[f32; 3]; 3],
    ) {
        if self.peak == 0 {
            return;
        }
        let norm = match scale {
            HistogramScale::Linear => self.peak as f32,
            HistogramScale::Logarithmic => (1.0 + self.peak as f32).ln(),
        };
        let (width, height) = (surface.width(), surface.height());
        for ch in 0..3 {
            if !mask.shows(ch) {
                continue;
            }
            for x in 0..width {
                let bin_lo = x * HISTOGRAM_BINS / width;
                let bin_hi = ((x + 1) * HISTOGRAM_BINS / width).max(bin_lo + 1);
                let count = self.bins[ch][bin_lo..bin_hi.min(HISTOGRAM_BINS)]
                    .iter()
                    .copied()
                    .max()
                    .unwrap_or(0) as f32;
                let frac = match scale {
                    HistogramScale::Linear => count / norm,
                    HistogramScale::Logarithmic => (1.0 + count).ln() / norm,
                };
                let bar = (frac * height as f32) as usize;
                for y in height.saturating_sub(bar)..height {
                    surface.add(x, y, colors[ch], 0.5);
                }
            }
        }
    }
}

impl Default for HistogramData {
    fn default() -> Self {
        Self::new()
    }
}
