//! Luminance waveform binning, display remap, and rendering.
//!
//! The horizontal axis is image column (binned into integral groups) and
//! the vertical axis is tone level, inverted so bright pixels land near
//! the top. Accumulation is linear light; the display remap tints each
//! channel, pushes it through the profile's display encoding, and
//! quantizes to 8 bits.

use rayon::prelude::*;

use crate::config::ScopeConfig;
use crate::profile::ScopeProfile;
use crate::roi::Roi;
use crate::scopes::{ChannelMask, WaveformView};
use crate::surface::RenderSurface;

// Vertical headroom: a value of exactly 1.0 lands at 8/9 of the height
// rather than the very top row. Tuned display constant, do not derive.
const HEADROOM: f32 = 8.0 / 9.0;

// Accumulation brightness numerator; decreasing it brightens the output.
const BRIGHTNESS_DIVISOR: f32 = 40.0;

/// Waveform buffers, allocated once at the configured maximum size.
///
/// The linear buffer is column-major (`[column][row][channel]`) so that
/// output columns are disjoint slices for the parallel accumulation pass.
/// `width == 0` means "no waveform computed yet / cleared".
#[derive(Debug, Clone)]
pub struct WaveformData {
    /// Binned output width of the most recent pass; 0 when cleared.
    pub width: usize,
    /// Fixed output height in tone rows.
    pub height: usize,
    max_width: usize,
    /// Column-major linear accumulation, `max_width * height * 4` floats.
    linear: Vec<f32>,
    /// Row-major RGBA8 display cache, one buffer per color channel.
    display_8bit: [Vec<u8>; 3],
    display_valid: bool,
}

impl WaveformData {
    /// Allocate buffers sized by the configuration constants.
    pub fn new(config: &ScopeConfig) -> Self {
        let cells = config.waveform_max_width * config.waveform_height * 4;
        Self {
            width: 0,
            height: config.waveform_height,
            max_width: config.waveform_max_width,
            linear: vec![0.0; cells],
            display_8bit: std::array::from_fn(|_| vec![0; cells]),
            display_valid: false,
        }
    }

    /// Mark the waveform as "nothing to draw". Buffers stay allocated.
    pub fn clear(&mut self) {
        self.width = 0;
        self.display_valid = false;
    }

    /// Whether a completed pass is available to draw.
    pub fn is_valid(&self) -> bool {
        self.width > 0
    }

    /// Linear accumulation value at output column `x`, tone row `y`
    /// (row 0 is the top), channel `ch`.
    pub fn value(&self, x: usize, y: usize, ch: usize) -> f32 {
        self.linear[(x * self.height + y) * 4 + ch]
    }

    /// Bin the ROI into the linear accumulation buffer.
    ///
    /// Columns are grouped into integral, equal-size bins so the output
    /// width never exceeds the configured maximum; unequal groups would
    /// show as banding. Each pixel adds a fixed per-pass scale into the
    /// vertically-inverted tone bucket of its channel. NaN values land
    /// in bucket 0 rather than being dropped.
    ///
    /// Output columns are independent, so the accumulation runs in
    /// parallel over disjoint column slices and is bit-deterministic.
    pub(crate) fn collect(&mut self, input: &[f32], roi: &Roi) {
        let sample_width = roi.sample_width();
        let sample_height = roi.sample_height();

        let bin_width = (sample_width as f32 / self.max_width as f32).ceil().max(1.0) as usize;
        let out_width = (sample_width as f32 / bin_width as f32).ceil() as usize;
        self.width = out_width;

        let brightness = self.height as f32 / BRIGHTNESS_DIVISOR;
        let scale = brightness / (sample_height * bin_width) as f32;
        let height_i = self.height - 1;
        let height_f = height_i as f32;
        let x_high_limit = roi.width.saturating_sub(roi.crop_width);

        self.linear[..out_width * self.height * 4]
            .par_chunks_mut(self.height * 4)
            .enumerate()
            .for_each(|(out_x, column)| {
                column.fill(0.0);
                let x_from = out_x * bin_width + roi.crop_x;
                let x_high = (x_from + bin_width).min(x_high_limit);
                for in_x in x_from..x_high {
                    for in_y in roi.y_range() {
                        let px = &input[4 * (roi.width * in_y + in_x)..];
                        for k in 0..3 {
                            let v = 1.0 - HEADROOM * px[k];
                            let out_y = if v.is_nan() {
                                0
                            } else {
                                ((v * height_f).max(0.0).round() as usize).min(height_i)
                            };
                            column[4 * out_y + k] += scale;
                        }
                    }
                }
            });

        self.display_valid = false;
    }

    /// Refresh the per-channel 8-bit display caches if stale.
    ///
    /// Each linear cell is clamped to 1.0, tinted by the channel display
    /// color, pushed through the profile's display encoding, and
    /// quantized; the encoding can exceed 1.0, so the quantization clamps.
    ///
    /// The cache is keyed on the accumulation pass only: `colors` are
    /// fixed at engine startup and the display profile is assumed stable
    /// between passes. A host that swaps display profiles mid-stream
    /// must push a new frame through `collect` to refresh the remap.
    fn remap(&mut self, colors: &[[f32; 3]; 3], profile: &dyn ScopeProfile) {
        if self.display_valid {
            return;
        }
        let (width, height) = (self.width, self.height);
        for (ch, cache) in self.display_8bit.iter_mut().enumerate() {
            let tint = colors[ch];
            for y in 0..height {
                for x in 0..width {
                    let lin = self.linear[(x * height + y) * 4 + ch].min(1.0);
                    let px = &mut cache[(y * width + x) * 4..][..4];
                    for k in 0..3 {
                        let encoded = profile.display_encode(lin * tint[k]);
                        px[k] = (encoded * 255.0).clamp(0.0, 255.0) as u8;
                    }
                    px[3] = 255;
                }
            }
        }
        self.display_valid = true;
    }

    /// Draw the waveform: overlaid channels, or a three-up RGB parade.
    ///
    /// Parade ignores the channel mask; the sub-mode shows all three
    /// channels by definition.
    pub(crate) fn render(
        &mut self,
        surface: &mut RenderSurface<'_>,
        view: WaveformView,
        mask: ChannelMask,
        colors: &[[f32; 3]; 3],
        profile: &dyn ScopeProfile,
    ) {
        if !self.is_valid() {
            return;
        }
        self.remap(colors, profile);
        let full_width = surface.width();
        match view {
            WaveformView::Overlaid => {
                for ch in 0..3 {
                    if mask.shows(ch) {
                        self.blit_channel(surface, ch, 0, full_width);
                    }
                }
            }
            WaveformView::Parade => {
                for ch in 0..3 {
                    let x0 = ch * full_width / 3;
                    let x1 = (ch + 1) * full_width / 3;
                    self.blit_channel(surface, ch, x0, x1 - x0);
                }
            }
        }
    }

    /// Nearest-neighbor additive blit of one channel cache into a
    /// destination strip starting at `dest_x`, `dest_width` wide.
    fn blit_channel(
        &self,
        surface: &mut RenderSurface<'_>,
        ch: usize,
        dest_x: usize,
        dest_width: usize,
    ) {
        if dest_width == 0 {
            return;
        }
        let cache = &self.display_8bit[ch];
        let dest_height = surface.height();
        for dy in 0..dest_height {
            let sy = dy * self.height / dest_height.max(1);
            for dx in 0..dest_width {
                let sx = dx * self.width / dest_width;
                let idx = (sy * self.width + sx) * 4;
                let px = [cache[idx], cache[idx + 1], cache[idx + 2], cache[idx + 3]];
                surface.add_u8(dest_x + dx, dy, px, 0.5);
            }
        }
    }
}
