//! Scope engine: owns the scope buffers and the lock serializing
//! producer (`process`) against consumer (`render`).
//!
//! One pipeline thread calls [`ScopeEngine::process`] per frame while a
//! display thread calls [`ScopeEngine::render`]; both take the same
//! internal mutex for their whole pass, so the display never observes a
//! half-updated scope. Anything that does not need the buffers, such as
//! the optional input color conversion, runs before the lock is taken.

use std::time::Instant;

use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::debug;

use crate::config::ScopeConfig;
use crate::error::ScopeError;
use crate::profile::ScopeProfile;
use crate::roi::Roi;
use crate::scopes::{
    ChannelMask, HistogramData, HistogramScale, ScopeMode, VectorscopeData, VectorscopeSpace,
    WaveformData, WaveformView,
};
use crate::surface::RenderSurface;

/// Everything guarded by the engine mutex: the three scope buffers plus
/// the mode selection, so a mode switch can never race a running pass.
struct ScopeState {
    mode: ScopeMode,
    histogram_scale: HistogramScale,
    waveform_view: WaveformView,
    vectorscope_space: VectorscopeSpace,
    channels: ChannelMask,
    histogram: HistogramData,
    waveform: WaveformData,
    vectorscope: VectorscopeData,
}

/// Thread-safe scope analysis engine.
///
/// Created once from a [`ScopeConfig`]; all scope buffers are allocated
/// here and reused for every frame.
pub struct ScopeEngine {
    config: ScopeConfig,
    state: Mutex<ScopeState>,
}

impl ScopeEngine {
    /// Allocate an engine with cleared scopes.
    pub fn new(config: ScopeConfig) -> Self {
        let state = ScopeState {
            mode: config.mode,
            histogram_scale: config.histogram_scale,
            waveform_view: config.waveform_view,
            vectorscope_space: config.vectorscope_space,
            channels: config.channels,
            histogram: HistogramData::new(),
            waveform: WaveformData::new(&config),
            vectorscope: VectorscopeData::new(&config),
        };
        Self { config, state: Mutex::new(state) }
    }

    /// Analyze one frame into the currently selected scope.
    ///
    /// `input` is a packed row-major RGBA f32 buffer of `roi.width *
    /// roi.height` pixels; `None` clears all scopes (the pipeline emits
    /// that when its preview is invalidated). Only the selected scope is
    /// recomputed; the other two keep whatever they held, which is why
    /// `render` checks per-scope validity rather than engine state.
    ///
    /// The vectorscope cannot run without a profile; that pass degrades
    /// to a no-op and whatever the scope held before stays displayed.
    pub fn process(
        &self,
        input: Option<&[f32]>,
        roi: Roi,
        profile: Option<&dyn ScopeProfile>,
    ) -> Result<(), ScopeError> {
        let Some(input) = input else {
            self.clear();
            return Ok(());
        };
        let roi = roi.clamped();
        let expected = roi.width * roi.height * 4;
        if input.len() < expected {
            return Err(ScopeError::InputSize { expected, actual: input.len() });
        }
        let input = &input[..expected];

        // Whole-buffer conversion into the analysis space, outside the
        // lock. The scratch buffer is frame-sized, so its allocation is
        // the one fallible path.
        let converted = match profile {
            Some(p) if p.converts_input() => Some(convert_to_analysis(input, p)?),
            _ => None,
        };
        let input = converted.as_deref().unwrap_or(input);

        let start = Instant::now();
        let mut guard = self.state.lock();
        let state = &mut *guard;
        match state.mode {
            ScopeMode::Histogram => state.histogram.collect(input, &roi),
            ScopeMode::Waveform => state.waveform.collect(input, &roi),
            ScopeMode::Vectorscope => match profile {
                Some(p) => state.vectorscope.collect(input, &roi, state.vectorscope_space, p),
                None => debug!("no profile active, skipping vectorscope pass"),
            },
        }
        debug!(
            mode = state.mode.label(),
            pixels = roi.sample_count(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "scope pass"
        );
        Ok(())
    }

    /// Draw the selected scope onto a host-prepared surface.
    ///
    /// Rendering is purely additive; if the selected scope holds no
    /// completed pass the surface is left untouched. `profile` supplies
    /// the display encoding for the waveform remap.
    pub fn render(&self, surface: &mut RenderSurface<'_>, profile: &dyn ScopeProfile) {
        let colors = &self.config.channel_colors;
        let mut guard = self.state.lock();
        let state = &mut *guard;
        match state.mode {
            ScopeMode::Histogram => {
                state.histogram.render(surface, state.histogram_scale, state.channels, colors);
            }
            ScopeMode::Waveform => {
                state.waveform.render(surface, state.waveform_view, state.channels, colors, profile);
            }
            ScopeMode::Vectorscope => state.vectorscope.render(surface),
        }
    }

    /// Invalidate all three scopes. Counters zero, waveform and
    /// vectorscope flagged as holding nothing to draw.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.histogram.clear();
        state.waveform.clear();
        state.vectorscope.clear();
    }

    // ------------------------------------------------------------------
    // Mode selection
    // ------------------------------------------------------------------

    /// Currently selected scope.
    pub fn mode(&self) -> ScopeMode {
        self.state.lock().mode
    }

    /// Select which scope `process` computes and `render` draws.
    pub fn set_mode(&self, mode: ScopeMode) {
        self.state.lock().mode = mode;
    }

    /// Cycle to the next scope and return it.
    pub fn cycle_mode(&self) -> ScopeMode {
        let mut state = self.state.lock();
        state.mode = state.mode.next();
        state.mode
    }

    /// Switch the histogram display scale. Bin counts are untouched.
    pub fn set_histogram_scale(&self, scale: HistogramScale) {
        self.state.lock().histogram_scale = scale;
    }

    /// Switch between overlaid waveform and RGB parade.
    pub fn set_waveform_view(&self, view: WaveformView) {
        self.state.lock().waveform_view = view;
    }

    /// Switch the vectorscope chromaticity space. Takes effect on the
    /// next `process` pass.
    pub fn set_vectorscope_space(&self, space: VectorscopeSpace) {
        self.state.lock().vectorscope_space = space;
    }

    /// Set channel visibility for histogram and overlaid waveform.
    pub fn set_channels(&self, channels: ChannelMask) {
        self.state.lock().channels = channels;
    }

    // ------------------------------------------------------------------
    // Snapshot accessors
    // ------------------------------------------------------------------

    /// Whether the selected scope holds a completed pass.
    pub fn has_data(&self) -> bool {
        let state = self.state.lock();
        match state.mode {
            ScopeMode::Histogram => state.histogram.peak > 0,
            ScopeMode::Waveform => state.waveform.is_valid(),
            ScopeMode::Vectorscope => state.vectorscope.is_valid(),
        }
    }

    /// Peak histogram bin count across the color channels.
    pub fn histogram_peak(&self) -> u32 {
        self.state.lock().histogram.peak
    }

    /// Copy of one channel's histogram bins.
    pub fn histogram_bins(&self, channel: usize) -> Vec<u32> {
        self.state.lock().histogram.bins[channel].clone()
    }

    /// Binned width of the last waveform pass; 0 when cleared.
    pub fn waveform_width(&self) -> usize {
        self.state.lock().waveform.width
    }

    /// Copy of the used region of the linear waveform buffer.
    pub fn waveform_linear(&self) -> Vec<f32> {
        let state = self.state.lock();
        let w = &state.waveform;
        (0..w.width)
            .flat_map(|x| (0..w.height).flat_map(move |y| (0..4).map(move |k| (x, y, k))))
            .map(|(x, y, k)| w.value(x, y, k))
            .collect()
    }

    /// Graticule of the last vectorscope pass. `[0].x` is NaN when no
    /// pass has completed.
    pub fn vectorscope_graticule(&self) -> [glam::Vec2; 6] {
        self.state.lock().vectorscope.graticule()
    }
}

/// Convert a packed RGBA buffer into the analysis space through the
/// profile. Alpha passes through untouched.
fn convert_to_analysis(input: &[f32], profile: &dyn ScopeProfile) -> Result<Vec<f32>, ScopeError> {
    let mut converted: Vec<f32> = Vec::new();
    converted
        .try_reserve_exact(input.len())
        .map_err(|_| ScopeError::Allocation { bytes: input.len() * size_of::<f32>() })?;
    converted.resize(input.len(), 0.0);
    converted
        .par_chunks_mut(4)
        .zip(input.par_chunks(4))
        .for_each(|(dst, src)| {
            let rgb = profile.to_analysis([src[0], src[1], src[2]]);
            dst[..3].copy_from_slice(&rgb);
            dst[3] = src[3];
        });
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::MatrixProfile;

    fn constant_buffer(count: usize, rgb: [f32; 3]) -> Vec<f32> {
        let mut buf = Vec::with_capacity(count * 4);
        for _ in 0..count {
            buf.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 1.0]);
        }
        buf
    }

    #[test]
    fn test_process_only_touches_selected_scope() {
        let engine = ScopeEngine::new(ScopeConfig::default());
        let input = constant_buffer(16, [0.5, 0.5, 0.5]);

        engine.set_mode(ScopeMode::Histogram);
        engine.process(Some(&input), Roi::full(4, 4), None).unwrap();
        assert_eq!(engine.histogram_peak(), 16);
        assert_eq!(engine.waveform_width(), 0);
        assert!(engine.vectorscope_graticule()[0].x.is_nan());
    }

    #[test]
    fn test_none_input_clears_all_scopes() {
        let engine = ScopeEngine::new(ScopeConfig::default());
        let input = constant_buffer(16, [0.5, 0.5, 0.5]);
        let profile = MatrixProfile::srgb();

        for mode in [ScopeMode::Histogram, ScopeMode::Waveform, ScopeMode::Vectorscope] {
            engine.set_mode(mode);
            engine.process(Some(&input), Roi::full(4, 4), Some(&profile)).unwrap();
            assert!(engine.has_data());
        }
        engine.process(None, Roi::full(4, 4), None).unwrap();
        for mode in [ScopeMode::Histogram, ScopeMode::Waveform, ScopeMode::Vectorscope] {
            engine.set_mode(mode);
            assert!(!engine.has_data());
        }
    }

    #[test]
    fn test_short_input_is_rejected_and_data_survives() {
        let engine = ScopeEngine::new(ScopeConfig::default());
        let input = constant_buffer(16, [0.25, 0.25, 0.25]);
        engine.process(Some(&input), Roi::full(4, 4), None).unwrap();
        assert_eq!(engine.histogram_peak(), 16);

        let err = engine.process(Some(&input), Roi::full(8, 8), None).unwrap_err();
        assert!(matches!(err, ScopeError::InputSize { expected: 256, actual: 64 }));
        assert_eq!(engine.histogram_peak(), 16);
    }

    #[test]
    fn test_vectorscope_without_profile_keeps_previous_pass() {
        let engine = ScopeEngine::new(ScopeConfig::default());
        let input = constant_buffer(16, [0.8, 0.2, 0.2]);
        let profile = MatrixProfile::srgb();

        engine.set_mode(ScopeMode::Vectorscope);
        assert!(!engine.has_data());
        engine.process(Some(&input), Roi::full(4, 4), None).unwrap();
        assert!(!engine.has_data());

        engine.process(Some(&input), Roi::full(4, 4), Some(&profile)).unwrap();
        assert!(engine.has_data());
        let graticule = engine.vectorscope_graticule();

        engine.process(Some(&input), Roi::full(4, 4), None).unwrap();
        assert!(engine.has_data());
        assert_eq!(engine.vectorscope_graticule(), graticule);
    }

    #[test]
    fn test_scale_toggle_preserves_counts() {
        let engine = ScopeEngine::new(ScopeConfig::default());
        let input = constant_buffer(16, [0.2, 0.4, 0.6]);
        engine.process(Some(&input), Roi::full(4, 4), None).unwrap();

        let before: Vec<Vec<u32>> = (0..3).map(|ch| engine.histogram_bins(ch)).collect();
        engine.set_histogram_scale(HistogramScale::Linear);
        engine.set_histogram_scale(HistogramScale::Logarithmic);
        let after: Vec<Vec<u32>> = (0..3).map(|ch| engine.histogram_bins(ch)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_cycle_mode_wraps() {
        let engine = ScopeEngine::new(ScopeConfig::default());
        assert_eq!(engine.mode(), ScopeMode::Histogram);
        engine.cycle_mode();
        engine.cycle_mode();
        assert_eq!(engine.mode(), ScopeMode::Vectorscope);
        assert_eq!(engine.cycle_mode(), ScopeMode::Histogram);
    }

    #[test]
    fn test_render_matches_selected_scope() {
        let engine = ScopeEngine::new(ScopeConfig::default());
        let input = constant_buffer(64, [0.9, 0.9, 0.9]);
        let profile = MatrixProfile::srgb();

        engine.set_mode(ScopeMode::Waveform);
        engine.process(Some(&input), Roi::full(8, 8), Some(&profile)).unwrap();

        let mut buf = vec![0u8; 32 * 32 * 4];
        let mut surface = RenderSurface::new(&mut buf, 32, 32).unwrap();
        engine.render(&mut surface, &profile);
        assert!(buf.iter().any(|&b| b > 0));

        // Histogram was never computed; switching to it draws nothing.
        engine.set_mode(ScopeMode::Histogram);
        let mut buf = vec![0u8; 32 * 32 * 4];
        let mut surface = RenderSurface::new(&mut buf, 32, 32).unwrap();
        engine.render(&mut surface, &profile);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_input_conversion_is_applied() {
        struct Halving;
        impl ScopeProfile for Halving {
            fn rgb_to_xyz(&self, rgb: [f32; 3]) -> [f32; 3] {
                rgb
            }
            fn display_encode(&self, linear: f32) -> f32 {
                linear
            }
            fn to_analysis(&self, rgb: [f32; 3]) -> [f32; 3] {
                [rgb[0] * 0.5, rgb[1] * 0.5, rgb[2] * 0.5]
            }
            fn converts_input(&self) -> bool {
                true
            }
        }

        let engine = ScopeEngine::new(ScopeConfig::default());
        let input = constant_buffer(4, [1.0, 1.0, 1.0]);
        engine.process(Some(&input), Roi::full(2, 2), Some(&Halving)).unwrap();
        // 0.5 * 255 = 127.5, floor 127.
        assert_eq!(engine.histogram_bins(0)[127], 4);
    }

    #[test]
    fn test_readers_never_observe_torn_histograms() {
        // A profile that deliberately slows conversion down so writer
        // passes overlap with reader snapshots.
        struct Slow;
        impl ScopeProfile for Slow {
            fn rgb_to_xyz(&self, rgb: [f32; 3]) -> [f32; 3] {
                rgb
            }
            fn display_encode(&self, linear: f32) -> f32 {
                linear
            }
            fn to_analysis(&self, rgb: [f32; 3]) -> [f32; 3] {
                std::thread::yield_now();
                rgb
            }
            fn converts_input(&self) -> bool {
                true
            }
        }

        let engine = ScopeEngine::new(ScopeConfig::default());
        let frame_a = constant_buffer(64, [0.5, 0.5, 0.5]);
        let frame_b = constant_buffer(64, [0.25, 0.25, 0.25]);
        engine.process(Some(&frame_a), Roi::full(8, 8), Some(&Slow)).unwrap();

        // 0.5 -> bin 127, 0.25 -> bin 63; a consistent snapshot has all
        // 64 counts in exactly one of the two.
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..50 {
                        let bins = engine.histogram_bins(0);
                        let a = bins[127];
                        let b = bins[63];
                        assert!(
                            (a == 64 && b == 0) || (a == 0 && b == 64),
                            "torn snapshot: bin127={a} bin63={b}"
                        );
                    }
                });
            }
            s.spawn(|| {
                for i in 0..50 {
                    let frame = if i % 2 == 0 { &frame_b } else { &frame_a };
                    engine.process(Some(frame), Roi::full(8, 8), Some(&Slow)).unwrap();
                }
            });
        });
    }
}
