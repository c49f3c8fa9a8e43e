//! Host color-profile capability consumed by the engine.
//!
//! Profile loading and parsing belong to the host; the engine only needs
//! three operations from whatever profile is active. The trait object is
//! shared read-only across threads, so implementations must be `Send + Sync`.

use crate::transfer::{HlgTransfer, TransferFunction};

/// The opaque color capability handed to [`crate::ScopeEngine`].
pub trait ScopeProfile: Send + Sync {
    /// Forward transform from analysis RGB to CIE XYZ in the profile
    /// connection space (D50 standard illuminant).
    fn rgb_to_xyz(&self, rgb: [f32; 3]) -> [f32; 3];

    /// Map a linear-light value into the display working space. Applied
    /// per component during the waveform display remap; not guaranteed
    /// bounded, callers clamp after.
    fn display_encode(&self, linear: f32) -> f32;

    /// Convert one pipeline RGB pixel into the analysis color space.
    /// Identity by default: the input is already in the analysis space.
    fn to_analysis(&self, rgb: [f32; 3]) -> [f32; 3] {
        rgb
    }

    /// Whether [`Self::to_analysis`] is a non-identity transform. When
    /// true, `process` converts the whole buffer before binning.
    fn converts_input(&self) -> bool {
        false
    }
}

/// A 3x3 color matrix for linear color space conversions.
#[derive(Debug, Clone, Copy)]
pub struct ColorMatrix(pub [[f32; 3]; 3]);

impl ColorMatrix {
    /// Returns the identity matrix (no-op transform).
    pub fn identity() -> Self {
        Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Apply this matrix to an RGB triplet.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let m = &self.0;
        [
            m[0][0] * rgb[0] + m[0][1] * rgb[1] + m[0][2] * rgb[2],
            m[1][0] * rgb[0] + m[1][1] * rgb[1] + m[1][2] * rgb[2],
            m[2][0] * rgb[0] + m[2][1] * rgb[1] + m[2][2] * rgb[2],
        ]
    }
}

/// Matrix-based [`ScopeProfile`] for well-behaved RGB working spaces.
///
/// Wraps a linear RGB → XYZ(D50) matrix plus a display transfer function
/// for the waveform remap (HLG unless overridden).
pub struct MatrixProfile {
    to_xyz: ColorMatrix,
    display: Box<dyn TransferFunction>,
}

impl MatrixProfile {
    /// Profile from an RGB → XYZ(D50) matrix, HLG display encoding.
    pub fn new(to_xyz: ColorMatrix) -> Self {
        Self { to_xyz, display: Box::new(HlgTransfer) }
    }

    /// Replace the display transfer function.
    pub fn with_display(mut self, display: Box<dyn TransferFunction>) -> Self {
        self.display = display;
        self
    }

    /// sRGB primaries, D50-adapted (ICC PCS convention).
    pub fn srgb() -> Self {
        Self::new(ColorMatrix([
            [0.436_074_7, 0.385_064_9, 0.143_080_4],
            [0.222_504_5, 0.716_878_6, 0.060_616_9],
            [0.013_932_2, 0.097_104_5, 0.714_173_3],
        ]))
    }
}

impl ScopeProfile for MatrixProfile {
    fn rgb_to_xyz(&self, rgb: [f32; 3]) -> [f32; 3] {
        self.to_xyz.apply(rgb)
    }

    fn display_encode(&self, linear: f32) -> f32 {
        self.display.to_encoded(linear)
    }
}
