//! Transfer function (OETF/EOTF) implementations for display encoding.
//!
//! The waveform display remap pushes linear accumulation values through one
//! of these before 8-bit quantization, so shadow detail stays visible.

/// A transfer function that converts between linear and non-linear encodings.
pub trait TransferFunction: Send + Sync {
    /// Convert from non-linear (encoded) to linear light.
    fn to_linear(&self, encoded: f32) -> f32;

    /// Convert from linear light to non-linear (encoded).
    fn to_encoded(&self, linear: f32) -> f32;
}

// ---------------------------------------------------------------------------
// sRGB (IEC 61966-2-1)
// ---------------------------------------------------------------------------

/// sRGB transfer function per IEC 61966-2-1.
///
/// ```text
/// to_linear:   V <= 0.04045 → V / 12.92
///              V >  0.04045 → ((V + 0.055) / 1.055) ^ 2.4
///
/// from_linear: L <= 0.0031308 → L × 12.92
///              L >  0.0031308 → 1.055 × L^(1/2.4) − 0.055
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SrgbTransfer;

impl TransferFunction for SrgbTransfer {
    fn to_linear(&self, encoded: f32) -> f32 {
        if encoded <= 0.04045 {
            encoded / 12.92
        } else {
            ((encoded + 0.055) / 1.055).powf(2.4)
        }
    }

    fn to_encoded(&self, linear: f32) -> f32 {
        if linear <= 0.0031308 {
            linear * 12.92
        } else {
            1.055 * linear.powf(1.0 / 2.4) - 0.055
        }
    }
}

// ---------------------------------------------------------------------------
// Hybrid Log-Gamma (ITU-R BT.2100)
// ---------------------------------------------------------------------------

/// Hybrid Log-Gamma OETF per ITU-R BT.2100.
///
/// This is the default waveform display encoding: its log segment keeps
/// sparse accumulation values from vanishing into black.
///
/// ```text
/// to_encoded: L <= 1/12 → sqrt(3 × L)
///             L >  1/12 → a × ln(12 × L − b) + c
///
/// to_linear:  E <= 0.5 → E² / 3
///             E >  0.5 → (e^((E − c) / a) + b) / 12
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HlgTransfer;

impl HlgTransfer {
    const A: f32 = 0.178_832_77;
    const B: f32 = 0.284_668_92;
    const C: f32 = 0.559_910_73;
}

impl TransferFunction for HlgTransfer {
    fn to_linear(&self, encoded: f32) -> f32 {
        if encoded <= 0.5 {
            encoded * encoded / 3.0
        } else {
            (((encoded - Self::C) / Self::A).exp() + Self::B) / 12.0
        }
    }

    fn to_encoded(&self, linear: f32) -> f32 {
        if linear <= 1.0 / 12.0 {
            (3.0 * linear.max(0.0)).sqrt()
        } else {
            Self::A * (12.0 * linear - Self::B).ln() + Self::C
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn assert_roundtrip(tf: &dyn TransferFunction, values: &[f32]) {
        for &v in values {
            let encoded = tf.to_encoded(v);
            let back = tf.to_linear(encoded);
            assert!(
                (v - back).abs() < EPSILON,
                "roundtrip failed for {v}: encoded={encoded}, back={back}, diff={}",
                (v - back).abs()
            );
        }
    }

    #[test]
    fn test_srgb_roundtrip_preserves_values() {
        assert_roundtrip(&SrgbTransfer, &[0.0, 0.001, 0.01, 0.1, 0.5, 0.9, 1.0]);
    }

    #[test]
    fn test_hlg_roundtrip_preserves_values() {
        assert_roundtrip(&HlgTransfer, &[0.0, 0.001, 0.01, 0.1, 0.5, 0.9, 1.0]);
    }

    #[test]
    fn test_hlg_known_values() {
        // Segment boundary: E = 0.5 at L = 1/12.
        assert!((HlgTransfer.to_encoded(1.0 / 12.0) - 0.5).abs() < EPSILON);
        // Reference white encodes to 1.0.
        assert!((HlgTransfer.to_encoded(1.0) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_hlg_lifts_shadows_above_linear() {
        // The point of the log encoding: small values draw brighter.
        for &v in &[0.01, 0.05, 0.1] {
            assert!(HlgTransfer.to_encoded(v) > v);
        }
    }
}
