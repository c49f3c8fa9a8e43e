//! Chromaticity conversions used by the vectorscope projection.
//!
//! Inputs arrive in the profile connection space (CIE XYZ, D50 standard
//! illuminant). The CIELUV path works directly from D50; the JzAzBz path
//! first adapts to D65, the display reference illuminant.
//!
//! Constants come straight from the published standards.

/// CIE XYZ to xyY. Degenerate (all-zero) input maps to the origin.
pub fn xyz_to_xyy(xyz: [f32; 3]) -> [f32; 3] {
    let sum = xyz[0] + xyz[1] + xyz[2];
    if sum <= 0.0 {
        return [0.0, 0.0, 0.0];
    }
    [xyz[0] / sum, xyz[1] / sum, xyz[1]]
}

// D50 reference white in u'v', from XYZ (0.9642, 1.0, 0.8249).
const D50_U_PRIME: f32 = 0.209_166_7;
const D50_V_PRIME: f32 = 0.488_098_8;

/// xyY to CIELUV (1976 L\*u\*v\*), D50 reference white.
///
/// Returns `[L*, u*, v*]`; the vectorscope keeps only `u*`/`v*`.
pub fn xyy_to_luv(xyy: [f32; 3]) -> [f32; 3] {
    const THRESHOLD: f32 = 216.0 / 24389.0;
    const KAPPA: f32 = 24389.0 / 27.0;

    let y = xyy[2];
    let l = if y <= THRESHOLD { KAPPA * y } else { 116.0 * y.cbrt() - 16.0 };

    let den = -2.0 * xyy[0] + 12.0 * xyy[1] + 3.0;
    if den <= 0.0 {
        return [l, 0.0, 0.0];
    }
    let u_prime = 4.0 * xyy[0] / den;
    let v_prime = 9.0 * xyy[1] / den;

    [l, 13.0 * l * (u_prime - D50_U_PRIME), 13.0 * l * (v_prime - D50_V_PRIME)]
}

/// Bradford chromatic adaptation from D50 (PCS) to D65 (display) white.
pub fn xyz_d50_to_d65(xyz: [f32; 3]) -> [f32; 3] {
    const M: [[f32; 3]; 3] = [
        [0.955_576_6, -0.023_039_3, 0.063_163_6],
        [-0.028_289_5, 1.009_941_6, 0.021_007_7],
        [0.012_298_2, -0.020_483_0, 1.329_909_8],
    ];
    mat3_mul(&M, xyz)
}

/// CIE XYZ (D65) to JzAzBz, per Safdar et al. 2017.
///
/// Returns `[Jz, az, bz]`; the vectorscope keeps only `az`/`bz`.
pub fn xyz_to_jzazbz(xyz_d65: [f32; 3]) -> [f32; 3] {
    const B: f32 = 1.15;
    const G: f32 = 0.66;
    const C1: f32 = 3424.0 / 4096.0;
    const C2: f32 = 2413.0 / 128.0;
    const C3: f32 = 2392.0 / 128.0;
    const N: f32 = 2610.0 / 16384.0;
    const P: f32 = 1.7 * 2523.0 / 32.0;
    const D: f32 = -0.56;
    const D0: f32 = 1.629_549_953_282_156_6e-11;
    const XYZ_TO_LMS: [[f32; 3]; 3] = [
        [0.414_789_72, 0.579_999, 0.014_648_0],
        [-0.201_510_0, 1.120_649, 0.053_100_8],
        [-0.016_600_8, 0.264_800, 0.668_479_9],
    ];
    const LMS_TO_IAB: [[f32; 3]; 3] = [
        [0.5, 0.5, 0.0],
        [3.524_000, -4.066_708, 0.542_708],
        [0.199_076, 1.096_799, -1.295_875],
    ];

    // Pre-adaptation sharpens the blue/yellow response.
    let xyz_prime = [
        B * xyz_d65[0] - (B - 1.0) * xyz_d65[2],
        G * xyz_d65[1] - (G - 1.0) * xyz_d65[0],
        xyz_d65[2],
    ];

    let mut lms = mat3_mul(&XYZ_TO_LMS, xyz_prime);
    for v in &mut lms {
        // PQ-style nonlinearity, absolute scale 10000 cd/m².
        let y = (v.max(0.0) / 10000.0).powf(N);
        *v = ((C1 + C2 * y) / (1.0 + C3 * y)).powf(P);
    }

    let iab = mat3_mul(&LMS_TO_IAB, lms);
    let jz = ((1.0 + D) * iab[0]) / (1.0 + D * iab[0]) - D0;
    [jz, iab[1], iab[2]]
}

fn mat3_mul(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const D50_WHITE: [f32; 3] = [0.9642, 1.0, 0.8249];

    #[test]
    fn test_d50_white_is_achromatic_in_luv() {
        let luv = xyy_to_luv(xyz_to_xyy(D50_WHITE));
        assert!((luv[0] - 100.0).abs() < 0.01);
        assert!(luv[1].abs() < 0.05, "u* = {}", luv[1]);
        assert!(luv[2].abs() < 0.05, "v* = {}", luv[2]);
    }

    #[test]
    fn test_adapted_d50_white_is_achromatic_in_jzazbz() {
        let jab = xyz_to_jzazbz(xyz_d50_to_d65(D50_WHITE));
        assert!(jab[0] > 0.0);
        // az/bz chroma should be small relative to Jz for a neutral color.
        assert!(jab[1].abs() < 0.05 * jab[0]);
        assert!(jab[2].abs() < 0.05 * jab[0]);
    }

    #[test]
    fn test_jz_is_monotonic_in_luminance() {
        let dark = xyz_to_jzazbz([0.1, 0.1, 0.1]);
        let bright = xyz_to_jzazbz([0.8, 0.8, 0.8]);
        assert!(bright[0] > dark[0]);
    }

    #[test]
    fn test_zero_xyz_maps_to_origin() {
        assert_eq!(xyz_to_xyy([0.0, 0.0, 0.0]), [0.0, 0.0, 0.0]);
        let luv = xyy_to_luv([0.0, 0.0, 0.0]);
        assert_eq!(luv, [0.0, 0.0, 0.0]);
    }
}
