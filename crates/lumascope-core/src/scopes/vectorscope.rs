//! Chromaticity vectorscope projection, density accumulation, rendering.
//!
//! Each pixel is projected through the profile connection space into a
//! 2-D chromaticity plane (lightness discarded), then accumulated into a
//! square density grid. A six-point graticule marks where the pure
//! primaries and secondaries project under the active space.

use glam::Vec2;
use rayon::prelude::*;

use crate::color::{xyy_to_luv, xyz_d50_to_d65, xyz_to_jzazbz, xyz_to_xyy};
use crate::config::ScopeConfig;
use crate::profile::ScopeProfile;
use crate::roi::Roi;
use crate::scopes::VectorscopeSpace;
use crate::surface::RenderSurface;

// Gamma shaping applied to accumulated density before 8-bit quantization.
// Tuned display constant, do not derive.
const DENSITY_GAMMA: f32 = 1.0 / 1.5;

/// Full-intensity primaries and secondaries, in graticule order
/// R, G, B, C, M, Y.
const REFERENCE_RGB: [[f32; 3]; 6] = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 0.0],
];

// Display colors for the graticule dots, same order.
const GRATICULE_COLORS: [[f32; 3]; 6] = [
    [1.0, 0.25, 0.2],
    [0.25, 0.95, 0.25],
    [0.3, 0.5, 1.0],
    [0.2, 0.9, 0.9],
    [0.95, 0.3, 0.95],
    [0.95, 0.9, 0.25],
];

/// Project one RGB pixel to its 2-D chromaticity under `space`.
///
/// The forward transform lands in XYZ with a D50 white (the profile
/// connection space). CIELUV projects from there directly; JzAzBz first
/// adapts to the D65 display illuminant. Both discard lightness.
fn chromaticity(rgb: [f32; 3], profile: &dyn ScopeProfile, space: VectorscopeSpace) -> Vec2 {
    let xyz_d50 = profile.rgb_to_xyz(rgb);
    match space {
        VectorscopeSpace::Cieluv => {
            let luv = xyy_to_luv(xyz_to_xyy(xyz_d50));
            Vec2::new(luv[1], luv[2])
        }
        VectorscopeSpace::JzAzBz => {
            let jab = xyz_to_jzazbz(xyz_d50_to_d65(xyz_d50));
            Vec2::new(jab[1], jab[2])
        }
    }
}

/// Square chromaticity density grid plus reference graticule.
///
/// `graticule[0].x` is NaN while no vectorscope has been computed; any
/// consumer must check [`VectorscopeData::is_valid`] before trusting the
/// density buffer.
#[derive(Debug, Clone)]
pub struct VectorscopeData {
    /// Side of the square density grid.
    pub diameter: usize,
    density: Vec<u8>,
    graticule: [Vec2; 6],
}

impl VectorscopeData {
    /// Allocate a zeroed grid with the cleared-state sentinel set.
    pub fn new(config: &ScopeConfig) -> Self {
        Self {
            diameter: config.vectorscope_diameter,
            density: vec![0; config.vectorscope_diameter * config.vectorscope_diameter],
            graticule: [Vec2::new(f32::NAN, 0.0); 6],
        }
    }

    /// Set the cleared-state sentinel. The density buffer is left as-is;
    /// consumers gate on [`Self::is_valid`].
    pub fn clear(&mut self) {
        self.graticule[0].x = f32::NAN;
    }

    /// Whether a completed pass is available to draw.
    pub fn is_valid(&self) -> bool {
        !self.graticule[0].x.is_nan()
    }

    /// Normalized graticule points (R, G, B, C, M, Y); the farthest point
    /// from the origin sits at radius 1.
    pub fn graticule(&self) -> [Vec2; 6] {
        self.graticule
    }

    /// Shaped 8-bit density at a grid cell.
    pub fn density(&self, x: usize, y: usize) -> u8 {
        self.density[y * self.diameter + x]
    }

    /// Project and accumulate every ROI pixel into the density grid.
    ///
    /// The graticule is re-projected first (6 points, cheap) and its
    /// maximum radius becomes the grid scale. Samples projecting outside
    /// the grid are discarded, not clamped, to avoid bright edge
    /// artifacts. Accumulation runs as a parallel fold/reduce: workers
    /// own private grids and merge by addition, so no cell is ever
    /// written concurrently.
    pub(crate) fn collect(
        &mut self,
        input: &[f32],
        roi: &Roi,
        space: VectorscopeSpace,
        profile: &dyn ScopeProfile,
    ) {
        let diameter = self.diameter;
        let cells = diameter * diameter;

        // Graticule: feed the reference colors through the same projection.
        let mut points = [Vec2::ZERO; 6];
        let mut max_diam = 0.0f32;
        for (point, rgb) in points.iter_mut().zip(REFERENCE_RGB) {
            *point = chromaticity(rgb, profile, space);
            max_diam = max_diam.max(point.length());
        }
        for point in &mut points {
            *point /= max_diam;
        }

        let pixel_count = roi.sample_count().max(1);
        let scale = 4.0 * cells as f32 / (pixel_count as f32 * 255.0);
        let diameter_f = diameter as f32;

        let binned = roi
            .y_range()
            .into_par_iter()
            .fold(
                || vec![0.0f32; cells],
                |mut grid, in_y| {
                    for in_x in roi.x_range() {
                        let px = &input[4 * (roi.width * in_y + in_x)..];
                        let c = chromaticity([px[0], px[1], px[2]], profile, space);
                        let out_x = diameter_f * (c.x / max_diam + 0.5);
                        let out_y = diameter_f * (c.y / max_diam + 0.5);
                        if out_x >= 0.0 && out_x < diameter_f && out_y >= 0.0 && out_y < diameter_f
                        {
                            grid[out_y as usize * diameter + out_x as usize] += scale;
                        }
                    }
                    grid
                },
            )
            .reduce(
                || vec![0.0f32; cells],
                |mut a, b| {
                    for (acc, v) in a.iter_mut().zip(b) {
                        *acc += v;
                    }
                    a
                },
            );

        // Gamma-shape and quantize. Clamped: dense cells can exceed 1.0.
        for (out, bin) in self.density.iter_mut().zip(binned) {
            *out = (bin.powf(DENSITY_GAMMA) * 255.0).clamp(0.0, 255.0) as u8;
        }
        self.graticule = points;
    }

    /// Draw the density mask and graticule dots into the centered square
    /// of side `min(width, height)`. The vertical axis is flipped so +v
    /// points up, as chromaticity diagrams are conventionally drawn.
    pub(crate) fn render(&self, surface: &mut RenderSurface<'_>) {
        if !self.is_valid() {
            return;
        }
        let (width, height) = (surface.width(), surface.height());
        let side = width.min(height);
        if side == 0 {
            return;
        }
        let x0 = (width - side) / 2;
        let y0 = (height - side) / 2;

        // Density as a white-alpha mask.
        for sy in 0..side {
            let gy = (side - 1 - sy) * self.diameter / side;
            for sx in 0..side {
                let gx = sx * self.diameter / side;
                let alpha = self.density[gy * self.diameter + gx] as f32 / 255.0;
                if alpha > 0.0 {
                    surface.add(x0 + sx, y0 + sy, [1.0, 1.0, 1.0], alpha * 0.7);
                }
            }
        }

        // Graticule dots: primaries slightly larger than secondaries.
        let center_x = width as f32 / 2.0;
        let center_y = height as f32 / 2.0;
        let radius_scale = side as f32 / 2.0;
        for (k, point) in self.graticule.iter().enumerate() {
            let dot_x = center_x + point.x * radius_scale;
            let dot_y = center_y - point.y * radius_scale;
            let dot_r = side as f32 / if k < 3 { 40.0 } else { 60.0 };
            let alpha = if k < 3 { 0.7 } else { 0.5 };
            fill_dot(surface, dot_x, dot_y, dot_r, GRATICULE_COLORS[k], alpha);
        }
    }
}

/// Fill a small disc, clipped to the surface.
fn fill_dot(surface: &mut RenderSurface<'_>, cx: f32, cy: f32, radius: f32, rgb: [f32; 3], alpha: f32) {
    let r = radius.ceil() as i64;
    let (icx, icy) = (cx as i64, cy as i64);
    for dy in -r..=r {
        for dx in -r..=r {
            if (dx * dx + dy * dy) as f32 <= radius * radius {
                let (x, y) = (icx + dx, icy + dy);
                if x >= 0 && y >= 0 {
                    surface.add(x as usize, y as usize, rgb, alpha);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::MatrixProfile;

    fn data() -> VectorscopeData {
        VectorscopeData::new(&ScopeConfig::default())
    }

    fn constant_buffer(count: usize, rgb: [f32; 3]) -> Vec<f32> {
        let mut buf = Vec::with_capacity(count * 4);
        for _ in 0..count {
            buf.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 1.0]);
        }
        buf
    }

    #[test]
    fn test_graticule_normalized_to_unit_radius() {
        let profile = MatrixProfile::srgb();
        for space in [VectorscopeSpace::Cieluv, VectorscopeSpace::JzAzBz] {
            let mut vs = data();
            let input = constant_buffer(4, [0.5, 0.5, 0.5]);
            vs.collect(&input, &Roi::full(2, 2), space, &profile);
            let max_radius = vs
                .graticule()
                .iter()
                .map(|p| p.length())
                .fold(0.0f32, f32::max);
            assert!((max_radius - 1.0).abs() < 1e-5, "{space:?}: {max_radius}");
        }
    }

    #[test]
    fn test_projection_spaces_produce_different_graticules() {
        let profile = MatrixProfile::srgb();
        let input = constant_buffer(4, [0.5, 0.5, 0.5]);

        let mut luv = data();
        luv.collect(&input, &Roi::full(2, 2), VectorscopeSpace::Cieluv, &profile);
        let mut jab = data();
        jab.collect(&input, &Roi::full(2, 2), VectorscopeSpace::JzAzBz, &profile);

        let differs = luv
            .graticule()
            .iter()
            .zip(jab.graticule())
            .any(|(a, b)| (*a - b).length() > 1e-3);
        assert!(differs);
    }

    #[test]
    fn test_neutral_pixels_accumulate_near_center() {
        let profile = MatrixProfile::srgb();
        let mut vs = data();
        let input = constant_buffer(64, [0.5, 0.5, 0.5]);
        vs.collect(&input, &Roi::full(8, 8), VectorscopeSpace::Cieluv, &profile);
        assert!(vs.is_valid());

        let d = vs.diameter;
        let center: u32 = (d / 2 - 2..d / 2 + 2)
            .flat_map(|y| (d / 2 - 2..d / 2 + 2).map(move |x| (x, y)))
            .map(|(x, y)| vs.density(x, y) as u32)
            .sum();
        assert!(center > 0, "neutral density should cluster at the grid center");
    }

    #[test]
    fn test_clear_sets_sentinel_and_keeps_density() {
        let profile = MatrixProfile::srgb();
        let mut vs = data();
        let input = constant_buffer(64, [0.9, 0.2, 0.2]);
        vs.collect(&input, &Roi::full(8, 8), VectorscopeSpace::Cieluv, &profile);
        assert!(vs.is_valid());

        let before: Vec<u8> = (0..vs.diameter).map(|x| vs.density(x, vs.diameter / 2)).collect();
        vs.clear();
        assert!(!vs.is_valid());
        assert!(vs.graticule()[0].x.is_nan());
        let after: Vec<u8> = (0..vs.diameter).map(|x| vs.density(x, vs.diameter / 2)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_render_skips_cleared_scope() {
        let vs = data();
        let mut buf = vec![0u8; 16 * 16 * 4];
        let mut surface = RenderSurface::new(&mut buf, 16, 16).unwrap();
        vs.render(&mut surface);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_render_draws_graticule_after_pass() {
        let profile = MatrixProfile::srgb();
        let mut vs = data();
        let input = constant_buffer(16, [1.0, 0.1, 0.1]);
        vs.collect(&input, &Roi::full(4, 4), VectorscopeSpace::Cieluv, &profile);

        let mut buf = vec![0u8; 64 * 64 * 4];
        let mut surface = RenderSurface::new(&mut buf, 64, 64).unwrap();
        vs.render(&mut surface);
        assert!(buf.iter().any(|&b| b > 0));
    }
}
