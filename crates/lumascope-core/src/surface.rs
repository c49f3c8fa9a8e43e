//! Caller-supplied RGBA8 render target.
//!
//! The host paints its own background and grid first; scope renders only
//! add light on top, so an empty scope leaves the surface untouched.

use crate::error::ScopeError;

/// Mutable view over a row-major, 4-byte-per-pixel RGBA buffer.
pub struct RenderSurface<'a> {
    pixels: &'a mut [[u8; 4]],
    width: usize,
    height: usize,
}

impl<'a> RenderSurface<'a> {
    /// Wrap a packed RGBA8 buffer of exactly `width * height * 4` bytes.
    pub fn new(pixels: &'a mut [u8], width: usize, height: usize) -> Result<Self, ScopeError> {
        let expected = width * height * 4;
        if pixels.len() != expected {
            return Err(ScopeError::SurfaceSize { expected, actual: pixels.len() });
        }
        Ok(Self { pixels: bytemuck::cast_slice_mut(pixels), width, height })
    }

    /// Surface width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Surface height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Additively blend `rgb` (linear [0,1]) at `alpha` into one pixel.
    /// Saturates per channel; out-of-bounds coordinates are ignored.
    pub(crate) fn add(&mut self, x: usize, y: usize, rgb: [f32; 3], alpha: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let px = &mut self.pixels[y * self.width + x];
        for k in 0..3 {
            let v = (rgb[k].clamp(0.0, 1.0) * alpha * 255.0) as u8;
            px[k] = px[k].saturating_add(v);
        }
        px[3] = px[3].saturating_add((alpha * 255.0) as u8);
    }

    /// Additively blend an already-quantized RGBA pixel at `alpha`.
    pub(crate) fn add_u8(&mut self, x: usize, y: usize, rgba: [u8; 4], alpha: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let px = &mut self.pixels[y * self.width + x];
        for k in 0..4 {
            px[k] = px[k].saturating_add((rgba[k] as f32 * alpha) as u8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_length() {
        let mut buf = vec![0u8; 10];
        assert!(RenderSurface::new(&mut buf, 2, 2).is_err());
    }

    #[test]
    fn test_add_is_saturating() {
        let mut buf = vec![0u8; 4];
        let mut surface = RenderSurface::new(&mut buf, 1, 1).unwrap();
        surface.add(0, 0, [1.0, 0.0, 0.0], 1.0);
        surface.add(0, 0, [1.0, 0.0, 0.0], 1.0);
        assert_eq!(buf[0], 255);
        assert_eq!(buf[1], 0);
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut buf = vec![0u8; 4];
        let mut surface = RenderSurface::new(&mut buf, 1, 1).unwrap();
        surface.add(5, 0, [1.0, 1.0, 1.0], 1.0);
        assert_eq!(buf, vec![0u8; 4]);
    }
}
