//! Region of interest delimiting the analyzed part of a pixel buffer.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// The sub-rectangle of a source buffer to analyze.
///
/// `crop_x`/`crop_y` are offsets from the left/top edge; `crop_width`/
/// `crop_height` are margins trimmed from the right/bottom edge. A zero
/// crop on all sides means "whole buffer". Crop bounds are clamped into
/// `[0, width] × [0, height]` by [`Roi::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Roi {
    /// Source buffer width in pixels.
    pub width: usize,
    /// Source buffer height in pixels.
    pub height: usize,
    /// Left crop offset.
    pub crop_x: usize,
    /// Top crop offset.
    pub crop_y: usize,
    /// Margin trimmed from the right edge.
    pub crop_width: usize,
    /// Margin trimmed from the bottom edge.
    pub crop_height: usize,
}

impl Roi {
    /// ROI covering the whole buffer.
    pub fn full(width: usize, height: usize) -> Self {
        Self { width, height, ..Self::default() }
    }

    /// Clamp crop bounds so the analyzed rectangle stays within the buffer.
    pub fn clamped(self) -> Self {
        let crop_x = self.crop_x.min(self.width);
        let crop_y = self.crop_y.min(self.height);
        Self {
            crop_x,
            crop_y,
            crop_width: self.crop_width.min(self.width - crop_x),
            crop_height: self.crop_height.min(self.height - crop_y),
            ..self
        }
    }

    /// Width of the effective analyzed rectangle, never zero.
    pub fn sample_width(&self) -> usize {
        (self.width.saturating_sub(self.crop_width).saturating_sub(self.crop_x)).max(1)
    }

    /// Height of the effective analyzed rectangle, never zero.
    pub fn sample_height(&self) -> usize {
        (self.height.saturating_sub(self.crop_height).saturating_sub(self.crop_y)).max(1)
    }

    /// Analyzed column range. Empty if the crop consumes the full width.
    pub fn x_range(&self) -> Range<usize> {
        self.crop_x..self.width.saturating_sub(self.crop_width).max(self.crop_x)
    }

    /// Analyzed row range. Empty if the crop consumes the full height.
    pub fn y_range(&self) -> Range<usize> {
        self.crop_y..self.height.saturating_sub(self.crop_height).max(self.crop_y)
    }

    /// Number of pixels inside the analyzed rectangle.
    pub fn sample_count(&self) -> usize {
        self.x_range().len() * self.y_range().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_roi_covers_whole_buffer() {
        let roi = Roi::full(640, 480);
        assert_eq!(roi.x_range(), 0..640);
        assert_eq!(roi.y_range(), 0..480);
        assert_eq!(roi.sample_count(), 640 * 480);
    }

    #[test]
    fn test_crop_margins_shrink_ranges() {
        let roi = Roi { width: 100, height: 50, crop_x: 10, crop_y: 5, crop_width: 20, crop_height: 15 };
        assert_eq!(roi.x_range(), 10..80);
        assert_eq!(roi.y_range(), 5..35);
        assert_eq!(roi.sample_width(), 70);
        assert_eq!(roi.sample_height(), 30);
    }

    #[test]
    fn test_clamped_limits_out_of_bounds_crop() {
        let roi = Roi { width: 100, height: 50, crop_x: 150, crop_y: 10, crop_width: 30, crop_height: 100 }
            .clamped();
        assert_eq!(roi.crop_x, 100);
        assert_eq!(roi.crop_width, 0);
        assert_eq!(roi.crop_height, 40);
        assert!(roi.x_range().is_empty());
    }

    #[test]
    fn test_sample_extent_never_zero() {
        let roi = Roi { width: 10, height: 10, crop_x: 10, crop_y: 10, crop_width: 0, crop_height: 0 };
        assert_eq!(roi.sample_width(), 1);
        assert_eq!(roi.sample_height(), 1);
        assert_eq!(roi.sample_count(), 0);
    }
}
