//! Engine error type.
//!
//! Degenerate inputs (empty ROI, absent profile, NaN pixel values) are
//! handled by defined clamp/skip/no-op policies and never surface here.
//! Only conditions that abort an in-flight pass become errors; previously
//! computed scope data stays intact when a pass fails.

/// Errors that can abort a `process` or `render` call.
#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    /// Failed to allocate a working buffer; the pass is abandoned and the
    /// previous scope contents remain valid.
    #[error("failed to allocate {bytes} byte scope working buffer")]
    Allocation {
        /// Requested allocation size.
        bytes: usize,
    },
    /// The input pixel buffer is smaller than the ROI describes.
    #[error("input buffer holds {actual} floats, ROI requires {expected}")]
    InputSize {
        /// Floats required by the ROI (`width * height * 4`).
        expected: usize,
        /// Floats actually supplied.
        actual: usize,
    },
    /// The render target is smaller than its stated dimensions.
    #[error("render surface holds {actual} bytes, dimensions require {expected}")]
    SurfaceSize {
        /// Bytes required (`width * height * 4`).
        expected: usize,
        /// Bytes actually supplied.
        actual: usize,
    },
}
