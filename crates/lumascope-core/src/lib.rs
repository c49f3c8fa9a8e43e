//! Lumascope Core — real-time scope analysis for image pipelines.
//!
//! This crate computes tone histograms, luminance waveforms, and
//! chromaticity vectorscopes from linear RGBA float buffers, and renders
//! them additively onto a caller-supplied RGBA8 surface. One engine is
//! shared between the pipeline thread producing frames and the display
//! thread drawing scopes; the engine serializes the two internally.

pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod profile;
pub mod roi;
pub mod scopes;
pub mod surface;
pub mod transfer;

// Re-exports for convenience.
pub use config::{HISTOGRAM_BINS, ScopeConfig};
pub use engine::ScopeEngine;
pub use error::ScopeError;
pub use profile::{ColorMatrix, MatrixProfile, ScopeProfile};
pub use roi::Roi;
pub use scopes::{ChannelMask, HistogramScale, ScopeMode, VectorscopeSpace, WaveformView};
pub use surface::RenderSurface;
