//! High-level facade for adaptive tumor segmentation.
//!
//! This crate provides:
//! - re-exports of the algorithms in `tumorseg-core`
//! - execution backends for the threshold stage (host loop and offloaded worker)
//! - a pipeline driver that compares the accelerated run against a host baseline
//! - (feature-gated) image file I/O and the `tumorseg` command-line tool
//!
//! ## Quickstart
//!
//! ```
//! use tumorseg::{SegmentationPipeline, PipelineParams};
//! use tumorseg::core::synthetic;
//!
//! # fn main() -> Result<(), tumorseg::SegmentError> {
//! let (img, _truth) = synthetic::bright_circle();
//! let mut pipeline = SegmentationPipeline::new(PipelineParams::default());
//! let result = pipeline.segment(&img.view())?;
//! println!("mode {} with {} region(s)", result.mode, result.regions.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `tumorseg::core`: image types, statistics, thresholding, morphology, labeling.
//! - `tumorseg::backend`: [`ExecutionBackend`] with [`HostBackend`] and [`OffloadBackend`].
//! - `tumorseg::pipeline`: [`SegmentationPipeline`] and its result types.
//! - `tumorseg::io` (feature `image`): load, save, overlay and raw `.bin` helpers.

pub use tumorseg_core as core;

pub use tumorseg_core::{
    compute_statistics, dice, iou, select_mode, GrayImage, GrayImageView, ImageStatistics,
    PerformanceReport, PowerProfile, ProcessingMode, RegionInfo,
};

pub mod backend;
mod error;
pub mod params;
pub mod pipeline;

#[cfg(feature = "image")]
pub mod io;

pub use backend::{CycleClock, ExecutionBackend, HostBackend, HostClock, OffloadBackend, StageRun};
pub use error::{BackendError, SegmentError};
pub use params::{BackendKind, ParseBackendError, PipelineParams};
pub use pipeline::{
    gray_view_from_raw, SegmentationPipeline, SegmentationResult, SegmentationSummary,
};
