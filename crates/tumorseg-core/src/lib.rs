//! Core types and algorithms for adaptive tumor segmentation.
//!
//! The crate is purely computational: it takes an 8-bit grayscale frame and
//! produces statistics, a processing mode, a cleaned binary mask, labeled
//! regions, and a time/energy comparison of two execution paths. It does no
//! I/O and knows nothing about where a stage physically runs.
//!
//! Pipeline, leaves first:
//! 1. [`compute_statistics`]: mean, standard deviation, contrast, extrema.
//! 2. [`select_mode`]: `Fast`, `Normal` or `Careful` from the statistics.
//! 3. [`ThresholdStage`]: histogram, Otsu search with the `Careful`
//!    fallback, binarization, mode-dependent open/close.
//! 4. [`RegionLabeler`]: 4-connected components with area, centroid and
//!    bounding box, capped at a fixed region count.
//! 5. [`PerformanceReport`]: speedup and energy savings from cycle counts.

mod image;
mod labeling;
mod logger;
mod metrics;
mod mode;
mod morphology;
mod performance;
mod stage;
mod stats;
pub mod synthetic;
mod threshold;

pub use image::{
    GrayImage, GrayImageView, BACKGROUND, FOREGROUND, IMG_HEIGHT, IMG_SIZE, IMG_WIDTH,
};
pub use labeling::{
    BoundingBox, LabelMap, Labeling, RegionInfo, RegionLabeler, DEFAULT_MAX_REGIONS,
};
pub use metrics::{dice, iou};
pub use mode::{
    select_mode, ParseModeError, ProcessingMode, FAST_MIN_CONTRAST, FAST_MIN_STD_DEV,
    NORMAL_MIN_CONTRAST, NORMAL_MIN_STD_DEV,
};
pub use morphology::{dilate_3x3, erode_3x3, Morphology};
pub use performance::{PerformanceReport, PowerProfile};
pub use stage::{ThresholdStage, ThresholdStageOutput};
pub use stats::{compute_statistics, isqrt, ImageStatistics};
pub use threshold::{
    binarize, binarize_into, select_threshold, strict_threshold, Histogram, ThresholdDecision,
    NUM_BINS,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
