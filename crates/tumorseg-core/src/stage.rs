//! The threshold stage: histogram, threshold choice, binarization and
//! mode-dependent cleanup.
//!
//! This is the unit of work an execution backend runs and times. Every
//! backend calls [`ThresholdStage::run`], so their outputs are identical by
//! construction.

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::image::{GrayImage, GrayImageView};
use crate::mode::ProcessingMode;
use crate::morphology::Morphology;
use crate::stats::ImageStatistics;
use crate::threshold::{binarize_into, select_threshold, Histogram};

/// Result record of one threshold stage run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThresholdStageOutput {
    /// Binary mask after morphology, cells in `{0, 255}`.
    pub mask: GrayImage,
    /// Threshold actually applied.
    pub threshold: u8,
    /// Otsu threshold before the `Careful` fallback.
    pub otsu_threshold: u8,
    pub fallback_applied: bool,
    /// Nonzero mask cells after morphology.
    pub foreground_pixels: u64,
    pub mode_used: ProcessingMode,
}

impl ThresholdStageOutput {
    /// Same threshold decision and identical mask.
    pub fn agrees_with(&self, other: &ThresholdStageOutput) -> bool {
        self.threshold == other.threshold
            && self.mode_used == other.mode_used
            && self.mask == other.mask
    }
}

/// Threshold stage with buffers reused between frames of the same size.
#[derive(Clone, Debug)]
pub struct ThresholdStage {
    morphology: Morphology,
}

impl Default for ThresholdStage {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl ThresholdStage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            morphology: Morphology::new(width, height),
        }
    }

    /// Run the stage on `img` in `mode`.
    ///
    /// `stats` must describe `img`; it only feeds the `Careful` fallback.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, img, stats), fields(width = img.width, height = img.height, mode = %mode))
    )]
    pub fn run(
        &mut self,
        img: &GrayImageView<'_>,
        stats: &ImageStatistics,
        mode: ProcessingMode,
    ) -> ThresholdStageOutput {
        let hist = Histogram::from_image(img);
        let decision = select_threshold(&hist, stats, mode);

        let mut mask = GrayImage::zeros(img.width, img.height);
        binarize_into(img, decision.threshold, &mut mask.data);
        self.morphology.apply_for_mode(&mut mask, mode);

        let foreground_pixels = mask.count_nonzero() as u64;
        log::debug!(
            "threshold stage: mode={mode} otsu={} applied={} fallback={} fg={foreground_pixels}",
            decision.otsu_threshold,
            decision.threshold,
            decision.fallback_applied
        );

        ThresholdStageOutput {
            mask,
            threshold: decision.threshold,
            otsu_threshold: decision.otsu_threshold,
            fallback_applied: decision.fallback_applied,
            foreground_pixels,
            mode_used: mode,
        }
    }
}
