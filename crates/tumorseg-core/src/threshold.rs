//! Histogram-based threshold selection and binarization.
//!
//! The Otsu search works on integer class means and carries the between-class
//! variance in `u128`, so it cannot overflow for any frame size a `u64` pixel
//! count can describe.

use crate::image::{GrayImage, GrayImageView, BACKGROUND, FOREGROUND};
use crate::mode::ProcessingMode;
use crate::stats::ImageStatistics;

/// Number of intensity bins.
pub const NUM_BINS: usize = 256;

/// 256-bin intensity histogram. `total()` always equals the pixel count of the
/// image it was built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
    counts: [u64; NUM_BINS],
}

impl Histogram {
    pub fn from_image(img: &GrayImageView<'_>) -> Self {
        let mut counts = [0u64; NUM_BINS];
        for &v in img.data {
            counts[v as usize] += 1;
        }
        Self { counts }
    }

    /// Build directly from bin counts.
    pub fn from_counts(counts: [u64; NUM_BINS]) -> Self {
        Self { counts }
    }

    #[inline]
    pub fn counts(&self) -> &[u64; NUM_BINS] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Number of samples strictly brighter than `threshold`.
    pub fn count_above(&self, threshold: u8) -> u64 {
        self.counts[threshold as usize + 1..].iter().sum()
    }

    /// Otsu threshold of this histogram.
    ///
    /// Candidates with an empty background are skipped and the sweep stops at
    /// the first candidate with an empty foreground. Ties keep the lower
    /// threshold. An empty or single-valued histogram yields 0.
    pub fn otsu_threshold(&self) -> u8 {
        let total = self.total();
        let sum_total: u64 = self
            .counts
            .iter()
            .enumerate()
            .map(|(i, &h)| i as u64 * h)
            .sum();

        let mut w_b = 0u64;
        let mut sum_b = 0u64;
        let mut best_var = 0u128;
        let mut best_t = 0u8;

        for (t, &h) in self.counts.iter().enumerate() {
            w_b += h;
            if w_b == 0 {
                continue;
            }
            let w_f = total - w_b;
            if w_f == 0 {
                break;
            }

            sum_b += t as u64 * h;
            let sum_f = sum_total - sum_b;

            let mean_b = sum_b / w_b;
            let mean_f = sum_f / w_f;
            let diff = mean_b.abs_diff(mean_f) as u128;

            let var_between = w_b as u128 * w_f as u128 * diff * diff;
            if var_between > best_var {
                best_var = var_between;
                best_t = t as u8;
            }
        }

        best_t
    }
}

/// Outcome of the mode-aware threshold search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdDecision {
    /// Threshold to binarize with.
    pub threshold: u8,
    /// Plain Otsu result before any fallback.
    pub otsu_threshold: u8,
    /// `true` when the strict statistics-derived threshold replaced Otsu.
    pub fallback_applied: bool,
}

/// Strict threshold `mean + 3 * std_dev / 5`, clamped to `[1, 255]`.
pub fn strict_threshold(stats: &ImageStatistics) -> u8 {
    let t = stats.mean as u32 + (3 * stats.std_dev as u32) / 5;
    t.clamp(1, 255) as u8
}

/// Pick the binarization threshold for `mode`.
///
/// In `Careful` mode an Otsu threshold that leaves more than a fifth of the
/// pixels (`N / 5`, integer division) in the foreground is considered too
/// permissive and replaced by [`strict_threshold`].
pub fn select_threshold(
    hist: &Histogram,
    stats: &ImageStatistics,
    mode: ProcessingMode,
) -> ThresholdDecision {
    let otsu = hist.otsu_threshold();
    let mut decision = ThresholdDecision {
        threshold: otsu,
        otsu_threshold: otsu,
        fallback_applied: false,
    };

    if mode == ProcessingMode::Careful {
        let above = hist.count_above(otsu);
        let limit = hist.total() / 5;
        if above > limit {
            decision.threshold = strict_threshold(stats);
            decision.fallback_applied = true;
            log::debug!(
                "otsu threshold {otsu} keeps {above} px above limit {limit}, using strict {}",
                decision.threshold
            );
        }
    }

    decision
}

/// Write `255` where `img > threshold` and `0` elsewhere.
pub fn binarize_into(img: &GrayImageView<'_>, threshold: u8, out: &mut [u8]) {
    debug_assert_eq!(img.data.len(), out.len());
    for (dst, &src) in out.iter_mut().zip(img.data) {
        *dst = if src > threshold {
            FOREGROUND
        } else {
            BACKGROUND
        };
    }
}

/// Allocating variant of [`binarize_into`].
pub fn binarize(img: &GrayImageView<'_>, threshold: u8) -> GrayImage {
    let mut mask = GrayImage::zeros(img.width, img.height);
    binarize_into(img, threshold, &mut mask.data);
    mask
}
