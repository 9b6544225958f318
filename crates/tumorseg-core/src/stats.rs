//! Single-pass global image statistics.
//!
//! All quantities are integer and truncating so that every execution backend
//! reproduces the same values bit-for-bit.

use serde::{Deserialize, Serialize};

use crate::image::GrayImageView;

/// Upper bound on Newton iterations in [`isqrt`].
const ISQRT_MAX_ITERS: usize = 16;

/// Global statistics of one frame. Derived once, read-only afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageStatistics {
    pub mean: u8,
    pub std_dev: u8,
    /// `max - min`.
    pub contrast: u8,
    pub min: u8,
    pub max: u8,
}

/// Compute mean, standard deviation, contrast and extrema in one pass.
///
/// `mean = floor(sum / N)` and `variance = sum_sq / N - mean^2`, clamped to
/// zero when truncation makes the difference negative. The image must be
/// non-empty.
pub fn compute_statistics(img: &GrayImageView<'_>) -> ImageStatistics {
    let n = img.data.len() as u64;
    if n == 0 {
        return ImageStatistics::default();
    }

    let mut sum = 0u64;
    let mut sum_sq = 0u64;
    let mut min_v = u8::MAX;
    let mut max_v = u8::MIN;
    for &px in img.data {
        let v = px as u64;
        sum += v;
        sum_sq += v * v;
        min_v = min_v.min(px);
        max_v = max_v.max(px);
    }

    let mean = sum / n;
    let variance = (sum_sq / n).saturating_sub(mean * mean);
    let std_dev = isqrt(variance).min(u8::MAX as u64);

    ImageStatistics {
        mean: mean as u8,
        std_dev: std_dev as u8,
        contrast: max_v - min_v,
        min: min_v,
        max: max_v,
    }
}

/// Integer square root by Newton's method seeded at `value` itself.
///
/// The seed is never below the true root, so the iteration decreases
/// monotonically; it stops as soon as an update fails to decrease or after
/// 16 steps.
pub fn isqrt(value: u64) -> u64 {
    if value == 0 {
        return 0;
    }
    let mut s = value;
    for _ in 0..ISQRT_MAX_ITERS {
        let next = (s + value / s) / 2;
        if next >= s {
            break;
        }
        s = next;
    }
    s
}
