//! Overlap scores between a predicted mask and a ground-truth mask.
//!
//! Nonzero cells are foreground. Two empty masks agree perfectly.

use crate::image::GrayImage;

struct Overlap {
    intersection: u64,
    pred: u64,
    truth: u64,
}

fn overlap(pred: &GrayImage, truth: &GrayImage) -> Overlap {
    debug_assert_eq!(pred.data.len(), truth.data.len());
    let mut o = Overlap {
        intersection: 0,
        pred: 0,
        truth: 0,
    };
    for (&p, &t) in pred.data.iter().zip(&truth.data) {
        let (p, t) = (p != 0, t != 0);
        o.intersection += (p && t) as u64;
        o.pred += p as u64;
        o.truth += t as u64;
    }
    o
}

/// Dice coefficient `2 |A n B| / (|A| + |B|)`.
pub fn dice(pred: &GrayImage, truth: &GrayImage) -> f64 {
    let o = overlap(pred, truth);
    let denom = o.pred + o.truth;
    if denom == 0 {
        return 1.0;
    }
    2.0 * o.intersection as f64 / denom as f64
}

/// Intersection over union `|A n B| / |A u B|`.
pub fn iou(pred: &GrayImage, truth: &GrayImage) -> f64 {
    let o = overlap(pred, truth);
    let union = o.pred + o.truth - o.intersection;
    if union == 0 {
        return 1.0;
    }
    o.intersection as f64 / union as f64
}
