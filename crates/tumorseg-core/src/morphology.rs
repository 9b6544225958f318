//! 3x3 binary morphology.
//!
//! Erosion ignores out-of-frame neighbours (equivalent to padding with 255),
//! dilation ignores them as well (padding with 0), so the frame edge never
//! erodes or grows a region by itself.

use crate::image::GrayImage;
use crate::mode::ProcessingMode;

#[derive(Clone, Copy)]
enum Extremum {
    Min,
    Max,
}

fn filter_3x3(src: &GrayImage, dst: &mut GrayImage, op: Extremum) {
    debug_assert_eq!(src.width, dst.width);
    debug_assert_eq!(src.height, dst.height);
    let (w, h) = (src.width, src.height);
    let init = match op {
        Extremum::Min => u8::MAX,
        Extremum::Max => u8::MIN,
    };

    for y in 0..h {
        let y0 = y.saturating_sub(1);
        let y1 = (y + 1).min(h - 1);
        for x in 0..w {
            let x0 = x.saturating_sub(1);
            let x1 = (x + 1).min(w - 1);
            let mut acc = init;
            for yy in y0..=y1 {
                let row = &src.data[yy * w + x0..=yy * w + x1];
                for &v in row {
                    acc = match op {
                        Extremum::Min => acc.min(v),
                        Extremum::Max => acc.max(v),
                    };
                }
            }
            dst.data[y * w + x] = acc;
        }
    }
}

/// 3x3 minimum filter.
pub fn erode_3x3(src: &GrayImage, dst: &mut GrayImage) {
    filter_3x3(src, dst, Extremum::Min);
}

/// 3x3 maximum filter.
pub fn dilate_3x3(src: &GrayImage, dst: &mut GrayImage) {
    filter_3x3(src, dst, Extremum::Max);
}

/// Morphology operator with a reusable scratch buffer of the mask size.
#[derive(Clone, Debug)]
pub struct Morphology {
    scratch: GrayImage,
}

impl Morphology {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            scratch: GrayImage::zeros(width, height),
        }
    }

    fn fit(&mut self, mask: &GrayImage) {
        if self.scratch.width != mask.width || self.scratch.height != mask.height {
            self.scratch = GrayImage::zeros(mask.width, mask.height);
        }
    }

    /// Erosion followed by dilation, in place. Removes specks smaller than 3x3.
    pub fn open(&mut self, mask: &mut GrayImage) {
        if mask.data.is_empty() {
            return;
        }
        self.fit(mask);
        erode_3x3(mask, &mut self.scratch);
        dilate_3x3(&self.scratch, mask);
    }

    /// Dilation followed by erosion, in place. Fills holes smaller than 3x3.
    pub fn close(&mut self, mask: &mut GrayImage) {
        if mask.data.is_empty() {
            return;
        }
        self.fit(mask);
        dilate_3x3(mask, &mut self.scratch);
        erode_3x3(&self.scratch, mask);
    }

    /// Mode policy: `Normal` and `Careful` open once, `Careful` then closes once.
    pub fn apply_for_mode(&mut self, mask: &mut GrayImage, mode: ProcessingMode) {
        if mode >= ProcessingMode::Normal {
            self.open(mask);
        }
        if mode == ProcessingMode::Careful {
            self.close(mask);
        }
    }
}
