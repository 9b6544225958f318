//! 4-connected component labeling with per-region metrics.
//!
//! Flood fill uses an explicit FIFO worklist sized to the frame, so auxiliary
//! memory is bounded by the pixel count regardless of region shape.

use serde::{Deserialize, Serialize};

use crate::image::GrayImage;

/// Default cap on the number of labeled regions.
pub const DEFAULT_MAX_REGIONS: u16 = 16;

/// Axis-aligned bounding box, inclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0 + 1
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0 + 1
    }
}

/// One connected foreground component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
    /// Label in `1..=max_regions`.
    pub label: u16,
    /// Pixel count, always > 0.
    pub area: u32,
    /// Integer centroid `(sum_x / area, sum_y / area)`.
    pub centroid: (u32, u32),
    pub bbox: BoundingBox,
}

/// Per-pixel region labels; 0 is background or unlabeled foreground.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelMap {
    pub width: usize,
    pub height: usize,
    pub labels: Vec<u16>,
}

impl LabelMap {
    fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            labels: vec![0; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u16 {
        self.labels[y * self.width + x]
    }

    /// Number of labeled pixels.
    pub fn labeled_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l != 0).count()
    }
}

/// Output of one labeling run.
#[derive(Clone, Debug)]
pub struct Labeling {
    pub regions: Vec<RegionInfo>,
    pub label_map: LabelMap,
    /// `true` when the region cap stopped the scan for new seeds.
    pub saturated: bool,
}

impl Labeling {
    /// Sum of region areas.
    pub fn total_foreground(&self) -> u64 {
        self.regions.iter().map(|r| r.area as u64).sum()
    }
}

/// FIFO of pixel indices with fixed capacity.
///
/// Every pixel is enqueued at most once per run (it is labeled on push), so a
/// capacity of one slot per pixel is never exceeded.
#[derive(Clone, Debug, Default)]
struct Worklist {
    buf: Vec<u32>,
    head: usize,
    tail: usize,
}

impl Worklist {
    fn reset(&mut self, capacity: usize) {
        if self.buf.len() < capacity {
            self.buf = vec![0; capacity];
        }
        self.head = 0;
        self.tail = 0;
    }

    #[inline]
    fn push(&mut self, idx: u32) {
        self.buf[self.tail] = idx;
        self.tail += 1;
    }

    #[inline]
    fn pop(&mut self) -> Option<u32> {
        if self.head == self.tail {
            return None;
        }
        let v = self.buf[self.head];
        self.head += 1;
        Some(v)
    }
}

struct RegionAccumulator {
    area: u64,
    sum_x: u64,
    sum_y: u64,
    bbox: BoundingBox,
}

impl RegionAccumulator {
    fn new(x: u32, y: u32) -> Self {
        Self {
            area: 0,
            sum_x: 0,
            sum_y: 0,
            bbox: BoundingBox {
                x0: x,
                y0: y,
                x1: x,
                y1: y,
            },
        }
    }

    #[inline]
    fn push(&mut self, x: u32, y: u32) {
        self.area += 1;
        self.sum_x += x as u64;
        self.sum_y += y as u64;
        self.bbox.x0 = self.bbox.x0.min(x);
        self.bbox.y0 = self.bbox.y0.min(y);
        self.bbox.x1 = self.bbox.x1.max(x);
        self.bbox.y1 = self.bbox.y1.max(y);
    }

    fn finish(self, label: u16) -> RegionInfo {
        RegionInfo {
            label,
            area: self.area as u32,
            centroid: (
                (self.sum_x / self.area) as u32,
                (self.sum_y / self.area) as u32,
            ),
            bbox: self.bbox,
        }
    }
}

/// Connected-component labeler with a reusable worklist.
#[derive(Clone, Debug)]
pub struct RegionLabeler {
    max_regions: usize,
    worklist: Worklist,
}

impl Default for RegionLabeler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REGIONS as usize)
    }
}

impl RegionLabeler {
    /// `max_regions` is clamped to the label range `1..=u16::MAX`.
    pub fn new(max_regions: usize) -> Self {
        Self {
            max_regions: max_regions.clamp(1, u16::MAX as usize),
            worklist: Worklist::default(),
        }
    }

    pub fn max_regions(&self) -> usize {
        self.max_regions
    }

    /// Label 4-connected nonzero regions of `mask` in row-major seed order.
    ///
    /// Once `max_regions` regions exist, no new seeds are started: remaining
    /// foreground pixels outside the discovered regions keep label 0. This is
    /// a capacity limit, not an error.
    pub fn label(&mut self, mask: &GrayImage) -> Labeling {
        let (w, h) = (mask.width, mask.height);
        let mut label_map = LabelMap::zeros(w, h);
        let mut regions = Vec::with_capacity(self.max_regions);
        let mut saturated = false;
        self.worklist.reset(w * h);

        for seed in 0..w * h {
            if mask.data[seed] == 0 || label_map.labels[seed] != 0 {
                continue;
            }
            if regions.len() >= self.max_regions {
                saturated = true;
                break;
            }

            let label = (regions.len() + 1) as u16;
            let mut acc = RegionAccumulator::new((seed % w) as u32, (seed / w) as u32);

            self.worklist.reset(w * h);
            self.worklist.push(seed as u32);
            label_map.labels[seed] = label;

            while let Some(p) = self.worklist.pop() {
                let p = p as usize;
                let (x, y) = (p % w, p / w);
                acc.push(x as u32, y as u32);

                let neighbours = [
                    (x > 0).then(|| p - 1),
                    (x + 1 < w).then(|| p + 1),
                    (y > 0).then(|| p - w),
                    (y + 1 < h).then(|| p + w),
                ];
                for n in neighbours.into_iter().flatten() {
                    if mask.data[n] != 0 && label_map.labels[n] == 0 {
                        label_map.labels[n] = label;
                        self.worklist.push(n as u32);
                    }
                }
            }

            regions.push(acc.finish(label));
        }

        if saturated {
            log::warn!(
                "region cap of {} reached; remaining foreground left unlabeled",
                self.max_regions
            );
        }

        Labeling {
            regions,
            label_map,
            saturated,
        }
    }
}
