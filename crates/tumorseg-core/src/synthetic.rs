//! Deterministic synthetic scans with ground-truth masks.
//!
//! Generators use a 32-bit linear congruential generator so the same seed
//! produces the same frame on every platform.

use crate::image::{GrayImage, FOREGROUND, IMG_HEIGHT, IMG_WIDTH};

/// `state = state * 1103515245 + 12345`, sampling bits 16..24.
#[derive(Clone, Debug)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u8(&mut self) -> u8 {
        self.state = self.state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        ((self.state >> 16) & 0xFF) as u8
    }

    /// Uniform-ish sample in `[lo, lo + span)`.
    pub fn sample(&mut self, lo: u8, span: u8) -> u8 {
        if span == 0 {
            return lo;
        }
        lo.saturating_add(self.next_u8() % span)
    }
}

/// Filled disk with intensities `lo + rand % span`.
#[derive(Clone, Copy, Debug)]
pub struct Disk {
    pub cx: i64,
    pub cy: i64,
    pub radius: i64,
    pub lo: u8,
    pub span: u8,
}

impl Disk {
    #[inline]
    fn contains(&self, x: i64, y: i64) -> bool {
        let (dx, dy) = (x - self.cx, y - self.cy);
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// Scene description: a noisy background plus disks painted in order.
#[derive(Clone, Debug)]
pub struct Scene {
    pub width: usize,
    pub height: usize,
    pub background_lo: u8,
    pub background_span: u8,
    pub disks: Vec<Disk>,
    pub seed: u32,
}

impl Scene {
    /// Render the image and its ground-truth mask.
    ///
    /// One random draw is taken per pixel in row-major order, from the first
    /// disk containing the pixel or from the background.
    pub fn render(&self) -> (GrayImage, GrayImage) {
        let mut rng = Lcg::new(self.seed);
        let mut img = GrayImage::zeros(self.width, self.height);
        let mut truth = GrayImage::zeros(self.width, self.height);

        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                match self.disks.iter().find(|d| d.contains(x as i64, y as i64)) {
                    Some(d) => {
                        img.data[idx] = rng.sample(d.lo, d.span);
                        truth.data[idx] = FOREGROUND;
                    }
                    None => {
                        img.data[idx] = rng.sample(self.background_lo, self.background_span);
                    }
                }
            }
        }
        (img, truth)
    }
}

/// Centered disk of `radius` on a background, default 256x256 frame.
pub fn disk_on_uniform(
    background_lo: u8,
    background_span: u8,
    radius: i64,
    disk_lo: u8,
    disk_span: u8,
    seed: u32,
) -> (GrayImage, GrayImage) {
    Scene {
        width: IMG_WIDTH,
        height: IMG_HEIGHT,
        background_lo,
        background_span,
        disks: vec![Disk {
            cx: (IMG_WIDTH / 2) as i64,
            cy: (IMG_HEIGHT / 2) as i64,
            radius,
            lo: disk_lo,
            span: disk_span,
        }],
        seed,
    }
    .render()
}

/// Bright tumor (R = 25, 200..230) on a dark noisy background (30..45).
pub fn bright_circle() -> (GrayImage, GrayImage) {
    disk_on_uniform(30, 15, 25, 200, 30, 42)
}

/// Two blobs of different brightness on a dark background.
pub fn two_blobs() -> (GrayImage, GrayImage) {
    let (w, h) = (IMG_WIDTH as i64, IMG_HEIGHT as i64);
    Scene {
        width: IMG_WIDTH,
        height: IMG_HEIGHT,
        background_lo: 25,
        background_span: 20,
        disks: vec![
            Disk {
                cx: w / 3,
                cy: h / 2,
                radius: 20,
                lo: 210,
                span: 20,
            },
            Disk {
                cx: 2 * w / 3,
                cy: h / 2,
                radius: 18,
                lo: 180,
                span: 25,
            },
        ],
        seed: 77,
    }
    .render()
}

/// Mildly brighter tumor (R = 22, 100..120) on a noisy background (60..90).
pub fn low_contrast() -> (GrayImage, GrayImage) {
    disk_on_uniform(60, 30, 22, 100, 20, 99)
}
