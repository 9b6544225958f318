//! Lightweight 8-bit grayscale buffers shared by every pipeline stage.

/// Default frame width of the segmentation target.
pub const IMG_WIDTH: usize = 256;
/// Default frame height of the segmentation target.
pub const IMG_HEIGHT: usize = 256;
/// Pixel count of a default frame.
pub const IMG_SIZE: usize = IMG_WIDTH * IMG_HEIGHT;

/// Mask value marking a foreground pixel.
pub const FOREGROUND: u8 = 255;
/// Mask value marking a background pixel.
pub const BACKGROUND: u8 = 0;

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

impl<'a> GrayImageView<'a> {
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Copy the view into an owned buffer.
    pub fn to_owned_image(&self) -> GrayImage {
        GrayImage {
            width: self.width,
            height: self.height,
            data: self.data.to_vec(),
        }
    }
}

/// Owned row-major gray buffer.
///
/// Binary masks use the same type with every cell in `{0, 255}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    /// Image of the given size filled with `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Black image of the given size.
    pub fn zeros(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0)
    }

    #[inline]
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.width + x] = value;
    }

    /// Number of nonzero cells.
    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}
