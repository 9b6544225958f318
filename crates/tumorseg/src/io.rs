//! Image file helpers built on the `image` crate.
//!
//! Any format `image` can decode loads as 8-bit gray. Raw `.bin` buffers are
//! headerless row-major bytes, so their dimensions come from the caller.

use std::path::Path;

use ::image::imageops::FilterType;
use ::image::{ImageReader, Luma, Rgb, RgbImage};
use tumorseg_core::{GrayImage, GrayImageView, LabelMap, IMG_HEIGHT, IMG_WIDTH};

use crate::error::SegmentError;
use crate::pipeline::gray_view_from_raw;

/// Mask pixels blend this much red into the input.
const OVERLAY_ALPHA: f32 = 0.4;

/// Borrow an `image::GrayImage` as a core view.
pub fn gray_view(img: &::image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

pub fn to_core_image(img: ::image::GrayImage) -> GrayImage {
    GrayImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.into_raw(),
    }
}

fn to_image_gray(img: &GrayImage) -> Result<::image::GrayImage, SegmentError> {
    let (w, h) = dims_u32(img.width, img.height)?;
    ::image::GrayImage::from_raw(w, h, img.data.clone()).ok_or(SegmentError::InvalidGrayBuffer {
        expected: img.pixel_count(),
        got: img.data.len(),
    })
}

fn dims_u32(width: usize, height: usize) -> Result<(u32, u32), SegmentError> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(SegmentError::InvalidGrayDimensions { width, height }),
    }
}

/// Decode an image file as 8-bit gray, resizing to the 256x256 working
/// frame when `resize` is set and the size differs.
pub fn load_gray(path: impl AsRef<Path>, resize: bool) -> Result<GrayImage, SegmentError> {
    let mut gray = ImageReader::open(path.as_ref())?
        .with_guessed_format()?
        .decode()?
        .to_luma8();
    if resize && (gray.width() as usize != IMG_WIDTH || gray.height() as usize != IMG_HEIGHT) {
        log::debug!(
            "resizing {}x{} -> {IMG_WIDTH}x{IMG_HEIGHT}",
            gray.width(),
            gray.height()
        );
        gray = ::image::imageops::resize(
            &gray,
            IMG_WIDTH as u32,
            IMG_HEIGHT as u32,
            FilterType::Triangle,
        );
    }
    Ok(to_core_image(gray))
}

/// Read a headerless row-major buffer of `width * height` bytes.
pub fn read_raw(
    path: impl AsRef<Path>,
    width: usize,
    height: usize,
) -> Result<GrayImage, SegmentError> {
    let data = std::fs::read(path)?;
    gray_view_from_raw(width, height, &data)?;
    Ok(GrayImage {
        width,
        height,
        data,
    })
}

pub fn write_raw(path: impl AsRef<Path>, img: &GrayImage) -> Result<(), SegmentError> {
    std::fs::write(path, &img.data)?;
    Ok(())
}

/// Save a gray image or mask; the format follows the file extension.
pub fn save_gray(path: impl AsRef<Path>, img: &GrayImage) -> Result<(), SegmentError> {
    to_image_gray(img)?.save(path)?;
    Ok(())
}

/// Input in gray with mask pixels tinted red (60% input, 40% red).
pub fn render_overlay(input: &GrayImage, mask: &GrayImage) -> Result<RgbImage, SegmentError> {
    if input.width != mask.width || input.height != mask.height {
        return Err(SegmentError::InvalidGrayDimensions {
            width: mask.width,
            height: mask.height,
        });
    }
    let (w, h) = dims_u32(input.width, input.height)?;
    Ok(RgbImage::from_fn(w, h, |x, y| {
        let v = input.get(x as usize, y as usize);
        if mask.get(x as usize, y as usize) == 0 {
            return Rgb([v, v, v]);
        }
        let keep = v as f32 * (1.0 - OVERLAY_ALPHA);
        let red = (keep + 255.0 * OVERLAY_ALPHA).round() as u8;
        let other = keep.round() as u8;
        Rgb([red, other, other])
    }))
}

pub fn save_overlay(
    path: impl AsRef<Path>,
    input: &GrayImage,
    mask: &GrayImage,
) -> Result<(), SegmentError> {
    render_overlay(input, mask)?.save(path)?;
    Ok(())
}

/// Label map as gray levels spread over `1..=255`; background stays black.
pub fn render_label_map(labels: &LabelMap) -> Result<::image::GrayImage, SegmentError> {
    let (w, h) = dims_u32(labels.width, labels.height)?;
    let max = labels.labels.iter().copied().max().unwrap_or(0).max(1) as u32;
    Ok(::image::GrayImage::from_fn(w, h, |x, y| {
        let l = labels.get(x as usize, y as usize) as u32;
        if l == 0 {
            Luma([0])
        } else {
            Luma([(l * 255 / max) as u8])
        }
    }))
}

pub fn save_label_map(path: impl AsRef<Path>, labels: &LabelMap) -> Result<(), SegmentError> {
    render_label_map(labels)?.save(path)?;
    Ok(())
}
