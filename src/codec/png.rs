// src/codec/png.rs

//! Two-dimensional PNG import/export.
//!
//! Loading produces the pair of images the two operations want: a padded
//! copy for dilation (room to accrete outward) and an unpadded copy for
//! erosion.  White pixels are foreground.  Saving strips the padding
//! recorded on the image's size, so outputs line up with the source
//! image regardless of which copy was transformed.

use std::path::Path;

use image::GrayImage;
use log::debug;

use crate::geom::{Position, PositionIterator, Size};
use crate::image::{BinaryImage, GrayscaleImage};
use crate::utils::error::{MorphError, Result};

const FOREGROUND_THRESHOLD: u8 = 128;

/// Padding applied on every side of the dilation copy: the whole largest
/// axis for tiny images, 1.5% of it otherwise.
fn padding_for(maximum: i64) -> i64 {
    if maximum < 100 {
        maximum
    } else {
        15 * maximum / 1000
    }
}

/// Decodes a bilevel PNG into `(image_d, image_e)`: the padded dilation
/// copy and the unpadded erosion copy.
pub fn load_binary_image<P: AsRef<Path>>(path: P) -> Result<(BinaryImage, BinaryImage)> {
    let decoded = image::open(path.as_ref())?.to_luma8();
    let width = decoded.width() as i64;
    let height = decoded.height() as i64;
    if width < 1 || height < 1 {
        return Err(MorphError::LengthNotPositive);
    }
    let padding = padding_for(width.max(height));
    debug!(
        "loaded {}x{} bilevel image, dilation padding {}",
        width, height, padding
    );
    let size_d = Size::with_padding(&[width + 2 * padding, height + 2 * padding], padding)?;
    let size_e = Size::from_lengths(&[width, height])?;
    let mut image_d = BinaryImage::new(&size_d, true)?;
    let mut image_e = BinaryImage::new(&size_e, true)?;
    let mut p = Position::origin(2)?;
    let mut padded = Position::origin(2)?;
    for y in 0..height {
        for x in 0..width {
            let foreground = decoded.get_pixel(x as u32, y as u32).0[0] >= FOREGROUND_THRESHOLD;
            if !foreground {
                continue;
            }
            p.set_value(0, x)?;
            p.set_value(1, y)?;
            image_e.set_value(&p, true)?;
            padded.set_value(0, x + padding)?;
            padded.set_value(1, y + padding)?;
            image_d.set_value(&padded, true)?;
        }
    }
    Ok((image_d, image_e))
}

fn unpadded_lengths(size: &Size) -> Result<(i64, i64, i64)> {
    if size.dim() != 2 {
        return Err(MorphError::DimensionMismatch {
            expected: 2,
            actual: size.dim(),
        });
    }
    let padding = size.padding();
    let width = size.length(0)? - 2 * padding;
    let height = size.length(1)? - 2 * padding;
    if width < 1 || height < 1 {
        return Err(MorphError::LengthNotPositive);
    }
    Ok((width, height, padding))
}

/// Writes a binary image as a black-and-white PNG, padding stripped.
pub fn save_binary_image<P: AsRef<Path>>(path: P, source: &BinaryImage) -> Result<()> {
    let (width, height, padding) = unpadded_lengths(source.size())?;
    let mut output = GrayImage::new(width as u32, height as u32);
    let mut p = Position::origin(2)?;
    for y in 0..height {
        for x in 0..width {
            p.set_value(0, x + padding)?;
            p.set_value(1, y + padding)?;
            if source.value(&p)? {
                output.put_pixel(x as u32, y as u32, image::Luma([255]));
            }
        }
    }
    output.save(path.as_ref())?;
    Ok(())
}

/// Writes a residues image as an 8-bit grayscale PNG, padding stripped.
/// Pixel level is the residue plus one, so "never foreground" is black
/// and later iterations are brighter.
pub fn save_grayscale_image<P: AsRef<Path>>(path: P, source: &GrayscaleImage) -> Result<()> {
    let (width, height, padding) = unpadded_lengths(source.size())?;
    let mut output = GrayImage::new(width as u32, height as u32);
    let mut p = Position::origin(2)?;
    for y in 0..height {
        for x in 0..width {
            p.set_value(0, x + padding)?;
            p.set_value(1, y + padding)?;
            let level = (source.value(&p)? + 1).clamp(0, 255) as u8;
            output.put_pixel(x as u32, y as u32, image::Luma([level]));
        }
    }
    output.save(path.as_ref())?;
    Ok(())
}
