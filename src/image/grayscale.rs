// src/image/grayscale.rs

//! The residues image: one signed integer per pixel over an origin-based
//! size.  The morphology engine records in each cell the iteration at
//! which the pixel changed phase (-1 = never foreground, 0 = foreground
//! from the start).

use std::io::Write;

use crate::geom::{Position, PositionIterator, Size};
use crate::image::matrix::NumMatrix;
use crate::utils::error::{MorphError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayscaleImage {
    data: NumMatrix<i32>,
}

impl GrayscaleImage {
    pub fn new(size: &Size, default: i32) -> Result<Self> {
        Ok(GrayscaleImage {
            data: NumMatrix::new(size, default)?,
        })
    }

    pub fn size(&self) -> &Size {
        self.data.size()
    }

    pub fn length(&self, axis: usize) -> Result<i64> {
        self.data.size().length(axis)
    }

    pub fn contains(&self, position: &Position) -> bool {
        self.data.size().contains(position)
    }

    pub fn value(&self, position: &Position) -> Result<i32> {
        self.data.value(position)
    }

    pub fn set_value(&mut self, position: &Position, value: i32) -> Result<()> {
        self.data.set_value(position, value)
    }

    /// Number of cells whose value marks "ever foreground" (`>= 0`).
    pub fn count_nonnegative(&self) -> Result<usize> {
        let mut count = 0;
        let mut it = PositionIterator::new(self.size().bounds());
        loop {
            if self.value(it.value())? >= 0 {
                count += 1;
            }
            if !it.iterate() {
                break;
            }
        }
        Ok(count)
    }

    /// Writes the cells as text: a `Size: LxL...` header followed by
    /// 11-wide cells with the last axis varying fastest, so each text
    /// line covers one step of the slower axes; blank lines separate the
    /// blocks where an outer axis wraps.
    pub fn dump_text<W: Write>(&self, out: &mut W) -> Result<()> {
        let dim = self.size().dim();
        write!(out, "Size: ")?;
        let mut lengths = Vec::with_capacity(dim);
        for axis in 0..dim {
            let length = self.length(axis)?;
            lengths.push(length);
            if axis + 1 < dim {
                write!(out, "{}x", length)?;
            } else {
                writeln!(out, "{}", length)?;
            }
        }
        // Cumulative cell counts of the fastest axes, innermost first.
        let mut wraps = Vec::with_capacity(dim);
        let mut cells: usize = 1;
        for axis in (0..dim).rev() {
            cells *= lengths[axis] as usize;
            wraps.push(cells);
        }
        let total = cells;
        let mut position = Position::origin(dim)?;
        let mut index: usize = 0;
        loop {
            write!(out, "{:>11}", self.value(&position)?)?;
            index += 1;
            for &wrap in &wraps {
                if index % wrap == 0 {
                    writeln!(out)?;
                } else {
                    break;
                }
            }
            if index == total {
                break;
            }
            let mut axis = dim - 1;
            loop {
                let next = position.value(axis)? + 1;
                if next < lengths[axis] {
                    position.set_value(axis, next)?;
                    break;
                }
                position.set_value(axis, 0)?;
                axis -= 1;
            }
        }
        Ok(())
    }

    /// Strips the codec padding recorded on the size, returning the
    /// interior image.
    pub fn unpadded(&self) -> Result<GrayscaleImage> {
        let padding = self.size().padding();
        if padding == 0 {
            return Ok(self.clone());
        }
        let dim = self.size().dim();
        let mut lengths = Vec::with_capacity(dim);
        for axis in 0..dim {
            let inner = self.length(axis)? - 2 * padding;
            if inner < 1 {
                return Err(MorphError::LengthNotPositive);
            }
            lengths.push(inner);
        }
        let inner_size = Size::from_lengths(&lengths)?;
        let mut output = GrayscaleImage::new(&inner_size, -1)?;
        let mut outer = Position::origin(dim)?;
        let mut it = PositionIterator::new(inner_size.bounds());
        loop {
            let p = it.value();
            for axis in 0..dim {
                outer.set_value(axis, p.coords()[axis] + padding)?;
            }
            let value = self.value(&outer)?;
            output.set_value(p, value)?;
            if !it.iterate() {
                break;
            }
        }
        Ok(output)
    }
}
