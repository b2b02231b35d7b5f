// src/image/matrix.rs

//! Dense N-dimensional matrices addressed by [`Position`].
//!
//! [`BitMatrix`] packs one bit per cell; [`NumMatrix`] stores one typed
//! value per cell.  Both use the same mixed-radix address translation
//! with axis 0 varying fastest, so a matrix and a `PositionIterator` over
//! its size visit cells in identical order.

use bitvec::prelude::*;

use crate::geom::{Position, Size};
use crate::utils::error::{MorphError, Result};

/// Linear cell index of `position` within `size`, optionally translating
/// by `shift` first (used by masks whose box is not anchored at the
/// origin).  Fails when the translated position falls outside the size.
pub(crate) fn linear_offset(
    size: &Size,
    position: &Position,
    shift: Option<&Position>,
) -> Result<usize> {
    let dim = size.dim();
    if position.dim() != dim {
        return Err(MorphError::DimensionMismatch {
            expected: dim,
            actual: position.dim(),
        });
    }
    if let Some(shift) = shift {
        if shift.dim() != dim {
            return Err(MorphError::DimensionMismatch {
                expected: dim,
                actual: shift.dim(),
            });
        }
    }
    let mut absolute: usize = 0;
    let mut stride: usize = 1;
    for axis in 0..dim {
        let mut coordinate = position.coords()[axis];
        if let Some(shift) = shift {
            coordinate -= shift.coords()[axis];
        }
        let length = size.length(axis)?;
        if coordinate < 0 || coordinate >= length {
            return Err(MorphError::PositionOutOfBounds);
        }
        absolute += (coordinate as usize) * stride;
        stride *= length as usize;
    }
    Ok(absolute)
}

/// A packed-bit N-dimensional matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    size: Size,
    bits: BitVec,
}

impl BitMatrix {
    /// A matrix of the given size, all-background (`empty`) or
    /// all-foreground.
    pub fn new(size: &Size, empty: bool) -> Result<Self> {
        let capacity = size.capacity()?;
        Ok(BitMatrix {
            size: size.clone(),
            bits: BitVec::repeat(!empty, capacity),
        })
    }

    pub fn size(&self) -> &Size {
        &self.size
    }

    pub fn value(&self, position: &Position) -> Result<bool> {
        self.value_shifted(position, None)
    }

    pub fn set_value(&mut self, position: &Position, value: bool) -> Result<()> {
        self.set_value_shifted(position, None, value)
    }

    pub(crate) fn value_shifted(
        &self,
        position: &Position,
        shift: Option<&Position>,
    ) -> Result<bool> {
        let index = linear_offset(&self.size, position, shift)?;
        Ok(self.bits[index])
    }

    pub(crate) fn set_value_shifted(
        &mut self,
        position: &Position,
        shift: Option<&Position>,
        value: bool,
    ) -> Result<()> {
        let index = linear_offset(&self.size, position, shift)?;
        self.bits.set(index, value);
        Ok(())
    }

    /// Flips every cell in place.
    pub fn invert(&mut self) {
        for index in 0..self.bits.len() {
            let value = self.bits[index];
            self.bits.set(index, !value);
        }
    }

    pub fn count_foreground(&self) -> usize {
        self.bits.count_ones()
    }
}

/// A dense N-dimensional matrix of copyable cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumMatrix<T: Copy + PartialEq> {
    size: Size,
    cells: Vec<T>,
}

impl<T: Copy + PartialEq> NumMatrix<T> {
    pub fn new(size: &Size, default: T) -> Result<Self> {
        let capacity = size.capacity()?;
        Ok(NumMatrix {
            size: size.clone(),
            cells: vec![default; capacity],
        })
    }

    pub fn size(&self) -> &Size {
        &self.size
    }

    pub fn value(&self, position: &Position) -> Result<T> {
        let index = linear_offset(&self.size, position, None)?;
        Ok(self.cells[index])
    }

    pub fn set_value(&mut self, position: &Position, value: T) -> Result<()> {
        let index = linear_offset(&self.size, position, None)?;
        self.cells[index] = value;
        Ok(())
    }
}
