// src/geom/bounds.rs

//! Axis-aligned integer boxes and the non-negative sizes derived from them.
//!
//! A [`BoundingBox`] keeps `lower[i] <= upper[i]` on every axis: the
//! two-corner constructor swaps violating pairs and the corner setters
//! silently widen the opposite corner instead of failing.  A [`Size`] is a
//! box anchored at the origin, used as the index domain of matrices; it
//! additionally records the codec padding applied on every side so padded
//! working images can be stripped back down on output.

use crate::geom::Position;
use crate::utils::error::{MorphError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    lower: Position,
    upper: Position,
}

impl BoundingBox {
    /// The degenerate box holding only the origin.
    pub fn at_origin(dim: usize) -> Result<Self> {
        let origin = Position::origin(dim)?;
        Ok(BoundingBox {
            lower: origin.clone(),
            upper: origin,
        })
    }

    /// Builds a box from two corners, swapping coordinates per axis where
    /// `lower` exceeds `upper`.
    pub fn new(lower: &Position, upper: &Position) -> Result<Self> {
        if lower.dim() != upper.dim() {
            return Err(MorphError::DimensionMismatch {
                expected: lower.dim(),
                actual: upper.dim(),
            });
        }
        let mut lo = lower.clone();
        let mut hi = upper.clone();
        for axis in 0..lo.dim() {
            if lo.coords()[axis] > hi.coords()[axis] {
                let tmp = lo.coords()[axis];
                lo.coords_mut()[axis] = hi.coords()[axis];
                hi.coords_mut()[axis] = tmp;
            }
        }
        Ok(BoundingBox {
            lower: lo,
            upper: hi,
        })
    }

    pub fn dim(&self) -> usize {
        self.lower.dim()
    }

    pub fn lower(&self) -> &Position {
        &self.lower
    }

    pub fn upper(&self) -> &Position {
        &self.upper
    }

    /// Moves the lower corner, widening the upper corner on any axis the
    /// new lower would overtake.
    pub fn set_lower(&mut self, position: &Position) -> Result<()> {
        if position.dim() != self.dim() {
            return Err(MorphError::DimensionMismatch {
                expected: self.dim(),
                actual: position.dim(),
            });
        }
        for axis in 0..self.dim() {
            let value = position.coords()[axis];
            if value > self.upper.coords()[axis] {
                self.upper.coords_mut()[axis] = value;
            }
            self.lower.coords_mut()[axis] = value;
        }
        Ok(())
    }

    /// Moves the upper corner, widening the lower corner where violated.
    pub fn set_upper(&mut self, position: &Position) -> Result<()> {
        if position.dim() != self.dim() {
            return Err(MorphError::DimensionMismatch {
                expected: self.dim(),
                actual: position.dim(),
            });
        }
        for axis in 0..self.dim() {
            let value = position.coords()[axis];
            if value < self.lower.coords()[axis] {
                self.lower.coords_mut()[axis] = value;
            }
            self.upper.coords_mut()[axis] = value;
        }
        Ok(())
    }

    /// Cells on axis `index`: `upper - lower + 1`.
    pub fn length(&self, axis: usize) -> Result<i64> {
        let lo = self.lower.value(axis)?;
        let hi = self.upper.value(axis)?;
        Ok(hi - lo + 1)
    }

    /// Total cell count, failing on overflow.
    pub fn capacity(&self) -> Result<usize> {
        let mut cells: usize = 1;
        for axis in 0..self.dim() {
            let length = usize::try_from(self.length(axis)?)
                .map_err(|_| MorphError::CapacityOverflow)?;
            cells = cells
                .checked_mul(length)
                .ok_or(MorphError::CapacityOverflow)?;
        }
        Ok(cells)
    }

    /// Grows the box to cover `other`.
    pub fn expand_box(&mut self, other: &BoundingBox) -> Result<()> {
        if other.dim() != self.dim() {
            return Err(MorphError::DimensionMismatch {
                expected: self.dim(),
                actual: other.dim(),
            });
        }
        for axis in 0..self.dim() {
            if other.lower.coords()[axis] < self.lower.coords()[axis] {
                self.lower.coords_mut()[axis] = other.lower.coords()[axis];
            }
            if other.upper.coords()[axis] > self.upper.coords()[axis] {
                self.upper.coords_mut()[axis] = other.upper.coords()[axis];
            }
        }
        Ok(())
    }

    /// Grows the box to cover a single position.
    pub fn expand_point(&mut self, position: &Position) -> Result<()> {
        if position.dim() != self.dim() {
            return Err(MorphError::DimensionMismatch {
                expected: self.dim(),
                actual: position.dim(),
            });
        }
        for axis in 0..self.dim() {
            let value = position.coords()[axis];
            if value < self.lower.coords()[axis] {
                self.lower.coords_mut()[axis] = value;
            }
            if value > self.upper.coords()[axis] {
                self.upper.coords_mut()[axis] = value;
            }
        }
        Ok(())
    }

    /// The overlap of the two boxes, or `None` when some axis is disjoint.
    pub fn intersection(&self, other: &BoundingBox) -> Result<Option<BoundingBox>> {
        if other.dim() != self.dim() {
            return Err(MorphError::DimensionMismatch {
                expected: self.dim(),
                actual: other.dim(),
            });
        }
        let mut lower = Position::origin(self.dim())?;
        let mut upper = Position::origin(self.dim())?;
        for axis in 0..self.dim() {
            let lo = self.lower.coords()[axis].max(other.lower.coords()[axis]);
            let hi = self.upper.coords()[axis].min(other.upper.coords()[axis]);
            if lo > hi {
                return Ok(None);
            }
            lower.coords_mut()[axis] = lo;
            upper.coords_mut()[axis] = hi;
        }
        Ok(Some(BoundingBox { lower, upper }))
    }

    /// The smallest box containing both operands.
    pub fn union(&self, other: &BoundingBox) -> Result<BoundingBox> {
        if other.dim() != self.dim() {
            return Err(MorphError::DimensionMismatch {
                expected: self.dim(),
                actual: other.dim(),
            });
        }
        let mut lower = Position::origin(self.dim())?;
        let mut upper = Position::origin(self.dim())?;
        for axis in 0..self.dim() {
            lower.coords_mut()[axis] = self.lower.coords()[axis].min(other.lower.coords()[axis]);
            upper.coords_mut()[axis] = self.upper.coords()[axis].max(other.upper.coords()[axis]);
        }
        Ok(BoundingBox { lower, upper })
    }

    /// Point reflection through the origin: `lower' = -upper`,
    /// `upper' = -lower`.
    pub fn reflect(&self) -> Result<BoundingBox> {
        let mut lower = Position::origin(self.dim())?;
        let mut upper = Position::origin(self.dim())?;
        lower.copy_opposite_of(&self.upper)?;
        upper.copy_opposite_of(&self.lower)?;
        Ok(BoundingBox { lower, upper })
    }

    /// Whether the position lies inside the box.  A position with a
    /// different arity is never contained.
    pub fn contains(&self, position: &Position) -> bool {
        if position.dim() != self.dim() {
            return false;
        }
        for axis in 0..self.dim() {
            let value = position.coords()[axis];
            if value < self.lower.coords()[axis] || value > self.upper.coords()[axis] {
                return false;
            }
        }
        true
    }

    /// The size spanned by this box (per-axis lengths, zero padding).
    pub fn size(&self) -> Result<Size> {
        let mut lengths = Vec::with_capacity(self.dim());
        for axis in 0..self.dim() {
            lengths.push(self.length(axis)?);
        }
        Size::from_lengths(&lengths)
    }
}

/// A bounding box anchored at the origin, used as a matrix index domain.
///
/// `padding` records how many cells on every side of every axis came from
/// codec padding rather than the source image; the geometry itself already
/// includes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Size {
    bounds: BoundingBox,
    padding: i64,
}

impl Size {
    pub fn from_lengths(lengths: &[i64]) -> Result<Self> {
        Self::with_padding(lengths, 0)
    }

    pub fn with_padding(lengths: &[i64], padding: i64) -> Result<Self> {
        if lengths.is_empty() || padding < 0 {
            return Err(MorphError::LengthNotPositive);
        }
        let mut upper = Position::origin(lengths.len())?;
        for (axis, &length) in lengths.iter().enumerate() {
            if length < 1 {
                return Err(MorphError::LengthNotPositive);
            }
            upper.coords_mut()[axis] = length - 1;
        }
        let lower = Position::origin(lengths.len())?;
        Ok(Size {
            bounds: BoundingBox { lower, upper },
            padding,
        })
    }

    /// Clamps an arbitrary box to the non-negative quadrant.
    pub fn from_box_clamped(bounds: &BoundingBox) -> Result<Self> {
        let mut lengths = Vec::with_capacity(bounds.dim());
        for axis in 0..bounds.dim() {
            let hi = bounds.upper().coords()[axis].max(0);
            lengths.push(hi + 1);
        }
        Size::from_lengths(&lengths)
    }

    pub fn dim(&self) -> usize {
        self.bounds.dim()
    }

    pub fn length(&self, axis: usize) -> Result<i64> {
        self.bounds.length(axis)
    }

    pub fn capacity(&self) -> Result<usize> {
        self.bounds.capacity()
    }

    pub fn padding(&self) -> i64 {
        self.padding
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn contains(&self, position: &Position) -> bool {
        self.bounds.contains(position)
    }
}
