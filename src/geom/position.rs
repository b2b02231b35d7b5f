// src/geom/position.rs

use crate::utils::error::{MorphError, Result};

/// An N-dimensional integer coordinate.
///
/// The arity is bound when the value is constructed; operations that mix
/// positions of different arities fail with
/// [`MorphError::DimensionMismatch`].  Arithmetic writes into a
/// caller-provided result so hot loops can reuse one scratch value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    coords: Vec<i64>,
}

impl Position {
    /// The origin of an N-dimensional space.  `dim` must be at least 1.
    pub fn origin(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(MorphError::LengthNotPositive);
        }
        Ok(Position {
            coords: vec![0; dim],
        })
    }

    /// A position with the given coordinates.  At least one axis required.
    pub fn from_coords(coords: Vec<i64>) -> Result<Self> {
        if coords.is_empty() {
            return Err(MorphError::LengthNotPositive);
        }
        Ok(Position { coords })
    }

    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    pub fn is_origin(&self) -> bool {
        self.coords.iter().all(|&c| c == 0)
    }

    pub fn value(&self, axis: usize) -> Result<i64> {
        self.coords
            .get(axis)
            .copied()
            .ok_or(MorphError::AxisOutOfRange {
                axis,
                dim: self.coords.len(),
            })
    }

    pub fn set_value(&mut self, axis: usize, value: i64) -> Result<()> {
        let dim = self.coords.len();
        let slot = self
            .coords
            .get_mut(axis)
            .ok_or(MorphError::AxisOutOfRange { axis, dim })?;
        *slot = value;
        Ok(())
    }

    /// Overwrites every coordinate with the matching coordinate of `other`.
    pub fn copy_from(&mut self, other: &Position) {
        self.coords.clear();
        self.coords.extend_from_slice(&other.coords);
    }

    /// Overwrites `self` with `-other`, axis by axis.
    pub fn copy_opposite_of(&mut self, other: &Position) -> Result<()> {
        self.check_arity(other)?;
        for (slot, &c) in self.coords.iter_mut().zip(other.coords.iter()) {
            *slot = -c;
        }
        Ok(())
    }

    /// `out = self + other`.
    pub fn sum_into(&self, other: &Position, out: &mut Position) -> Result<()> {
        self.plus_factor(other, 1, out)
    }

    /// `out = self - other`.
    pub fn subtract_into(&self, other: &Position, out: &mut Position) -> Result<()> {
        self.plus_factor(other, -1, out)
    }

    fn plus_factor(&self, other: &Position, factor: i64, out: &mut Position) -> Result<()> {
        self.check_arity(other)?;
        self.check_arity(out)?;
        for axis in 0..self.coords.len() {
            out.coords[axis] = self.coords[axis] + factor * other.coords[axis];
        }
        Ok(())
    }

    fn check_arity(&self, other: &Position) -> Result<()> {
        if self.coords.len() != other.coords.len() {
            return Err(MorphError::DimensionMismatch {
                expected: self.coords.len(),
                actual: other.coords.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn coords(&self) -> &[i64] {
        &self.coords
    }

    pub(crate) fn coords_mut(&mut self) -> &mut [i64] {
        &mut self.coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_rejects_zero_dimension() {
        assert!(Position::origin(0).is_err());
        assert!(Position::origin(3).unwrap().is_origin());
    }

    #[test]
    fn sum_and_subtract_into_scratch() {
        let a = Position::from_coords(vec![3, -1]).unwrap();
        let b = Position::from_coords(vec![1, 4]).unwrap();
        let mut out = Position::origin(2).unwrap();
        a.sum_into(&b, &mut out).unwrap();
        assert_eq!(out, Position::from_coords(vec![4, 3]).unwrap());
        a.subtract_into(&b, &mut out).unwrap();
        assert_eq!(out, Position::from_coords(vec![2, -5]).unwrap());
    }

    #[test]
    fn mixed_arity_fails() {
        let a = Position::origin(2).unwrap();
        let b = Position::origin(3).unwrap();
        let mut out = Position::origin(2).unwrap();
        assert!(matches!(
            a.sum_into(&b, &mut out),
            Err(MorphError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn axis_out_of_range() {
        let mut p = Position::origin(2).unwrap();
        assert!(p.set_value(2, 1).is_err());
        assert!(p.value(5).is_err());
        p.set_value(1, 7).unwrap();
        assert_eq!(p.value(1).unwrap(), 7);
    }

    #[test]
    fn opposite_negates_every_axis() {
        let p = Position::from_coords(vec![2, -3, 0]).unwrap();
        let mut q = Position::origin(3).unwrap();
        q.copy_opposite_of(&p).unwrap();
        assert_eq!(q, Position::from_coords(vec![-2, 3, 0]).unwrap());
    }
}
