// src/image/se.rs

//! Bounded binary masks: structuring elements and binary images.
//!
//! A [`StructuringElement`] pairs an arbitrary bounding box with a packed
//! bit matrix of its size; external positions are translated by the box's
//! lower corner before addressing.  A [`BinaryImage`] is the special case
//! whose box is anchored at the origin, used both for input images and for
//! the working image the morphology engine mutates.
//!
//! The two types deliberately disagree on reflection: a structuring
//! element reflects through the true origin (its box moves), while a
//! binary image reflects through the center of its size box (the box
//! stays put).

use crate::geom::{BoundingBox, Position, PositionIterator, Size};
use crate::image::matrix::BitMatrix;
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    bounds: BoundingBox,
    data: BitMatrix,
}

impl StructuringElement {
    /// A mask over `bounds`, all-background (`empty`) or all-foreground.
    pub fn new(bounds: &BoundingBox, empty: bool) -> Result<Self> {
        let size = bounds.size()?;
        Ok(StructuringElement {
            bounds: bounds.clone(),
            data: BitMatrix::new(&size, empty)?,
        })
    }

    /// A mask whose box is the given size, keeping its padding record.
    pub(crate) fn with_size(size: &Size, empty: bool) -> Result<Self> {
        Ok(StructuringElement {
            bounds: size.bounds().clone(),
            data: BitMatrix::new(size, empty)?,
        })
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn size(&self) -> &Size {
        self.data.size()
    }

    pub fn length(&self, axis: usize) -> Result<i64> {
        self.bounds.length(axis)
    }

    pub fn contains(&self, position: &Position) -> bool {
        self.bounds.contains(position)
    }

    pub fn value(&self, position: &Position) -> Result<bool> {
        self.data.value_shifted(position, Some(self.bounds.lower()))
    }

    pub fn set_value(&mut self, position: &Position, value: bool) -> Result<()> {
        self.data
            .set_value_shifted(position, Some(self.bounds.lower()), value)
    }

    pub fn count_foreground(&self) -> usize {
        self.data.count_foreground()
    }

    /// Geometric reflection through the true origin; the value at `p`
    /// moves to `-p` and the box is reflected with it.
    pub fn reflect_by_origin(&self) -> Result<StructuringElement> {
        let reflected_bounds = self.bounds.reflect()?;
        let mut output = StructuringElement::new(&reflected_bounds, true)?;
        let mut opposite = Position::origin(self.bounds.dim())?;
        let mut it = PositionIterator::new(&self.bounds);
        loop {
            if self.value(it.value())? {
                opposite.copy_opposite_of(it.value())?;
                output.set_value(&opposite, true)?;
            }
            if !it.iterate() {
                break;
            }
        }
        Ok(output)
    }

    /// Set union over the union of the two boxes.
    pub fn union(&self, other: &StructuringElement) -> Result<StructuringElement> {
        let union_bounds = self.bounds.union(&other.bounds)?;
        let mut output = StructuringElement::new(&union_bounds, true)?;
        let mut it = PositionIterator::new(&union_bounds);
        loop {
            let p = it.value();
            let set = (self.contains(p) && self.value(p)?)
                || (other.contains(p) && other.value(p)?);
            if set {
                output.set_value(p, true)?;
            }
            if !it.iterate() {
                break;
            }
        }
        Ok(output)
    }

    /// Set intersection over the overlap of the boxes; `None` when the
    /// boxes are disjoint.
    pub fn intersection(&self, other: &StructuringElement) -> Result<Option<StructuringElement>> {
        let overlap = match self.bounds.intersection(&other.bounds)? {
            Some(overlap) => overlap,
            None => return Ok(None),
        };
        let mut output = StructuringElement::new(&overlap, true)?;
        let mut it = PositionIterator::new(&overlap);
        loop {
            let p = it.value();
            if self.value(p)? && other.value(p)? {
                output.set_value(p, true)?;
            }
            if !it.iterate() {
                break;
            }
        }
        Ok(Some(output))
    }

    /// Removes the other mask's foreground from a copy of this one.
    pub fn set_minus(&self, other: &StructuringElement) -> Result<StructuringElement> {
        let mut output = self.clone();
        let overlap = match self.bounds.intersection(&other.bounds)? {
            Some(overlap) => overlap,
            None => return Ok(output),
        };
        let mut it = PositionIterator::new(&overlap);
        loop {
            let p = it.value();
            if other.value(p)? {
                output.set_value(p, false)?;
            }
            if !it.iterate() {
                break;
            }
        }
        Ok(output)
    }

    /// Negates every cell inside the bounding box.
    pub fn delimited_complement(&self) -> Result<StructuringElement> {
        let mut output = self.clone();
        output.data.invert();
        Ok(output)
    }
}

/// A binary mask whose bounding box starts at the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage {
    element: StructuringElement,
}

impl BinaryImage {
    pub fn new(size: &Size, empty: bool) -> Result<Self> {
        Ok(BinaryImage {
            element: StructuringElement::with_size(size, empty)?,
        })
    }

    /// Clamps an arbitrary mask to the non-negative quadrant, keeping the
    /// foreground cells that survive.
    pub fn from_element_clamped(element: &StructuringElement) -> Result<Self> {
        let size = Size::from_box_clamped(element.bounding_box())?;
        let mut output = BinaryImage::new(&size, true)?;
        let mut it = PositionIterator::new(size.bounds());
        loop {
            let p = it.value();
            if element.contains(p) && element.value(p)? {
                output.set_value(p, true)?;
            }
            if !it.iterate() {
                break;
            }
        }
        Ok(output)
    }

    pub fn size(&self) -> &Size {
        self.element.size()
    }

    pub fn length(&self, axis: usize) -> Result<i64> {
        self.element.length(axis)
    }

    pub fn contains(&self, position: &Position) -> bool {
        self.element.contains(position)
    }

    pub fn value(&self, position: &Position) -> Result<bool> {
        self.element.value(position)
    }

    pub fn set_value(&mut self, position: &Position, value: bool) -> Result<()> {
        self.element.set_value(position, value)
    }

    pub fn count_foreground(&self) -> usize {
        self.element.count_foreground()
    }

    pub fn as_element(&self) -> &StructuringElement {
        &self.element
    }

    /// Negates every cell inside the size box.
    pub fn delimited_complement(&self) -> Result<BinaryImage> {
        Ok(BinaryImage {
            element: self.element.delimited_complement()?,
        })
    }

    /// Reflection through the center of the size box: the value at `p`
    /// moves to `upper - p` and the box is unchanged.  Note the contrast
    /// with [`StructuringElement::reflect_by_origin`].
    pub fn reflect_by_origin(&self) -> Result<BinaryImage> {
        let size = self.size().clone();
        let upper = size.bounds().upper().clone();
        let mut output = BinaryImage::new(&size, true)?;
        let mut mirrored = Position::origin(size.dim())?;
        let mut it = PositionIterator::new(size.bounds());
        loop {
            if self.value(it.value())? {
                upper.subtract_into(it.value(), &mut mirrored)?;
                output.set_value(&mirrored, true)?;
            }
            if !it.iterate() {
                break;
            }
        }
        Ok(output)
    }

    /// Set union clamped back to a size-based image.
    pub fn union(&self, other: &StructuringElement) -> Result<BinaryImage> {
        let merged = self.element.union(other)?;
        BinaryImage::from_element_clamped(&merged)
    }
}
