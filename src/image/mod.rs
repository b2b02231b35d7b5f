//! Bitmap storage: packed-bit and integer matrices, bounded binary masks
//! and the grayscale residues image.

pub mod grayscale;
pub mod matrix;
pub mod se;

pub use grayscale::GrayscaleImage;
pub use matrix::{BitMatrix, NumMatrix};
pub use se::{BinaryImage, StructuringElement};
