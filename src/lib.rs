//! Binary morphological erosion and dilation by iterative boundary
//! evolution, under families of structuring elements.
//!
//! Instead of probing every pixel against every element each pass, the
//! engine keeps a queue of candidate pixels and peels (erosion) or
//! accretes (dilation) the image boundary one structuring element at a
//! time, in a freshly shuffled order per iteration, until a full cycle
//! through the family changes nothing.  The output is a grayscale
//! *residues* image recording, per pixel, the iteration at which that
//! pixel changed phase.
//!
//! Three algorithms share the engine and produce identical residues for
//! identical seeds:
//!
//! - **Naive** rescans the whole candidate queue for every element.
//! - **Border** enqueues only boundary-adjacent pixels and re-enqueues
//!   neighbors exposed by each removal through a lookup grid.
//! - **Matrix** additionally maintains per-offset linked lists of
//!   disqualified candidates, making border detection proportional to the
//!   border actually found.
//!
//! # Quick start
//!
//! ```
//! use dualmorph::{Algorithm, BinaryImage, Mode, Size, transform};
//! use dualmorph::geom::{BoundingBox, Position};
//! use dualmorph::StructuringElement;
//! use rand::SeedableRng;
//!
//! # fn main() -> dualmorph::Result<()> {
//! // A 5x5 all-foreground image...
//! let image = BinaryImage::new(&Size::from_lengths(&[5, 5])?, false)?;
//!
//! // ...and a 3x3 all-foreground structuring element around the origin.
//! let bounds = BoundingBox::new(
//!     &Position::from_coords(vec![-1, -1])?,
//!     &Position::from_coords(vec![1, 1])?,
//! )?;
//! let element = StructuringElement::new(&bounds, false)?;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let output = transform(Algorithm::Matrix, Mode::Erosion, &image, &[element], &mut rng)?;
//! // The center pixel outlives every other foreground pixel.
//! let center = Position::from_coords(vec![2, 2])?;
//! assert_eq!(output.residues.value(&center)?, 3);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod geom;
pub mod image;
pub mod morphology;
pub mod utils;

pub use crate::image::{BinaryImage, GrayscaleImage, StructuringElement};
pub use geom::{BoundingBox, Position, PositionIterator, Size};
pub use morphology::{Algorithm, CandidateId, CounterSet, HEADER, Mode, TransformOutput, transform};
pub use utils::error::{MorphError, Result};
