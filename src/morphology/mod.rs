//! Iterative boundary evolution: the engine skeleton, its three
//! algorithms and the structures they share.
//!
//! The engine applies a family of structuring elements to a binary image,
//! one element at a time in a freshly shuffled order each iteration,
//! peeling (erosion) or accreting (dilation) the boundary until a full
//! cycle through the family changes nothing.  All three algorithms
//! compute the same residues for the same seed; they differ in how much
//! bookkeeping they carry to find each border.

mod border;
mod engine;
mod matrix;
mod naive;
pub mod queue;
mod shuffle;

pub use engine::{Algorithm, CounterSet, Mode, TransformOutput};
pub use queue::{CandidateId, HEADER};

use rand::Rng;

use crate::image::{BinaryImage, StructuringElement};
use crate::utils::error::Result;

/// Runs one erosion or dilation of `image` under `family` with the chosen
/// algorithm, drawing every shuffle from `rng`.
///
/// The family must be non-empty and every element must contain the origin
/// as foreground.  Runs seeded identically produce identical residues
/// regardless of the algorithm chosen.
pub fn transform<R: Rng>(
    algorithm: Algorithm,
    mode: Mode,
    image: &BinaryImage,
    family: &[StructuringElement],
    rng: &mut R,
) -> Result<TransformOutput> {
    match algorithm {
        Algorithm::Naive => {
            engine::run_transform(&mut naive::NaiveVariant, mode, image, family, rng)
        }
        Algorithm::Border => {
            engine::run_transform(&mut border::BorderVariant, mode, image, family, rng)
        }
        Algorithm::Matrix => {
            engine::run_transform(&mut matrix::MatrixVariant::new(), mode, image, family, rng)
        }
    }
}
