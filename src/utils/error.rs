// src/utils/error.rs

use thiserror::Error;

/// The primary error type for all operations in the dualmorph library.
///
/// Geometry and queue violations are fatal for the run that raised them:
/// the engine propagates them unchanged and callers must not inspect
/// partially-populated outputs after a failure.
#[derive(Error, Debug)]
pub enum MorphError {
    /// Two N-dimensional values with different arities met in one operation.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// An axis index outside `0..dim`.
    #[error("axis {axis} out of range for {dim}-dimensional value")]
    AxisOutOfRange { axis: usize, dim: usize },

    /// A size was requested with a non-positive length on some axis.
    #[error("length must be positive on every axis")]
    LengthNotPositive,

    /// The cell count of a matrix does not fit in addressable memory.
    #[error("capacity overflow while sizing a matrix")]
    CapacityOverflow,

    /// Address translation was asked for a position outside the matrix.
    #[error("position outside the matrix bounds")]
    PositionOutOfBounds,

    /// A structuring element whose origin cell is absent or background.
    #[error("structuring element does not contain its origin as foreground")]
    OriginNotInElement,

    /// The transform was invoked with no structuring elements at all.
    #[error("the structuring element family is empty")]
    EmptyFamily,

    /// A queue operation addressed the reserved header node.
    #[error("queue operation addressed the reserved header node")]
    HeaderReserved,

    /// Removal of a candidate that was never enqueued, or was already
    /// removed within the same run.
    #[error("candidate {0} is not enqueued")]
    NotEnqueued(u32),

    /// A position-to-candidate lookup on an algorithm that keeps no index.
    #[error("candidate index is not available for this algorithm")]
    CandidateIndexMissing,

    /// The per-element index built during vectorization did not cover
    /// every offset of some structuring element.
    #[error("element index mismatch while vectorizing the family")]
    ElementIndexMismatch,

    /// An error occurred during I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error surfaced by the PNG codec.
    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),
}

/// A specialized `Result` type for dualmorph operations.
pub type Result<T> = std::result::Result<T, MorphError>;
