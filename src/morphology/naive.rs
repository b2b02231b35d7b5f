// src/morphology/naive.rs

//! The naive algorithm: every candidate stays enqueued from the start, and
//! each sub-iteration rescans the whole queue against the current element.

use crate::geom::Position;
use crate::image::{BinaryImage, GrayscaleImage};
use crate::morphology::engine::{EngineCore, Variant};
use crate::morphology::queue::CandidateId;
use crate::utils::error::Result;

#[derive(Debug, Default)]
pub(crate) struct NaiveVariant;

impl Variant for NaiveVariant {
    const NAME: &'static str = "naive";
    const REGULAR_REMOVAL: bool = true;
    const USE_CANDIDATE_MATRIX: bool = false;

    fn initial_candidate_found(
        &mut self,
        core: &mut EngineCore,
        _image: &BinaryImage,
        id: CandidateId,
        _position: &Position,
    ) -> Result<()> {
        core.enqueue_candidate(id)
    }

    fn detect_border(
        &mut self,
        core: &mut EngineCore,
        se_index: usize,
        element_order: &[usize],
    ) -> Result<()> {
        core.detect_border_by_scan(se_index, element_order)
    }

    // The queue holds every candidate-phase pixel from enrollment on, so
    // no new candidates can ever appear.
    fn insert_new_candidates(
        &mut self,
        _core: &mut EngineCore,
        _residues: &GrayscaleImage,
    ) -> Result<()> {
        Ok(())
    }
}
