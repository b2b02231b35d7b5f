// src/morphology/border.rs

//! The border algorithm: only pixels adjacent to the opposing phase are
//! enqueued, and each removed border exposes its neighbors for
//! re-enqueueing through the position-to-candidate lookup grid.

use crate::geom::Position;
use crate::image::{BinaryImage, GrayscaleImage};
use crate::morphology::engine::{EngineCore, Variant};
use crate::morphology::queue::CandidateId;
use crate::utils::error::Result;

#[derive(Debug, Default)]
pub(crate) struct BorderVariant;

impl Variant for BorderVariant {
    const NAME: &'static str = "border";
    const REGULAR_REMOVAL: bool = true;
    const USE_CANDIDATE_MATRIX: bool = true;

    /// Enqueues the candidate only when some union offset already probes
    /// into the opposing phase; interior pixels wait in the arena until a
    /// border removal exposes them.
    fn initial_candidate_found(
        &mut self,
        core: &mut EngineCore,
        image: &BinaryImage,
        id: CandidateId,
        position: &Position,
    ) -> Result<()> {
        let mut target = Position::origin(core.dim())?;
        let mut found = false;
        for element in 0..core.u_cardinality() {
            if core.enrollment_probe(image, position, element, &mut target)? {
                found = true;
                break;
            }
        }
        if found {
            core.enqueue_candidate(id)?;
        }
        Ok(())
    }

    fn detect_border(
        &mut self,
        core: &mut EngineCore,
        se_index: usize,
        element_order: &[usize],
    ) -> Result<()> {
        core.detect_border_by_scan(se_index, element_order)
    }

    /// For every pixel of the border just flipped, probes all union
    /// offsets with the insertion sign convention and enqueues the
    /// candidates found still in the candidate phase and untouched by a
    /// previous iteration.  Enqueueing is idempotent, so pixels reachable
    /// from several border pixels are spliced once.
    fn insert_new_candidates(
        &mut self,
        core: &mut EngineCore,
        residues: &GrayscaleImage,
    ) -> Result<()> {
        let mut target = Position::origin(core.dim())?;
        for slot in 0..core.border_len {
            let id = core.border[slot];
            let position = core.arena.position(id).clone();
            for element in 0..core.u_cardinality() {
                core.counters.insert_comparisons[core.se_iteration] += 1;
                core.mode
                    .insert_probe_into(&position, &core.u_elements[element], &mut target)?;
                if !core.y.contains(&target) {
                    continue;
                }
                if core.y.value(&target)? != core.mode.candidate_phase() {
                    continue;
                }
                if residues.value(&target)? > core.mode.residue_threshold() {
                    continue;
                }
                let node = core.candidate_at(&target)?;
                core.enqueue_candidate(node)?;
            }
        }
        Ok(())
    }
}
