// src/morphology/engine.rs

//! The shared boundary-evolution skeleton.
//!
//! One run peels (erosion) or accretes (dilation) the working image `Y`
//! one structuring element at a time until every element of the family
//! has been applied with nothing left to change.  The residues image
//! records, per pixel, the iteration at which the pixel changed phase.
//!
//! The three algorithms share this skeleton and differ only in the hooks
//! of the [`Variant`] trait: how the border of the current iteration is
//! detected, how freshly exposed pixels re-enter the candidate queue, and
//! which bookkeeping structures are maintained alongside the queue.

use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, trace};
use rand::Rng;

use crate::geom::{BoundingBox, Position, PositionIterator};
use crate::image::matrix::NumMatrix;
use crate::image::{BinaryImage, GrayscaleImage, StructuringElement};
use crate::morphology::queue::{CandidateArena, CandidateId, HEADER};
use crate::morphology::shuffle::shuffle;
use crate::utils::error::{MorphError, Result};

/// Which way the boundary evolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Erosion,
    Dilation,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Erosion => "erosion",
            Mode::Dilation => "dilation",
        }
    }

    /// Phase of the pixels that sit in the candidate queue: foreground for
    /// erosion, background for dilation.
    pub(crate) fn candidate_phase(self) -> bool {
        matches!(self, Mode::Erosion)
    }

    /// Neighbor probed while detecting the border: `p + u` for erosion,
    /// `p - u` for dilation.
    pub(crate) fn detect_probe_into(
        self,
        p: &Position,
        delta: &Position,
        out: &mut Position,
    ) -> Result<()> {
        match self {
            Mode::Erosion => p.sum_into(delta, out),
            Mode::Dilation => p.subtract_into(delta, out),
        }
    }

    /// Neighbor probed while inserting new candidates; the opposite sign
    /// convention from [`detect_probe_into`](Self::detect_probe_into).
    pub(crate) fn insert_probe_into(
        self,
        p: &Position,
        delta: &Position,
        out: &mut Position,
    ) -> Result<()> {
        match self {
            Mode::Erosion => p.subtract_into(delta, out),
            Mode::Dilation => p.sum_into(delta, out),
        }
    }

    /// Largest residue value a pixel may carry and still be (re)enqueued:
    /// 0 for erosion (initial foreground), -1 for dilation (never
    /// foreground).
    pub(crate) fn residue_threshold(self) -> i32 {
        match self {
            Mode::Erosion => 0,
            Mode::Dilation => -1,
        }
    }
}

/// The three boundary-evolution algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Naive,
    Border,
    Matrix,
}

impl Algorithm {
    pub fn label(self) -> &'static str {
        match self {
            Algorithm::Naive => "naive",
            Algorithm::Border => "border",
            Algorithm::Matrix => "matrix",
        }
    }
}

/// Six per-iteration workload counters, indexed by `se_iteration`.
///
/// Every vector receives one zero before the run starts and one more at
/// the top of each iteration, then only grows by increments, so each entry
/// is the workload of exactly one iteration.  The remove-comparison
/// counter is part of the reporting contract but has no increment site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterSet {
    pub detect_comparisons: Vec<u64>,
    pub insert_comparisons: Vec<u64>,
    pub insert_accesses: Vec<u64>,
    pub remove_comparisons: Vec<u64>,
    pub remove_accesses: Vec<u64>,
    pub border_elements: Vec<u64>,
}

impl CounterSet {
    pub fn new() -> Self {
        CounterSet::default()
    }

    pub(crate) fn push_iteration(&mut self) {
        self.detect_comparisons.push(0);
        self.insert_comparisons.push(0);
        self.insert_accesses.push(0);
        self.remove_comparisons.push(0);
        self.remove_accesses.push(0);
        self.border_elements.push(0);
    }

    /// Recorded iterations, including the index-0 preparation row.
    pub fn iterations(&self) -> usize {
        self.detect_comparisons.len()
    }
}

/// The result of one engine run.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Iteration residues: -1 never foreground, 0 foreground from the
    /// start, k >= 1 changed phase at iteration k.
    pub residues: GrayscaleImage,
    pub counters: CounterSet,
    /// Wall-clock microseconds just before the main work.
    pub started_us: u128,
    /// Wall-clock microseconds just after the main work.
    pub finished_us: u128,
}

impl TransformOutput {
    pub fn elapsed_us(&self) -> u128 {
        self.finished_us.saturating_sub(self.started_us)
    }
}

/// State shared by every algorithm for the duration of one run.
pub(crate) struct EngineCore {
    pub(crate) mode: Mode,
    /// The working image, mutated as the boundary evolves.
    pub(crate) y: BinaryImage,
    /// Distinct non-origin offsets of the family, in iterator order over
    /// the union box.
    pub(crate) u_elements: Vec<Position>,
    /// Per structuring element, the sorted indices into `u_elements` of
    /// its offsets.
    pub(crate) se_elements: Vec<Vec<usize>>,
    pub(crate) arena: CandidateArena,
    /// Position-to-candidate lookup grid (Border and Matrix only).
    pub(crate) candidate_matrix: Option<NumMatrix<CandidateId>>,
    /// Border buffer filled by `detect_border`; `border[..border_len]`
    /// holds the ids found in the current sub-iteration.
    pub(crate) border: Vec<CandidateId>,
    pub(crate) border_len: usize,
    pub(crate) se_iteration: usize,
    pub(crate) counters: CounterSet,
}

impl EngineCore {
    pub(crate) fn new(
        mode: Mode,
        image: &BinaryImage,
        u_elements: Vec<Position>,
        se_elements: Vec<Vec<usize>>,
        use_candidate_matrix: bool,
    ) -> Result<Self> {
        let dim = image.size().dim();
        let candidate_matrix = if use_candidate_matrix {
            Some(NumMatrix::new(image.size(), HEADER)?)
        } else {
            None
        };
        let mut counters = CounterSet::new();
        counters.push_iteration();
        Ok(EngineCore {
            mode,
            y: image.clone(),
            u_elements,
            se_elements,
            arena: CandidateArena::new(dim)?,
            candidate_matrix,
            border: Vec::new(),
            border_len: 0,
            se_iteration: 0,
            counters,
        })
    }

    pub(crate) fn dim(&self) -> usize {
        self.y.size().dim()
    }

    pub(crate) fn u_cardinality(&self) -> usize {
        self.u_elements.len()
    }

    /// Appends the id to the queue, counting memory accesses only when a
    /// splice actually happened (enqueue is idempotent).
    pub(crate) fn enqueue_candidate(&mut self, id: CandidateId) -> Result<()> {
        if self.arena.enqueue(id)? {
            self.counters.insert_accesses[self.se_iteration] += 5;
        }
        Ok(())
    }

    /// Splices the id out of the queue.
    pub(crate) fn remove_candidate(&mut self, id: CandidateId) -> Result<()> {
        self.arena.remove(id)?;
        self.counters.remove_accesses[self.se_iteration] += 4;
        Ok(())
    }

    /// Looks up the candidate enrolled at `position`.
    pub(crate) fn candidate_at(&self, position: &Position) -> Result<CandidateId> {
        match &self.candidate_matrix {
            Some(matrix) => matrix.value(position),
            None => Err(MorphError::CandidateIndexMissing),
        }
    }

    pub(crate) fn push_border(&mut self, id: CandidateId) {
        self.border[self.border_len] = id;
        self.border_len += 1;
    }

    /// Full-queue border scan shared by the Naive and Border algorithms.
    ///
    /// Walks every enqueued candidate and probes the current element's
    /// offsets in the shuffled order; the first offset whose neighbor is
    /// in the opposing phase (or, for erosion, outside the image) marks
    /// the candidate and ends its offset loop.
    pub(crate) fn detect_border_by_scan(
        &mut self,
        se_index: usize,
        element_order: &[usize],
    ) -> Result<()> {
        let mut target = Position::origin(self.dim())?;
        let mut current = self.arena.first();
        while current != HEADER {
            let next = self.arena.next(current);
            let mut on_border = false;
            for &ordinal in element_order {
                let element = self.se_elements[se_index][ordinal];
                self.counters.detect_comparisons[self.se_iteration] += 1;
                self.mode.detect_probe_into(
                    self.arena.position(current),
                    &self.u_elements[element],
                    &mut target,
                )?;
                if self.y.contains(&target) {
                    if self.y.value(&target)? == self.mode.candidate_phase() {
                        continue;
                    }
                } else if self.mode == Mode::Dilation {
                    continue;
                }
                on_border = true;
                break;
            }
            if on_border {
                self.push_border(current);
            }
            current = next;
        }
        Ok(())
    }

    /// Whether the probe through `u_elements[element]` disqualifies the
    /// pixel at `position` (the border predicate used at enrollment).
    pub(crate) fn enrollment_probe(
        &mut self,
        image: &BinaryImage,
        position: &Position,
        element: usize,
        target: &mut Position,
    ) -> Result<bool> {
        self.counters.insert_comparisons[self.se_iteration] += 1;
        self.mode
            .detect_probe_into(position, &self.u_elements[element], target)?;
        if image.contains(target) {
            if self.y.value(target)? == self.mode.candidate_phase() {
                return Ok(false);
            }
        } else if self.mode == Mode::Dilation {
            return Ok(false);
        }
        Ok(true)
    }
}

/// Algorithm-specific hooks invoked by the engine skeleton.
pub(crate) trait Variant {
    const NAME: &'static str;
    /// Whether the skeleton removes border pixels from the queue itself.
    const REGULAR_REMOVAL: bool;
    const USE_CANDIDATE_MATRIX: bool;

    fn custom_initialize(&mut self, core: &mut EngineCore) -> Result<()> {
        let _ = core;
        Ok(())
    }

    /// Called for every enrolled candidate during preparation.
    fn initial_candidate_found(
        &mut self,
        core: &mut EngineCore,
        image: &BinaryImage,
        id: CandidateId,
        position: &Position,
    ) -> Result<()>;

    /// Fills `core.border[..core.border_len]` with the ids on the border
    /// of the current sub-iteration.
    fn detect_border(
        &mut self,
        core: &mut EngineCore,
        se_index: usize,
        element_order: &[usize],
    ) -> Result<()>;

    /// Re-enqueues pixels exposed by the border just removed.
    fn insert_new_candidates(
        &mut self,
        core: &mut EngineCore,
        residues: &GrayscaleImage,
    ) -> Result<()>;

    fn remove_candidate(&mut self, core: &mut EngineCore, id: CandidateId) -> Result<()> {
        core.remove_candidate(id)
    }
}

fn wall_clock_us() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_micros())
        .unwrap_or(0)
}

/// Non-origin foreground offsets of every element, in iterator order.
/// Rejects elements that do not contain the origin as foreground.
fn vectorize_elements(family: &[StructuringElement]) -> Result<Vec<Vec<Position>>> {
    let mut vectorized = Vec::with_capacity(family.len());
    for element in family {
        let origin = Position::origin(element.bounding_box().dim())?;
        if !element.contains(&origin) || !element.value(&origin)? {
            return Err(MorphError::OriginNotInElement);
        }
        let mut offsets = Vec::new();
        let mut it = PositionIterator::new(element.bounding_box());
        loop {
            let p = it.value();
            if !p.is_origin() && element.value(p)? {
                offsets.push(p.clone());
            }
            if !it.iterate() {
                break;
            }
        }
        vectorized.push(offsets);
    }
    Ok(vectorized)
}

/// Builds `u_elements` (distinct offsets of the family in union-box
/// iterator order) and, per element, its sorted offset indices.
fn build_element_index(
    vectorized: &[Vec<Position>],
    dim: usize,
) -> Result<(Vec<Position>, Vec<Vec<usize>>)> {
    let mut union_box = BoundingBox::at_origin(dim)?;
    for offsets in vectorized {
        for p in offsets {
            union_box.expand_point(p)?;
        }
    }
    let mut union_mask = StructuringElement::new(&union_box, true)?;
    for offsets in vectorized {
        for p in offsets {
            union_mask.set_value(p, true)?;
        }
    }
    let mut u_elements = Vec::new();
    let mut it = PositionIterator::new(&union_box);
    loop {
        if union_mask.value(it.value())? {
            u_elements.push(it.value().clone());
        }
        if !it.iterate() {
            break;
        }
    }
    // Both sequences follow the same lexicographic key, so a single
    // forward pass pairs every offset with its u-index.
    let mut se_elements = Vec::with_capacity(vectorized.len());
    for offsets in vectorized {
        let mut indexes = Vec::with_capacity(offsets.len());
        let mut matched = 0;
        for (k, u) in u_elements.iter().enumerate() {
            if matched < offsets.len() && offsets[matched] == *u {
                indexes.push(k);
                matched += 1;
            }
        }
        if matched != offsets.len() {
            return Err(MorphError::ElementIndexMismatch);
        }
        se_elements.push(indexes);
    }
    Ok((u_elements, se_elements))
}

/// Walks the image in iterator order and enrolls every candidate-phase
/// pixel: an arena slot, the lookup grid entry where kept, and the
/// variant's enrollment hook.
fn enroll_candidates<V: Variant>(
    variant: &mut V,
    core: &mut EngineCore,
    image: &BinaryImage,
) -> Result<()> {
    let mut it = PositionIterator::new(image.size().bounds());
    loop {
        core.counters.insert_comparisons[core.se_iteration] += 1;
        core.counters.insert_accesses[core.se_iteration] += 5;
        if image.value(it.value())? == core.mode.candidate_phase() {
            let position = it.value().clone();
            let id = core.arena.push_slot(position.clone());
            if let Some(matrix) = core.candidate_matrix.as_mut() {
                core.counters.insert_accesses[core.se_iteration] += 1;
                matrix.set_value(&position, id)?;
            }
            variant.initial_candidate_found(core, image, id, &position)?;
        }
        if !it.iterate() {
            break;
        }
    }
    Ok(())
}

fn main_loop<V: Variant, R: Rng>(
    variant: &mut V,
    core: &mut EngineCore,
    residues: &mut GrayscaleImage,
    rng: &mut R,
) -> Result<()> {
    let family_len = core.se_elements.len();
    let mut se_order: Vec<usize> = (0..family_len).collect();
    let mut element_orders: Vec<Vec<usize>> = core
        .se_elements
        .iter()
        .map(|elements| (0..elements.len()).collect())
        .collect();
    core.se_iteration = 0;
    let mut not_done = 0;
    while !core.arena.is_empty() && not_done < family_len {
        core.counters.push_iteration();
        core.se_iteration += 1;
        shuffle(&mut se_order, rng);
        not_done = 0;
        trace!("iteration {}: se order {:?}", core.se_iteration, se_order);
        for &se_index in &se_order {
            if core.arena.is_empty() {
                break;
            }
            core.border_len = 0;
            shuffle(&mut element_orders[se_index], rng);
            variant.detect_border(core, se_index, &element_orders[se_index])?;
            for slot in 0..core.border_len {
                let id = core.border[slot];
                let position = core.arena.position(id).clone();
                core.y
                    .set_value(&position, !core.mode.candidate_phase())?;
                if V::REGULAR_REMOVAL {
                    core.remove_candidate(id)?;
                }
                core.counters.remove_accesses[core.se_iteration] += 1;
                residues.set_value(&position, core.se_iteration as i32)?;
            }
            variant.insert_new_candidates(core, residues)?;
            if core.border_len == 0 {
                not_done += 1;
            } else {
                not_done = 0;
            }
            core.counters.border_elements[core.se_iteration] += core.border_len as u64;
        }
    }
    Ok(())
}

/// Runs one full transform with the given variant.
pub(crate) fn run_transform<V: Variant, R: Rng>(
    variant: &mut V,
    mode: Mode,
    image: &BinaryImage,
    family: &[StructuringElement],
    rng: &mut R,
) -> Result<TransformOutput> {
    if family.is_empty() {
        return Err(MorphError::EmptyFamily);
    }
    let mut residues = GrayscaleImage::new(image.size(), -1)?;
    let mut it = PositionIterator::new(image.size().bounds());
    loop {
        if image.value(it.value())? {
            residues.set_value(it.value(), 0)?;
        }
        if !it.iterate() {
            break;
        }
    }
    let vectorized = vectorize_elements(family)?;
    let started_us = wall_clock_us();
    let (u_elements, se_elements) = build_element_index(&vectorized, image.size().dim())?;
    debug!(
        "{} {}: {} elements in the family, {} distinct offsets",
        V::NAME,
        mode.label(),
        family.len(),
        u_elements.len()
    );
    let mut core = EngineCore::new(mode, image, u_elements, se_elements, V::USE_CANDIDATE_MATRIX)?;
    variant.custom_initialize(&mut core)?;
    enroll_candidates(variant, &mut core, image)?;
    core.border = vec![HEADER; core.arena.len()];
    debug!(
        "{} {}: {} candidates enrolled",
        V::NAME,
        mode.label(),
        core.arena.len() - 1
    );
    main_loop(variant, &mut core, &mut residues, rng)?;
    let finished_us = wall_clock_us();
    Ok(TransformOutput {
        residues,
        counters: core.counters,
        started_us,
        finished_us,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(coords: &[i64]) -> Position {
        Position::from_coords(coords.to_vec()).unwrap()
    }

    fn element_from(offsets: &[[i64; 2]]) -> StructuringElement {
        let mut bb = BoundingBox::at_origin(2).unwrap();
        for o in offsets {
            bb.expand_point(&pos(o)).unwrap();
        }
        let mut se = StructuringElement::new(&bb, true).unwrap();
        se.set_value(&pos(&[0, 0]), true).unwrap();
        for o in offsets {
            se.set_value(&pos(o), true).unwrap();
        }
        se
    }

    #[test]
    fn vectorization_rejects_missing_origin() {
        let bb = BoundingBox::new(&pos(&[1, 1]), &pos(&[2, 2])).unwrap();
        let se = StructuringElement::new(&bb, false).unwrap();
        assert!(matches!(
            vectorize_elements(&[se]),
            Err(MorphError::OriginNotInElement)
        ));

        let bb = BoundingBox::new(&pos(&[-1, -1]), &pos(&[1, 1])).unwrap();
        let mut se = StructuringElement::new(&bb, false).unwrap();
        se.set_value(&pos(&[0, 0]), false).unwrap();
        assert!(matches!(
            vectorize_elements(&[se]),
            Err(MorphError::OriginNotInElement)
        ));
    }

    #[test]
    fn vectorization_skips_the_origin_itself() {
        let se = element_from(&[[1, 0], [0, 1]]);
        let vectorized = vectorize_elements(&[se]).unwrap();
        assert_eq!(vectorized[0], vec![pos(&[1, 0]), pos(&[0, 1])]);
    }

    #[test]
    fn element_index_covers_the_family_union() {
        let horizontal = element_from(&[[-1, 0], [1, 0]]);
        let vertical = element_from(&[[0, -1], [0, 1]]);
        let vectorized = vectorize_elements(&[horizontal, vertical]).unwrap();
        let (u_elements, se_elements) = build_element_index(&vectorized, 2).unwrap();
        assert_eq!(u_elements.len(), 4);
        // Iterator order over the union box: (0,-1), (-1,0), (1,0), (0,1).
        assert_eq!(u_elements[0], pos(&[0, -1]));
        assert_eq!(u_elements[1], pos(&[-1, 0]));
        assert_eq!(u_elements[2], pos(&[1, 0]));
        assert_eq!(u_elements[3], pos(&[0, 1]));
        assert_eq!(se_elements[0], vec![1, 2]);
        assert_eq!(se_elements[1], vec![0, 3]);
    }

    #[test]
    fn counters_start_with_a_zero_row() {
        let mut counters = CounterSet::new();
        counters.push_iteration();
        assert_eq!(counters.iterations(), 1);
        assert_eq!(counters.detect_comparisons[0], 0);
        assert_eq!(counters.border_elements[0], 0);
    }

    #[test]
    fn mode_probe_sign_conventions() {
        let p = pos(&[2, 2]);
        let delta = pos(&[1, 0]);
        let mut out = Position::origin(2).unwrap();
        Mode::Erosion.detect_probe_into(&p, &delta, &mut out).unwrap();
        assert_eq!(out, pos(&[3, 2]));
        Mode::Dilation.detect_probe_into(&p, &delta, &mut out).unwrap();
        assert_eq!(out, pos(&[1, 2]));
        Mode::Erosion.insert_probe_into(&p, &delta, &mut out).unwrap();
        assert_eq!(out, pos(&[1, 2]));
        Mode::Dilation.insert_probe_into(&p, &delta, &mut out).unwrap();
        assert_eq!(out, pos(&[3, 2]));
    }
}
