// src/morphology/matrix.rs

//! The matrix algorithm: a sparse 2-D doubly-linked structure recording
//! which union offset currently disqualifies which candidate, so border
//! detection drains pre-sorted lists instead of rescanning the queue.
//!
//! For every u-index `k` there is a doubly-linked list over two parallel
//! arrays (`link_next[k]`, `link_prev[k]`, header shared at index 0)
//! holding exactly the candidates whose probe through `u[k]` lands in the
//! opposing phase (or outside the image, under erosion).  Each candidate
//! additionally threads a singly-linked chain (`candidate_next_link` into
//! `link_next_link[k]`) enumerating the `k`s that currently link it, so
//! removal can unlink from every list without searching.
//!
//! Invariant: id appears in list `k` if and only if `k` appears in the
//! chain of id.  `linking_procedure` establishes both sides together and
//! `remove_candidate` retires both sides together; detection only ever
//! drains list heads, so a freshly flipped neighbor pair is the only way
//! a link can appear.

use crate::geom::Position;
use crate::image::{BinaryImage, GrayscaleImage};
use crate::morphology::engine::{EngineCore, Variant};
use crate::morphology::queue::{CandidateId, HEADER};
use crate::utils::error::{MorphError, Result};

pub(crate) struct MatrixVariant {
    /// Per u-index, successor ids of the disqualification list.
    link_next: Vec<Vec<CandidateId>>,
    /// Per u-index, predecessor ids of the disqualification list.
    link_prev: Vec<Vec<CandidateId>>,
    /// Per u-index, the next u-index of each candidate's chain.
    link_next_link: Vec<Vec<u32>>,
    /// Head of each candidate's chain of linking u-indexes.
    candidate_next_link: Vec<u32>,
    /// Chain terminator: the family's u-cardinality.
    chain_end: u32,
}

impl MatrixVariant {
    pub(crate) fn new() -> Self {
        MatrixVariant {
            link_next: Vec::new(),
            link_prev: Vec::new(),
            link_next_link: Vec::new(),
            candidate_next_link: Vec::new(),
            chain_end: 0,
        }
    }

    /// Splices `id` at the tail of list `element` and prepends `element`
    /// to the candidate's chain, then makes sure the candidate is
    /// enqueued.
    fn linking_procedure(
        &mut self,
        core: &mut EngineCore,
        id: CandidateId,
        element: usize,
    ) -> Result<()> {
        let slot = id as usize;
        let tail = self.link_prev[element][HEADER as usize];
        let chained = self.candidate_next_link[slot];
        core.counters.insert_accesses[core.se_iteration] += 6;
        self.link_next[element][slot] = HEADER;
        self.link_prev[element][slot] = tail;
        self.link_next[element][tail as usize] = id;
        self.link_prev[element][HEADER as usize] = id;
        self.link_next_link[element][slot] = chained;
        self.candidate_next_link[slot] = element as u32;
        core.enqueue_candidate(id)
    }

    /// Unlinks `id` from every list its chain names.  The chain itself is
    /// left stale; a removed candidate is never consulted again.
    fn unlink_all(&mut self, core: &mut EngineCore, id: CandidateId) -> Result<()> {
        let slot = id as usize;
        let mut element = self.candidate_next_link[slot];
        while element != self.chain_end {
            let list = element as usize;
            let next = self.link_next[list][slot];
            let prev = self.link_prev[list][slot];
            let chained = self.link_next_link[list][slot];
            core.counters.remove_accesses[core.se_iteration] += 2;
            self.link_prev[list][next as usize] = prev;
            self.link_next[list][prev as usize] = next;
            element = chained;
        }
        Ok(())
    }

    #[cfg(test)]
    fn list_members(&self, element: usize) -> Vec<CandidateId> {
        let mut members = Vec::new();
        let mut current = self.link_next[element][HEADER as usize];
        while current != HEADER {
            members.push(current);
            current = self.link_next[element][current as usize];
        }
        members
    }

    #[cfg(test)]
    fn chain_members(&self, id: CandidateId) -> Vec<u32> {
        let mut members = Vec::new();
        let mut element = self.candidate_next_link[id as usize];
        while element != self.chain_end {
            members.push(element);
            element = self.link_next_link[element as usize][id as usize];
        }
        members
    }
}

impl Variant for MatrixVariant {
    const NAME: &'static str = "matrix";
    // detect_border dequeues while draining; a second removal by the
    // skeleton would trip the arena's membership checks.
    const REGULAR_REMOVAL: bool = false;
    const USE_CANDIDATE_MATRIX: bool = true;

    fn custom_initialize(&mut self, core: &mut EngineCore) -> Result<()> {
        self.chain_end = core.u_cardinality() as u32;
        core.counters.insert_accesses[core.se_iteration] += 3;
        for _ in 0..core.u_cardinality() {
            core.counters.insert_accesses[core.se_iteration] += 3;
            self.link_next_link.push(vec![self.chain_end]);
            self.link_next.push(vec![HEADER]);
            self.link_prev.push(vec![HEADER]);
        }
        self.candidate_next_link.push(self.chain_end);
        Ok(())
    }

    /// Grows each list by one row for the new candidate, then records a
    /// link for every union offset whose probe already lands in the
    /// opposing phase.
    fn initial_candidate_found(
        &mut self,
        core: &mut EngineCore,
        image: &BinaryImage,
        id: CandidateId,
        position: &Position,
    ) -> Result<()> {
        core.counters.insert_accesses[core.se_iteration] += 1;
        self.candidate_next_link.push(self.chain_end);
        for element in 0..core.u_cardinality() {
            core.counters.insert_accesses[core.se_iteration] += 3;
            self.link_next_link[element].push(self.chain_end);
            self.link_next[element].push(HEADER);
            self.link_prev[element].push(HEADER);
        }
        let mut target = Position::origin(core.dim())?;
        for element in 0..core.u_cardinality() {
            if core.enrollment_probe(image, position, element, &mut target)? {
                self.linking_procedure(core, id, element)?;
            }
        }
        Ok(())
    }

    /// Drains the disqualification list of each element offset in the
    /// shuffled order.  Every drained candidate is already off the queue
    /// and every list by the time it lands in the border buffer.
    fn detect_border(
        &mut self,
        core: &mut EngineCore,
        se_index: usize,
        element_order: &[usize],
    ) -> Result<()> {
        for &ordinal in element_order {
            let element = core.se_elements[se_index][ordinal];
            loop {
                let first = self.link_next[element][HEADER as usize];
                if first == HEADER {
                    break;
                }
                self.remove_candidate(core, first)?;
                core.push_border(first);
            }
        }
        Ok(())
    }

    /// Border's insertion scan, except that hits go through
    /// `linking_procedure` so a re-enqueued candidate already knows which
    /// offsets disqualify it.
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
                self.linking_procedure(core, node, element)?;
            }
        }
        Ok(())
    }

    fn remove_candidate(&mut self, core: &mut EngineCore, id: CandidateId) -> Result<()> {
        if id == HEADER {
            return Err(MorphError::HeaderReserved);
        }
        self.unlink_all(core, id)?;
        core.remove_candidate(id)
    }
}
