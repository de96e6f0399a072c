//! pane.rs
//! Per-side live block lists plus the cross-side link table.
//!
//! Links are resolved once at construction: Equal/Replace blocks by their
//! shared pair id, Context blocks to their mirror on the other side (the
//! k-th Context block of A mirrors the k-th Context block of B). Links
//! outlive removal so an undo can put a block back next to its counterpart.
//!
//! A block's list is recorded separately from its `side`, since Context
//! blocks carry `Side::Common` but still live in exactly one pane.

use std::collections::HashMap;

use tracing::trace;

use crate::align::Alignment;
use crate::block::{Block, BlockId, BlockKind, PairId, Side};
use crate::error::MergeError;

#[derive(Debug, Clone)]
pub struct PaneIndex {
    blocks: HashMap<BlockId, Block>,
    original: [Vec<BlockId>; 2],
    live: [Vec<BlockId>; 2],
    links: HashMap<BlockId, BlockId>,
    slots: HashMap<BlockId, usize>,
}

impl PaneIndex {
    pub fn new(alignment: Alignment) -> Self {
        let Alignment { a, b } = alignment;
        let mut links = HashMap::new();

        let mut pairs: HashMap<PairId, BlockId> = HashMap::new();
        for block in a.iter().filter(|b| b.kind.is_paired()) {
            if let Some(pair) = block.pair_id {
                pairs.insert(pair, block.id);
            }
        }
        for block in b.iter().filter(|b| b.kind.is_paired()) {
            if let Some(other) = block.pair_id.and_then(|p| pairs.get(&p)) {
                links.insert(block.id, *other);
                links.insert(*other, block.id);
            }
        }

        let context_a = a.iter().filter(|b| b.kind == BlockKind::Context);
        let context_b = b.iter().filter(|b| b.kind == BlockKind::Context);
        for (x, y) in context_a.zip(context_b) {
            links.insert(x.id, y.id);
            links.insert(y.id, x.id);
        }

        let ids_a: Vec<BlockId> = a.iter().map(|b| b.id).collect();
        let ids_b: Vec<BlockId> = b.iter().map(|b| b.id).collect();
        let slots = ids_a
            .iter()
            .map(|id| (*id, 0))
            .chain(ids_b.iter().map(|id| (*id, 1)))
            .collect();
        let blocks = a.into_iter().chain(b).map(|b| (b.id, b)).collect();

        Self {
            blocks,
            original: [ids_a.clone(), ids_b.clone()],
            live: [ids_a, ids_b],
            links,
            slots,
        }
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    /// Live blocks of `side`, in display order.
    pub fn side_blocks(&self, side: Side) -> Result<Vec<&Block>, MergeError> {
        Ok(self.live_ids(side)?.iter().filter_map(|id| self.blocks.get(id)).collect())
    }

    pub fn live_ids(&self, side: Side) -> Result<&[BlockId], MergeError> {
        Ok(&self.live[side.pane()?])
    }

    /// Every block the aligner produced for `side`, accepted ones included.
    pub fn all_ids(&self, side: Side) -> Result<&[BlockId], MergeError> {
        Ok(&self.original[side.pane()?])
    }

    pub fn live_len(&self, side: Side) -> Result<usize, MergeError> {
        Ok(self.live_ids(side)?.len())
    }

    pub fn counterpart(&self, id: BlockId) -> Option<BlockId> {
        self.links.get(&id).copied()
    }

    /// The pane (A or B) whose list holds `id`.
    pub fn pane_of(&self, id: BlockId) -> Option<Side> {
        match self.slots.get(&id)? {
            0 => Some(Side::A),
            _ => Some(Side::B),
        }
    }

    /// Position of `id` in its pane's live list, if it is live.
    pub fn position(&self, id: BlockId) -> Option<usize> {
        let live = self.live.get(*self.slots.get(&id)?)?;
        live.iter().position(|x| *x == id)
    }

    pub fn is_live(&self, id: BlockId) -> bool {
        self.position(id).is_some()
    }

    /// Drop `id` from its side's live list and return the position it held.
    /// The other side is left alone.
    pub fn remove(&mut self, id: BlockId) -> Option<usize> {
        let position = self.position(id)?;
        let slot = *self.slots.get(&id)?;
        self.live[slot].remove(position);
        trace!(block = %id, slot, position, "block removed from live list");
        Some(position)
    }

    /// Put a previously removed block back at `position` (clamped to the
    /// list end) and return where it landed.
    pub fn reinsert(&mut self, id: BlockId, position: usize) -> Option<usize> {
        let slot = *self.slots.get(&id)?;
        if let Some(current) = self.position(id) {
            return Some(current);
        }
        let live = &mut self.live[slot];
        let position = position.min(live.len());
        live.insert(position, id);
        trace!(block = %id, slot, position, "block restored to live list");
        Some(position)
    }
}
