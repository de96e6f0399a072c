//! merge.rs
//! The merge output: an append-only line sequence and a LIFO history of
//! accepted blocks.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::block::{BlockId, Side};
use crate::error::MergeError;
use crate::pane::PaneIndex;
use crate::script::{Line, join_lines};

/// Snapshot of one acceptance, enough to reverse it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeEntry {
    pub text: String,
    pub origin_side: Side,
    /// Live-list index the block held when it was accepted.
    pub origin_position: usize,
    pub block: BlockId,
    pub line_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MergeBuffer {
    output: Vec<Line>,
    history: Vec<MergeEntry>,
}

impl MergeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the block at live `position` on `side` to the output and drop
    /// it from that side's list. Returns the output length in lines.
    pub fn accept(&mut self, panes: &mut PaneIndex, side: Side, position: usize) -> Result<usize, MergeError> {
        let id = *panes
            .live_ids(side)?
            .get(position)
            .ok_or(MergeError::NoLiveBlockAtFocus(side))?;
        let block = panes.block(id).ok_or(MergeError::NoLiveBlockAtFocus(side))?;
        let entry = MergeEntry {
            text: block.text(),
            origin_side: side,
            origin_position: position,
            block: id,
            line_count: block.line_count(),
        };
        self.output.extend(block.lines.iter().cloned());
        panes.remove(id);

        debug!(%side, block = %id, position, lines = entry.line_count, "block accepted");
        self.history.push(entry);
        Ok(self.output.len())
    }

    /// Reverse the most recent acceptance.
    pub fn undo(&mut self, panes: &mut PaneIndex) -> Result<MergeEntry, MergeError> {
        let entry = self.history.pop().ok_or(MergeError::EmptyHistory)?;
        let keep = self.output.len().saturating_sub(entry.line_count);
        self.output.truncate(keep);
        if panes.reinsert(entry.block, entry.origin_position).is_none() {
            warn!(block = %entry.block, "undone block is unknown to the pane index");
        }
        debug!(side = %entry.origin_side, block = %entry.block, position = entry.origin_position, "acceptance undone");
        Ok(entry)
    }

    pub fn output(&self) -> &[Line] {
        &self.output
    }

    pub fn text(&self) -> String {
        join_lines(&self.output)
    }

    pub fn len(&self) -> usize {
        self.output.len()
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    pub fn history(&self) -> &[MergeEntry] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::align;
    use crate::script::EditScript;

    fn panes() -> PaneIndex {
        let script: EditScript = "  a\n  b\n- c\n+ x\n+ y\n".parse().unwrap();
        PaneIndex::new(align(&script))
    }

    #[test]
    fn accept_appends_and_removes() {
        let mut panes = panes();
        let mut buffer = MergeBuffer::new();
        assert_eq!(buffer.accept(&mut panes, Side::A, 0), Ok(2));
        assert_eq!(buffer.text(), "a\nb\n");
        assert_eq!(buffer.accept(&mut panes, Side::B, 1), Ok(4));
        assert_eq!(buffer.text(), "a\nb\nx\ny\n");
        assert_eq!(panes.live_len(Side::A), Ok(1));
        assert_eq!(panes.live_len(Side::B), Ok(1));
        assert_eq!(buffer.history().len(), 2);
    }

    #[test]
    fn undo_truncates_by_entry_lines() {
        let mut panes = panes();
        let original_b = panes.live_ids(Side::B).unwrap().to_vec();
        let mut buffer = MergeBuffer::new();
        buffer.accept(&mut panes, Side::A, 0).unwrap();
        buffer.accept(&mut panes, Side::B, 1).unwrap();

        let entry = buffer.undo(&mut panes).unwrap();
        assert_eq!(entry.origin_side, Side::B);
        assert_eq!(entry.line_count, 2);
        assert_eq!(entry.text, "x\ny\n");
        assert_eq!(buffer.text(), "a\nb\n");
        assert_eq!(panes.live_ids(Side::B).unwrap(), original_b.as_slice());

        buffer.undo(&mut panes).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.undo(&mut panes), Err(MergeError::EmptyHistory));
    }

    #[test]
    fn accept_out_of_range_changes_nothing() {
        let mut panes = panes();
        let mut buffer = MergeBuffer::new();
        assert_eq!(
            buffer.accept(&mut panes, Side::A, 9),
            Err(MergeError::NoLiveBlockAtFocus(Side::A))
        );
        assert!(matches!(buffer.accept(&mut panes, Side::Common, 0), Err(MergeError::InvalidSide(_))));
        assert!(buffer.is_empty());
        assert!(buffer.history().is_empty());
        assert_eq!(panes.live_len(Side::A), Ok(2));
    }
}
