//! nav.rs
//! Focus tracking for the two panes and lockstep jumps between them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::block::{BlockId, BlockKind, LineRange, Side};
use crate::error::MergeError;
use crate::pane::PaneIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Next,
    Prev,
}

/// Line ranges each pane must show to keep the focused blocks aligned.
/// `None` when that side has no live block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Viewports {
    pub a: Option<LineRange>,
    pub b: Option<LineRange>,
}

#[derive(Debug, Clone)]
pub struct Navigator {
    focus: [usize; 2],
    context_targets: bool,
}

impl Navigator {
    /// Focus starts on the first jump target of each side.
    pub fn new(panes: &PaneIndex, context_targets: bool) -> Self {
        let mut nav = Self { focus: [0, 0], context_targets };
        for side in [Side::A, Side::B] {
            let first = nav.find(panes, side, 0, Direction::Next, true).unwrap_or(0);
            if let Ok(slot) = side.pane() {
                nav.focus[slot] = first;
            }
        }
        nav
    }

    /// Focus position on `side`, clamped to its live list.
    pub fn focus(&self, panes: &PaneIndex, side: Side) -> Result<usize, MergeError> {
        let len = panes.live_len(side)?;
        if len == 0 {
            return Err(MergeError::NoLiveBlockAtFocus(side));
        }
        Ok(self.focus[side.pane()?].min(len - 1))
    }

    pub fn focused_block(&self, panes: &PaneIndex, side: Side) -> Result<BlockId, MergeError> {
        let position = self.focus(panes, side)?;
        panes
            .live_ids(side)?
            .get(position)
            .copied()
            .ok_or(MergeError::NoLiveBlockAtFocus(side))
    }

    pub fn set_focus(&mut self, side: Side, position: usize) -> Result<(), MergeError> {
        self.focus[side.pane()?] = position;
        Ok(())
    }

    /// Move to the next/previous jump target on `side`. Past the last target
    /// the focus stays put.
    pub fn advance(&mut self, panes: &PaneIndex, side: Side, direction: Direction) -> Result<BlockId, MergeError> {
        let current = self.focus(panes, side)?;
        if let Some(target) = self.find(panes, side, current, direction, false) {
            self.focus[side.pane()?] = target;
        } else {
            self.focus[side.pane()?] = current;
        }
        let id = self.focused_block(panes, side)?;
        debug!(%side, ?direction, block = %id, "focus moved");
        Ok(id)
    }

    /// Focus the counterpart of `side`'s focused block on the other side.
    /// Returns the newly focused block, or `None` when there is no live
    /// counterpart to jump to.
    pub fn jump_linked(&mut self, panes: &PaneIndex, side: Side) -> Result<Option<BlockId>, MergeError> {
        let focused = self.focused_block(panes, side)?;
        let Some(other) = panes.counterpart(focused) else {
            return Ok(None);
        };
        let Some(position) = panes.position(other) else {
            return Ok(None);
        };
        self.focus[side.opposite().pane()?] = position;
        debug!(%side, from = %focused, to = %other, "jumped to linked block");
        Ok(Some(other))
    }

    pub fn sync_to_focus(&self, panes: &PaneIndex) -> Viewports {
        let range = |side| {
            self.focused_block(panes, side)
                .ok()
                .and_then(|id| panes.block(id))
                .map(|b| b.range)
        };
        Viewports { a: range(Side::A), b: range(Side::B) }
    }

    fn is_target(&self, panes: &PaneIndex, id: BlockId) -> bool {
        panes
            .block(id)
            .is_some_and(|b| self.context_targets || b.kind != BlockKind::Context)
    }

    /// Search from `from` in `direction`, including `from` itself only when
    /// `inclusive`.
    fn find(&self, panes: &PaneIndex, side: Side, from: usize, direction: Direction, inclusive: bool) -> Option<usize> {
        let ids = panes.live_ids(side).ok()?;
        let hit = |&i: &usize| self.is_target(panes, ids[i]);
        match direction {
            Direction::Next => {
                let start = if inclusive { from } else { from + 1 };
                (start..ids.len()).find(hit)
            }
            Direction::Prev => {
                let end = if inclusive { from + 1 } else { from };
                (0..end.min(ids.len())).rev().find(hit)
            }
        }
    }
}
