//! session.rs
//! One two-way merge: the aligned blocks, both panes, the focus and the
//! output buffer, driven one command at a time by the shell.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::align::align;
use crate::block::{BlockId, BlockKind, LineRange, Side};
use crate::config::SessionConfig;
use crate::diff::diff_texts;
use crate::error::MergeError;
use crate::merge::{MergeBuffer, MergeEntry};
use crate::nav::{Direction, Navigator, Viewports};
use crate::pane::PaneIndex;
use crate::script::{EditScript, split_lines};

/// What the rendering surface needs to draw one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockView {
    pub id: BlockId,
    pub kind: BlockKind,
    pub range: LineRange,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideStats {
    pub total: usize,
    pub live: usize,
    pub pending: usize,
    pub by_kind: BTreeMap<BlockKind, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub a: SideStats,
    pub b: SideStats,
    pub output_lines: usize,
    pub accepted: usize,
}

#[derive(Debug, Clone)]
pub struct Session {
    script: EditScript,
    panes: PaneIndex,
    nav: Navigator,
    buffer: MergeBuffer,
    languages: [String; 2],
}

impl Session {
    pub fn new(text_a: &str, text_b: &str, script: EditScript) -> Self {
        Self::with_config(text_a, text_b, script, &SessionConfig::default())
    }

    pub fn with_config(text_a: &str, text_b: &str, script: EditScript, config: &SessionConfig) -> Self {
        let (lines_a, lines_b) = (split_lines(text_a).len(), split_lines(text_b).len());
        if script.side_line_count(true) != lines_a || script.side_line_count(false) != lines_b {
            warn!(
                lines_a,
                lines_b,
                script_a = script.side_line_count(true),
                script_b = script.side_line_count(false),
                "edit script does not cover the input texts"
            );
        }

        let panes = PaneIndex::new(align(&script));
        let nav = Navigator::new(&panes, config.context_is_jump_target);
        let unknown = || "unknown".to_string();
        let session = Self {
            script,
            panes,
            nav,
            buffer: MergeBuffer::new(),
            languages: [
                config.language_a.clone().unwrap_or_else(unknown),
                config.language_b.clone().unwrap_or_else(unknown),
            ],
        };
        info!(
            blocks_a = session.panes.live_len(Side::A).unwrap_or(0),
            blocks_b = session.panes.live_len(Side::B).unwrap_or(0),
            "merge session opened"
        );
        session
    }

    /// Diff the two texts and open a session on the result.
    pub fn from_texts(text_a: &str, text_b: &str, config: &SessionConfig) -> Self {
        let script = diff_texts(text_a, text_b, config);
        Self::with_config(text_a, text_b, script, config)
    }

    pub fn blocks_on_side(&self, side: Side) -> Result<Vec<BlockView>, MergeError> {
        Ok(self
            .panes
            .side_blocks(side)?
            .into_iter()
            .map(|b| BlockView { id: b.id, kind: b.kind, range: b.range, text: b.text() })
            .collect())
    }

    pub fn advance(&mut self, side: Side, direction: Direction) -> Result<BlockId, MergeError> {
        self.nav.advance(&self.panes, side, direction)
    }

    pub fn jump_linked(&mut self, side: Side) -> Result<Option<BlockId>, MergeError> {
        self.nav.jump_linked(&self.panes, side)
    }

    pub fn sync_to_focus(&self) -> Viewports {
        self.nav.sync_to_focus(&self.panes)
    }

    pub fn focused_block(&self, side: Side) -> Result<BlockId, MergeError> {
        self.nav.focused_block(&self.panes, side)
    }

    /// Focus the live block at `position` on `side`.
    pub fn set_focus(&mut self, side: Side, position: usize) -> Result<BlockId, MergeError> {
        let id = *self
            .panes
            .live_ids(side)?
            .get(position)
            .ok_or(MergeError::NoLiveBlockAtFocus(side))?;
        self.nav.set_focus(side, position)?;
        Ok(id)
    }

    /// Accept the focused block on `side` and return the merge output.
    pub fn accept(&mut self, side: Side) -> Result<String, MergeError> {
        let position = self.nav.focus(&self.panes, side)?;
        self.buffer.accept(&mut self.panes, side, position)?;
        // focus the block that slid into place, or the new last one
        let remaining = self.panes.live_len(side)?;
        self.nav.set_focus(side, position.min(remaining.saturating_sub(1)))?;
        Ok(self.buffer.text())
    }

    /// Undo the latest acceptance, refocus the restored block and return
    /// the merge output.
    pub fn undo(&mut self) -> Result<String, MergeError> {
        let MergeEntry { origin_side, block, .. } = self.buffer.undo(&mut self.panes)?;
        if let Some(position) = self.panes.position(block) {
            self.nav.set_focus(origin_side, position)?;
        }
        Ok(self.buffer.text())
    }

    /// Live blocks on `side` that still carry a change (anything but Context).
    pub fn pending(&self, side: Side) -> Result<usize, MergeError> {
        Ok(self
            .panes
            .side_blocks(side)?
            .iter()
            .filter(|b| b.kind != BlockKind::Context)
            .count())
    }

    pub fn output_text(&self) -> String {
        self.buffer.text()
    }

    pub fn history(&self) -> &[MergeEntry] {
        self.buffer.history()
    }

    pub fn script(&self) -> &EditScript {
        &self.script
    }

    pub fn panes(&self) -> &PaneIndex {
        &self.panes
    }

    pub fn language(&self, side: Side) -> Result<&str, MergeError> {
        Ok(&self.languages[side.pane()?])
    }

    pub fn set_language(&mut self, side: Side, tag: impl Into<String>) -> Result<(), MergeError> {
        self.languages[side.pane()?] = tag.into();
        Ok(())
    }

    pub fn stats(&self) -> SessionStats {
        let side_stats = |side: Side| {
            let mut stats = SideStats::default();
            let all = self.panes.all_ids(side).unwrap_or_default();
            stats.total = all.len();
            stats.live = self.panes.live_len(side).unwrap_or(0);
            stats.pending = self.pending(side).unwrap_or(0);
            for block in all.iter().filter_map(|id| self.panes.block(*id)) {
                *stats.by_kind.entry(block.kind).or_insert(0) += 1;
            }
            stats
        };
        SessionStats {
            a: side_stats(Side::A),
            b: side_stats(Side::B),
            output_lines: self.buffer.len(),
            accepted: self.buffer.history().len(),
        }
    }
}
