//! block.rs
//! Blocks are the unit of navigation and acceptance: a run of lines on one
//! side sharing one classification, addressed by a display line range.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MergeError;
use crate::script::Line;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
    /// Context blocks, mirrored on both panes. Owns no pane of its own.
    Common,
}

impl Side {
    /// Slot of this side's pane; only A and B own one.
    pub fn pane(self) -> Result<usize, MergeError> {
        match self {
            Side::A => Ok(0),
            Side::B => Ok(1),
            Side::Common => Err(MergeError::InvalidSide(self.to_string())),
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
            Side::Common => Side::Common,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("a"),
            Side::B => f.write_str("b"),
            Side::Common => f.write_str("common"),
        }
    }
}

impl FromStr for Side {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "1" | "left" | "first" => Ok(Side::A),
            "b" | "2" | "right" | "second" => Ok(Side::B),
            "common" => Ok(Side::Common),
            _ => Err(MergeError::InvalidSide(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockKind {
    Insert,
    Delete,
    Equal,
    Replace,
    Context,
}

impl BlockKind {
    /// Equal and Replace blocks always come in one-per-side pairs.
    pub fn is_paired(self) -> bool {
        matches!(self, BlockKind::Equal | BlockKind::Replace)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BlockKind::Insert => "insert",
            BlockKind::Delete => "delete",
            BlockKind::Equal => "equal",
            BlockKind::Replace => "replace",
            BlockKind::Context => "context",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub usize);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairId(pub usize);

/// Half-open `[start, end)` interval of 1-based display line numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line < self.end
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Created once by the aligner and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub side: Side,
    pub kind: BlockKind,
    pub lines: Vec<Line>,
    pub range: LineRange,
    pub pair_id: Option<PairId>,
}

impl Block {
    /// Concatenated line contents, newlines included.
    pub fn text(&self) -> String {
        self.lines.iter().map(Line::raw).collect()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}
