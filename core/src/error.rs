//! error.rs
//! Typed command errors. A rejected command leaves the session untouched.

use thiserror::Error;

use crate::block::Side;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// `undo` with no acceptance on record.
    #[error("nothing to undo")]
    EmptyHistory,

    /// The command named a side that owns no pane.
    #[error("invalid side `{0}` (expected a or b)")]
    InvalidSide(String),

    /// `advance`/`accept` on a side whose live list is empty.
    #[error("no live block on side {0}")]
    NoLiveBlockAtFocus(Side),
}
