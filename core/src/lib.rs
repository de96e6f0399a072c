//! twomerge_core: interactive two-way merge engine. Aligns a line edit script
//! into paired blocks, tracks lockstep focus across both panes and builds the
//! merge output with undo.

mod align;
mod block;
mod config;
mod diff;
mod error;
mod language;
mod merge;
mod nav;
mod pane;
mod script;
mod session;

pub use align::{Alignment, align};
pub use block::{Block, BlockId, BlockKind, LineRange, PairId, Side};
pub use config::SessionConfig;
pub use diff::{diff_lines, diff_texts};
pub use error::MergeError;
pub use language::guess_language;
pub use merge::{MergeBuffer, MergeEntry};
pub use nav::{Direction, Navigator, Viewports};
pub use pane::PaneIndex;
pub use script::{EditScript, Line, ParseScriptError, ScriptLine, join_lines, split_lines};
pub use session::{BlockView, Session, SessionStats, SideStats};

use std::fs;
use std::path::Path;

use anyhow::*;

/// Read two files and open a merge session on them. Language tags not set in
/// `config` are guessed from the file names.
pub fn open_session(path_a: &Path, path_b: &Path, config: &SessionConfig) -> Result<Session> {
    for path in [path_a, path_b] {
        if !path.is_file() {
            bail!("File {} doesn't exist", path.display());
        }
    }
    let text_a = fs::read_to_string(path_a).with_context(|| format!("reading {}", path_a.display()))?;
    let text_b = fs::read_to_string(path_b).with_context(|| format!("reading {}", path_b.display()))?;

    let mut config = config.clone();
    config.language_a.get_or_insert_with(|| guess_language(path_a).to_string());
    config.language_b.get_or_insert_with(|| guess_language(path_b).to_string());

    Ok(Session::from_texts(&text_a, &text_b, &config))
}
