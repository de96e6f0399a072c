//! diff.rs
//! Produce a classified line edit script describing how `b` differs from `a`.
//!
//! The line matching itself is delegated to `similar`. On top of its hunks we
//! pair the lines of each replaced hunk position by position and emit hint
//! marks after them:
//! - `-, +, ?`    the lines differ (aligned as a Replace pair)
//! - `-, ?, +, ?` the lines differ only in whitespace (aligned as an Equal pair)
//!
//! Lines left over when a replaced hunk is uneven come out as plain
//! removals/additions.

use similar::{ChangeTag, DiffTag, TextDiff};

use crate::config::SessionConfig;
use crate::script::{EditScript, Line, ScriptLine, split_lines};

/// Compute the edit script for two texts.
pub fn diff_texts(a: &str, b: &str, config: &SessionConfig) -> EditScript {
    let old = split_lines(a);
    let new = split_lines(b);
    diff_lines(&old, &new, config)
}

pub fn diff_lines(old: &[Line], new: &[Line], config: &SessionConfig) -> EditScript {
    // Compare raw lines so a lost final newline still counts as a change.
    let old_keys: Vec<&str> = old.iter().map(Line::raw).collect();
    let new_keys: Vec<&str> = new.iter().map(Line::raw).collect();
    let diff = TextDiff::from_slices(&old_keys, &new_keys);

    let mut script = EditScript::new();
    for op in diff.ops() {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => {
                for j in new_range {
                    script.push(ScriptLine::Common(new[j].clone()));
                }
            }
            DiffTag::Delete => {
                for i in old_range {
                    script.push(ScriptLine::Removed(old[i].clone()));
                }
            }
            DiffTag::Insert => {
                for j in new_range {
                    script.push(ScriptLine::Added(new[j].clone()));
                }
            }
            DiffTag::Replace => {
                let paired = if config.pair_changed_lines {
                    old_range.len().min(new_range.len())
                } else {
                    0
                };
                for k in 0..paired {
                    let (o, n) = (&old[old_range.start + k], &new[new_range.start + k]);
                    push_pair(&mut script, o, n, config.ignore_whitespace);
                }
                for i in old_range.start + paired..old_range.end {
                    script.push(ScriptLine::Removed(old[i].clone()));
                }
                for j in new_range.start + paired..new_range.end {
                    script.push(ScriptLine::Added(new[j].clone()));
                }
            }
        }
    }
    tracing::trace!(entries = script.len(), "line diff computed");
    script
}

fn push_pair(script: &mut EditScript, old: &Line, new: &Line, ignore_whitespace: bool) {
    let (old_marks, new_marks) = intraline_marks(old.content(), new.content());
    if ignore_whitespace && normalized(old.content()) == normalized(new.content()) {
        script.push(ScriptLine::Removed(old.clone()));
        script.push(ScriptLine::Hint(old_marks));
        script.push(ScriptLine::Added(new.clone()));
        script.push(ScriptLine::Hint(new_marks));
    } else {
        script.push(ScriptLine::Removed(old.clone()));
        script.push(ScriptLine::Added(new.clone()));
        script.push(ScriptLine::Hint(new_marks));
    }
}

fn normalized(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Character marks under each line: `-` removed, `+` added, blank kept.
fn intraline_marks(old: &str, new: &str) -> (String, String) {
    let diff = TextDiff::from_chars(old, new);
    let mut old_marks = String::new();
    let mut new_marks = String::new();
    for change in diff.iter_all_changes() {
        let width = change.value().chars().count();
        match change.tag() {
            ChangeTag::Equal => {
                old_marks.push_str(&" ".repeat(width));
                new_marks.push_str(&" ".repeat(width));
            }
            ChangeTag::Delete => old_marks.push_str(&"-".repeat(width)),
            ChangeTag::Insert => new_marks.push_str(&"+".repeat(width)),
        }
    }
    (old_marks.trim_end().to_string(), new_marks.trim_end().to_string())
}
