//! align.rs
//! Group an edit script into typed, range-addressed blocks for each side.
//!
//! Patterns are matched on the flat script with a short lookahead, longest
//! first:
//! 1. `-, ?, +, ?` an Equal pair
//! 2. `-, +, ?`    a Replace pair
//! 3. anything else is classified line by line: `-` Delete (side A),
//!    `+` Insert (side B), `  ` Context (mirrored on both sides)
//!
//! Runs of Delete, Insert or Context lines coalesce into one block. A pair
//! always closes the open run and is emitted as its own one-line block on
//! each side, so two adjacent pairs never merge. A hint that completes no
//! pattern carries no text and is skipped.

use tracing::{debug, warn};

use crate::block::{Block, BlockId, BlockKind, LineRange, PairId, Side};
use crate::script::{EditScript, Line, ScriptLine};

/// Blocks for both sides. Block ids are unique across both lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alignment {
    pub a: Vec<Block>,
    pub b: Vec<Block>,
}

pub fn align(script: &EditScript) -> Alignment {
    let mut aligner = Aligner::new();
    let entries = script.entries();
    let mut i = 0;

    while i < entries.len() {
        if let Some((old, new)) = equal_pair_at(entries, i) {
            aligner.emit_pair(BlockKind::Equal, old, new);
            i += 4;
            continue;
        }
        if let Some((old, new)) = replace_pair_at(entries, i) {
            aligner.emit_pair(BlockKind::Replace, old, new);
            i += 3;
            continue;
        }
        match &entries[i] {
            ScriptLine::Removed(line) => aligner.push_line(BlockKind::Delete, line),
            ScriptLine::Added(line) => aligner.push_line(BlockKind::Insert, line),
            ScriptLine::Common(line) => aligner.push_line(BlockKind::Context, line),
            ScriptLine::Hint(marks) => warn!(entry = i, marks = %marks, "hint without a pair, skipped"),
        }
        i += 1;
    }

    aligner.finish()
}

fn equal_pair_at(entries: &[ScriptLine], i: usize) -> Option<(&Line, &Line)> {
    match entries.get(i..i + 4)? {
        [ScriptLine::Removed(old), ScriptLine::Hint(_), ScriptLine::Added(new), ScriptLine::Hint(_)] => {
            Some((old, new))
        }
        _ => None,
    }
}

fn replace_pair_at(entries: &[ScriptLine], i: usize) -> Option<(&Line, &Line)> {
    match entries.get(i..i + 3)? {
        [ScriptLine::Removed(old), ScriptLine::Added(new), ScriptLine::Hint(_)] => Some((old, new)),
        _ => None,
    }
}

/// A coalescing run not yet turned into blocks.
struct Run {
    kind: BlockKind,
    lines: Vec<Line>,
}

struct Aligner {
    a: Vec<Block>,
    b: Vec<Block>,
    run: Option<Run>,
    next_id: usize,
    next_pair: usize,
    // Next 1-based display line on each side.
    line_a: usize,
    line_b: usize,
}

impl Aligner {
    fn new() -> Self {
        Self {
            a: Vec::new(),
            b: Vec::new(),
            run: None,
            next_id: 0,
            next_pair: 0,
            line_a: 1,
            line_b: 1,
        }
    }

    fn push_line(&mut self, kind: BlockKind, line: &Line) {
        match &mut self.run {
            Some(run) if run.kind == kind => run.lines.push(line.clone()),
            _ => {
                self.close_run();
                self.run = Some(Run { kind, lines: vec![line.clone()] });
            }
        }
    }

    fn emit_pair(&mut self, kind: BlockKind, old: &Line, new: &Line) {
        self.close_run();
        let pair = PairId(self.next_pair);
        self.next_pair += 1;
        self.place(Side::A, kind, vec![old.clone()], Some(pair));
        self.place(Side::B, kind, vec![new.clone()], Some(pair));
    }

    fn close_run(&mut self) {
        let Some(run) = self.run.take() else {
            return;
        };
        match run.kind {
            BlockKind::Delete => self.place(Side::A, run.kind, run.lines, None),
            BlockKind::Insert => self.place(Side::B, run.kind, run.lines, None),
            _ => {
                self.place(Side::A, BlockKind::Context, run.lines.clone(), None);
                self.place(Side::B, BlockKind::Context, run.lines, None);
            }
        }
    }

    /// Append a block to `pane`'s list, advancing only that pane's line
    /// counter. Context blocks are tagged `Side::Common` on both lists.
    fn place(&mut self, pane: Side, kind: BlockKind, lines: Vec<Line>, pair_id: Option<PairId>) {
        let side = if kind == BlockKind::Context { Side::Common } else { pane };
        let (counter, list) = match pane {
            Side::A => (&mut self.line_a, &mut self.a),
            _ => (&mut self.line_b, &mut self.b),
        };
        let start = *counter;
        *counter += lines.len();
        list.push(Block {
            id: BlockId(self.next_id),
            side,
            kind,
            range: LineRange::new(start, *counter),
            lines,
            pair_id,
        });
        self.next_id += 1;
    }

    fn finish(mut self) -> Alignment {
        self.close_run();
        debug!(
            blocks_a = self.a.len(),
            blocks_b = self.b.len(),
            pairs = self.next_pair,
            lines_a = self.line_a - 1,
            lines_b = self.line_b - 1,
            "edit script aligned"
        );
        Alignment { a: self.a, b: self.b }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(s: &str) -> Line {
        Line::new(s, true)
    }

    fn script(spec: &[(&str, &str)]) -> EditScript {
        spec.iter()
            .map(|(tag, text)| match *tag {
                "-" => ScriptLine::Removed(l(text)),
                "+" => ScriptLine::Added(l(text)),
                "?" => ScriptLine::Hint(text.to_string()),
                _ => ScriptLine::Common(l(text)),
            })
            .collect()
    }

    fn kinds(blocks: &[Block]) -> Vec<BlockKind> {
        blocks.iter().map(|b| b.kind).collect()
    }

    fn assert_partition(blocks: &[Block], total: usize) {
        let mut next = 1;
        for b in blocks {
            assert_eq!(b.range.start, next, "gap or overlap at {:?}", b);
            assert!(b.range.end > b.range.start);
            assert_eq!(b.range.len(), b.line_count());
            next = b.range.end;
        }
        assert_eq!(next - 1, total);
    }

    #[test]
    fn replace_pair_between_context() {
        let al = align(&script(&[(" ", "a"), ("-", "b"), ("+", "x"), ("?", "^"), (" ", "c")]));
        use BlockKind::*;
        assert_eq!(kinds(&al.a), vec![Context, Replace, Context]);
        assert_eq!(kinds(&al.b), vec![Context, Replace, Context]);
        assert_eq!(al.a[1].text(), "b\n");
        assert_eq!(al.b[1].text(), "x\n");
        assert_eq!(al.a[1].pair_id, al.b[1].pair_id);
        assert!(al.a[1].pair_id.is_some());
        assert_eq!(al.a[1].range, LineRange::new(2, 3));
        assert_partition(&al.a, 3);
        assert_partition(&al.b, 3);
    }

    #[test]
    fn equal_pattern_wins_over_replace() {
        let al = align(&script(&[("-", " b"), ("?", "-"), ("+", "b"), ("?", "")]));
        assert_eq!(kinds(&al.a), vec![BlockKind::Equal]);
        assert_eq!(kinds(&al.b), vec![BlockKind::Equal]);
        assert_eq!(al.a[0].pair_id, Some(PairId(0)));
        assert_eq!(al.b[0].pair_id, Some(PairId(0)));
    }

    #[test]
    fn consecutive_lines_coalesce() {
        let al = align(&script(&[
            (" ", "a"),
            (" ", "b"),
            ("-", "c"),
            ("-", "d"),
            ("+", "e"),
            ("+", "f"),
            ("+", "g"),
        ]));
        assert_eq!(kinds(&al.a), vec![BlockKind::Context, BlockKind::Delete]);
        assert_eq!(kinds(&al.b), vec![BlockKind::Context, BlockKind::Insert]);
        assert_eq!(al.a[1].text(), "c\nd\n");
        assert_eq!(al.a[1].range, LineRange::new(3, 5));
        assert_eq!(al.b[1].range, LineRange::new(3, 6));
        assert_partition(&al.a, 4);
        assert_partition(&al.b, 5);
    }

    #[test]
    fn adjacent_pairs_stay_separate() {
        let mut spec = Vec::new();
        for (old, new) in [("a", "w"), ("b", "x"), ("c", "y"), ("d", "z")] {
            spec.extend([("-", old), ("+", new), ("?", "^")]);
        }
        let al = align(&script(&spec));
        assert_eq!(al.a.len(), 4);
        assert_eq!(al.b.len(), 4);
        let mut pairs: Vec<_> = al.a.iter().filter_map(|b| b.pair_id).collect();
        pairs.dedup();
        assert_eq!(pairs.len(), 4);
        for (a, b) in al.a.iter().zip(&al.b) {
            assert_eq!(a.pair_id, b.pair_id);
        }
    }

    #[test]
    fn pair_closes_open_run() {
        let al = align(&script(&[("-", "a"), ("-", "b"), ("+", "x"), ("?", "^"), ("-", "c")]));
        use BlockKind::*;
        assert_eq!(kinds(&al.a), vec![Delete, Replace, Delete]);
        assert_eq!(kinds(&al.b), vec![Replace]);
        assert_eq!(al.a[0].text(), "a\n");
        assert_partition(&al.a, 3);
    }

    #[test]
    fn context_blocks_are_common_on_both_lists() {
        let al = align(&script(&[(" ", "a"), ("-", "b"), ("+", "x"), (" ", "c")]));
        assert_eq!(al.a[0].side, Side::Common);
        assert_eq!(al.b[0].side, Side::Common);
        assert_eq!(al.a[0].text(), al.b[0].text());
        assert_ne!(al.a[0].id, al.b[0].id);
        assert_eq!(al.a[1].side, Side::A);
        assert_eq!(al.b[1].side, Side::B);
        assert_eq!(al.b[2].side, Side::Common);
    }

    #[test]
    fn stray_hint_is_skipped() {
        let al = align(&script(&[("?", "^"), (" ", "a"), ("?", "^"), (" ", "b")]));
        assert_eq!(kinds(&al.a), vec![BlockKind::Context]);
        assert_eq!(al.a[0].text(), "a\nb\n");
        assert_partition(&al.b, 2);
    }

    #[test]
    fn hint_after_deletion_only_is_not_a_pair() {
        // `-, ?, +` with no trailing hint
        let al = align(&script(&[("-", "a"), ("?", "^"), ("+", "b")]));
        assert_eq!(kinds(&al.a), vec![BlockKind::Delete]);
        assert_eq!(kinds(&al.b), vec![BlockKind::Insert]);
        assert!(al.a[0].pair_id.is_none());
    }

    #[test]
    fn block_ids_are_unique_across_sides() {
        let al = align(&script(&[(" ", "a"), ("-", "b"), ("+", "x"), ("?", "^")]));
        let mut ids: Vec<_> = al.a.iter().chain(&al.b).map(|b| b.id).collect();
        let n = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), n);
    }

    #[test]
    fn empty_script_has_no_blocks() {
        let al = align(&EditScript::new());
        assert!(al.a.is_empty());
        assert!(al.b.is_empty());
    }
}
