//! script.rs
//! The classified-line edit script handed to the aligner by a line differ,
//! plus the line type shared by every stage.
//!
//! The textual form follows the classic "Differ" layout:
//! - `"- "` line only in the first text
//! - `"+ "` line only in the second text
//! - `"  "` line common to both
//! - `"? "` intraline hint for the line above it
//!
//! A `"\ No newline at end of file"` marker after a line clears its
//! trailing-newline flag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// One text line. Only the last line of a text may lack its newline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    raw: String,
}

impl Line {
    pub fn new(content: &str, newline: bool) -> Self {
        let mut raw = content.to_string();
        if newline {
            raw.push('\n');
        }
        Self { raw }
    }

    /// The line without its trailing newline.
    pub fn content(&self) -> &str {
        self.raw.strip_suffix('\n').unwrap_or(&self.raw)
    }

    pub fn has_newline(&self) -> bool {
        self.raw.ends_with('\n')
    }

    /// The line as it appears in the source, newline included.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// Split `text` into lines, keeping each line's newline.
pub fn split_lines(text: &str) -> Vec<Line> {
    text.split_inclusive('\n')
        .map(|raw| Line { raw: raw.to_string() })
        .collect()
}

/// Concatenate lines back into text. A line missing its newline that is
/// followed by more lines gets one, so appended lines never run together.
pub fn join_lines(lines: &[Line]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        out.push_str(line.raw());
        if !line.has_newline() && i + 1 < lines.len() {
            out.push('\n');
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptLine {
    /// Present only in the first text.
    Removed(Line),
    /// Present only in the second text.
    Added(Line),
    /// Present in both texts.
    Common(Line),
    /// Intraline change marks for the preceding line.
    Hint(String),
}

impl ScriptLine {
    pub fn line(&self) -> Option<&Line> {
        match self {
            ScriptLine::Removed(l) | ScriptLine::Added(l) | ScriptLine::Common(l) => Some(l),
            ScriptLine::Hint(_) => None,
        }
    }

    fn line_mut(&mut self) -> Option<&mut Line> {
        match self {
            ScriptLine::Removed(l) | ScriptLine::Added(l) | ScriptLine::Common(l) => Some(l),
            ScriptLine::Hint(_) => None,
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            ScriptLine::Removed(_) => "- ",
            ScriptLine::Added(_) => "+ ",
            ScriptLine::Common(_) => "  ",
            ScriptLine::Hint(_) => "? ",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditScript {
    entries: Vec<ScriptLine>,
}

impl EditScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ScriptLine) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ScriptLine] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScriptLine> {
        self.entries.iter()
    }

    /// Number of text lines the script reconstructs for the first
    /// (`first == true`) or second text.
    pub fn side_line_count(&self, first: bool) -> usize {
        self.entries
            .iter()
            .filter(|e| match e {
                ScriptLine::Common(_) => true,
                ScriptLine::Removed(_) => first,
                ScriptLine::Added(_) => !first,
                ScriptLine::Hint(_) => false,
            })
            .count()
    }
}

impl FromIterator<ScriptLine> for EditScript {
    fn from_iter<I: IntoIterator<Item = ScriptLine>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a EditScript {
    type Item = &'a ScriptLine;
    type IntoIter = std::slice::Iter<'a, ScriptLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for EditScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            match entry {
                ScriptLine::Hint(marks) => writeln!(f, "? {marks}")?,
                _ => {
                    if let Some(line) = entry.line() {
                        writeln!(f, "{}{}", entry.prefix(), line.content())?;
                        if !line.has_newline() {
                            writeln!(f, "{NO_NEWLINE_MARKER}")?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed edit script at line {line}: {text:?}")]
pub struct ParseScriptError {
    pub line: usize,
    pub text: String,
}

impl FromStr for EditScript {
    type Err = ParseScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut script = EditScript::new();
        // Only `\n` ends a row; a `\r` before it belongs to the line content.
        for (idx, row) in s.split_inclusive('\n').enumerate() {
            let text = row.strip_suffix('\n').unwrap_or(row);
            let malformed = || ParseScriptError { line: idx + 1, text: text.to_string() };

            if text.starts_with('\\') {
                let last = script
                    .entries
                    .iter_mut()
                    .rev()
                    .find_map(ScriptLine::line_mut)
                    .ok_or_else(malformed)?;
                let content = last.content().to_string();
                *last = Line::new(&content, false);
                continue;
            }

            let (tag, rest) = if text.len() <= 2 {
                (text, "")
            } else {
                text.split_at_checked(2).ok_or_else(malformed)?
            };
            let entry = match tag.trim_end() {
                "-" => ScriptLine::Removed(Line::new(rest, true)),
                "+" => ScriptLine::Added(Line::new(rest, true)),
                "" => ScriptLine::Common(Line::new(rest, true)),
                "?" => ScriptLine::Hint(rest.to_string()),
                _ => return Err(malformed()),
            };
            script.push(entry);
        }
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_missing_final_newline() {
        let lines = split_lines("a\nb");
        assert_eq!(lines.len(), 2);
        assert!(lines[0].has_newline());
        assert!(!lines[1].has_newline());
        assert_eq!(lines[1].content(), "b");
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn join_separates_unterminated_lines() {
        let lines = vec![Line::new("c", false), Line::new("x", true)];
        assert_eq!(join_lines(&lines), "c\nx\n");
        assert_eq!(join_lines(&[Line::new("c", false)]), "c");
    }

    #[test]
    fn parses_differ_text() {
        let script: EditScript = "  a\n- b\n+ x\n? ^\n  c\n\\ No newline at end of file\n"
            .parse()
            .unwrap();
        assert_eq!(script.len(), 5);
        assert_eq!(script.entries()[1], ScriptLine::Removed(Line::new("b", true)));
        assert_eq!(script.entries()[3], ScriptLine::Hint("^".into()));
        assert_eq!(script.entries()[4], ScriptLine::Common(Line::new("c", false)));
        assert_eq!(script.side_line_count(true), 3);
        assert_eq!(script.side_line_count(false), 3);
    }

    #[test]
    fn display_matches_parse_input() {
        let text = "  a\n- b\n? -\n+ bb\n? +\n";
        let script: EditScript = text.parse().unwrap();
        assert_eq!(script.to_string(), text);
    }

    #[test]
    fn crlf_lines_survive_display_and_parse() {
        let script: EditScript = [
            ScriptLine::Common(Line::new("a\r", true)),
            ScriptLine::Removed(Line::new("b\r", true)),
            ScriptLine::Added(Line::new("x\r", true)),
            ScriptLine::Hint("+".into()),
            ScriptLine::Common(Line::new("c\r", false)),
        ]
        .into_iter()
        .collect();
        let reparsed: EditScript = script.to_string().parse().unwrap();
        assert_eq!(reparsed, script);
        assert_eq!(reparsed.entries()[2].line().map(Line::raw), Some("x\r\n"));
    }

    #[test]
    fn rejects_unknown_prefix() {
        let err = "  a\n* b\n".parse::<EditScript>().unwrap_err();
        assert_eq!(err.line, 2);
        assert!("\\ No newline at end of file\n".parse::<EditScript>().is_err());
    }

    #[test]
    fn bare_prefix_is_empty_line() {
        let script: EditScript = "-\n+\n".parse().unwrap();
        assert_eq!(script.entries()[0], ScriptLine::Removed(Line::new("", true)));
        assert_eq!(script.entries()[1], ScriptLine::Added(Line::new("", true)));
    }
}
