//! twomerge: line-oriented shell around a two-way merge session.
//!
//! Usage:
//!   cargo run --bin twomerge -- <first file> <second file> [-o <output>] [--config <file.json>]
//
//! Commands are read from stdin, one per line (`help` lists them). Command
//! errors are reported and the session carries on. Logs go to stderr,
//! filtered by `RUST_LOG`.

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, bail};
use tracing_subscriber::EnvFilter;

use twomerge_core::{Direction, MergeError, Session, SessionConfig, Side, open_session};

const HELP: &str = "\
commands:
  blocks <side>   list live blocks (> marks focus)
  next <side>     focus next changed block
  prev <side>     focus previous changed block
  jump <side>     focus the counterpart on the other side
  focus <side>    show the focused block
  sync            line ranges both panes should show
  accept <side>   append the focused block to the output
  undo            revert the latest accept
  output          print the merge output
  diff            print the edit script
  stats           session summary as JSON
  write           write the output file
  quit            write the output file (if any) and exit
sides: a | b";

struct Args {
    file_a: PathBuf,
    file_b: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
}

#[derive(Debug)]
enum Flow {
    Continue,
    Quit,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let Some(args) = parse_args(env::args().skip(1).collect())? else {
        return Ok(());
    };

    let config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    let mut session = open_session(&args.file_a, &args.file_b, &config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(
        out,
        "{} ({}) <-> {} ({})",
        args.file_a.display(),
        session.language(Side::A)?,
        args.file_b.display(),
        session.language(Side::B)?
    )?;
    run_loop(&mut session, io::stdin().lock(), args.output.as_ref(), &mut out)
}

/// Run commands until `quit` or end of input. A failing command is reported
/// as `! <error>` and the loop goes on.
fn run_loop(
    session: &mut Session,
    input: impl BufRead,
    output: Option<&PathBuf>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match run_command(session, line, output, out) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => return Ok(()),
            Err(err) => writeln!(out, "! {err:#}")?,
        }
    }

    if let Some(path) = output {
        write_output(session, path)?;
    }
    Ok(())
}

fn parse_args(raw: Vec<String>) -> anyhow::Result<Option<Args>> {
    let mut positional = Vec::new();
    let mut output = None;
    let mut config = None;
    let mut iter = raw.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-o" | "--output" => output = Some(PathBuf::from(iter.next().context("--output needs a file")?)),
            "--config" => config = Some(PathBuf::from(iter.next().context("--config needs a file")?)),
            "--version" => {
                println!("twomerge {}", env!("CARGO_PKG_VERSION"));
                return Ok(None);
            }
            "-h" | "--help" => {
                println!("Usage: twomerge <first file> <second file> [-o <output>] [--config <file.json>]\n\n{HELP}");
                return Ok(None);
            }
            _ => positional.push(PathBuf::from(arg)),
        }
    }
    let [file_a, file_b]: [PathBuf; 2] = match positional.try_into() {
        Ok(files) => files,
        Err(_) => bail!("Usage: twomerge <first file> <second file> [-o <output>] [--config <file.json>]"),
    };
    Ok(Some(Args { file_a, file_b, output, config }))
}

fn run_command(
    session: &mut Session,
    line: &str,
    output: Option<&PathBuf>,
    out: &mut impl Write,
) -> anyhow::Result<Flow> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    let side = || -> Result<Side, MergeError> {
        words
            .clone()
            .next()
            .ok_or_else(|| MergeError::InvalidSide(String::new()))?
            .parse()
    };

    match command {
        "blocks" => {
            let side = side()?;
            let focused = session.focused_block(side).ok();
            for block in session.blocks_on_side(side)? {
                let marker = if Some(block.id) == focused { '>' } else { ' ' };
                writeln!(out, "{marker} {} {} {}", block.id, block.kind, block.range)?;
                for text in block.text.lines() {
                    writeln!(out, "    | {text}")?;
                }
            }
        }
        "next" | "prev" => {
            let direction = if command == "next" { Direction::Next } else { Direction::Prev };
            let side = side()?;
            session.advance(side, direction)?;
            show_focus(session, side, out)?;
        }
        "jump" => match session.jump_linked(side()?)? {
            Some(id) => writeln!(out, "linked {id}")?,
            None => writeln!(out, "no counterpart")?,
        },
        "focus" => show_focus(session, side()?, out)?,
        "sync" => {
            let view = session.sync_to_focus();
            let show = |r: Option<twomerge_core::LineRange>| r.map_or("-".to_string(), |r| r.to_string());
            writeln!(out, "a: {}  b: {}", show(view.a), show(view.b))?;
        }
        "accept" => {
            let text = session.accept(side()?)?;
            writeln!(out, "accepted, output now {} lines", text.lines().count())?;
        }
        "undo" => {
            let text = session.undo()?;
            writeln!(out, "undone, output now {} lines", text.lines().count())?;
        }
        "output" => write!(out, "{}", session.output_text())?,
        "diff" => write!(out, "{}", session.script())?,
        "stats" => writeln!(out, "{}", serde_json::to_string_pretty(&session.stats())?)?,
        "write" => match output {
            Some(path) => {
                write_output(session, path)?;
                writeln!(out, "wrote {}", path.display())?;
            }
            None => bail!("no output file given (use -o)"),
        },
        "quit" | "q" => {
            if let Some(path) = output {
                write_output(session, path)?;
            }
            return Ok(Flow::Quit);
        }
        "help" | "?" => writeln!(out, "{HELP}")?,
        other => bail!("unknown command `{other}` (try help)"),
    }
    Ok(Flow::Continue)
}

fn show_focus(session: &Session, side: Side, out: &mut impl Write) -> anyhow::Result<()> {
    let id = session.focused_block(side)?;
    if let Some(block) = session.blocks_on_side(side)?.into_iter().find(|b| b.id == id) {
        writeln!(out, "{side}: {} {} {}", block.id, block.kind, block.range)?;
    }
    Ok(())
}

fn write_output(session: &Session, path: &PathBuf) -> anyhow::Result<()> {
    fs::write(path, session.output_text()).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use tempfile::tempdir;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn session() -> Session {
        Session::from_texts("a\nb\n", "a\nx\n", &SessionConfig::default())
    }

    fn run(session: &mut Session, script: &str, output: Option<&PathBuf>) -> String {
        let mut out = Vec::new();
        run_loop(session, Cursor::new(script), output, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_files_and_options() {
        let parsed = parse_args(args(&["old.txt", "new.txt", "-o", "out.txt", "--config", "c.json"]))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.file_a, PathBuf::from("old.txt"));
        assert_eq!(parsed.file_b, PathBuf::from("new.txt"));
        assert_eq!(parsed.output, Some(PathBuf::from("out.txt")));
        assert_eq!(parsed.config, Some(PathBuf::from("c.json")));
    }

    #[test]
    fn version_stops_before_files() {
        assert!(parse_args(args(&["--version"])).unwrap().is_none());
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse_args(args(&["old.txt", "new.txt", "-o"])).is_err());
        assert!(parse_args(args(&["old.txt"])).is_err());
        assert!(parse_args(args(&["a", "b", "c"])).is_err());
    }

    #[test]
    fn failed_command_is_reported_and_loop_continues() {
        let mut session = session();
        let text = run(&mut session, "undo\nbogus\naccept c\naccept b\noutput\n", None);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "! nothing to undo");
        assert!(lines[1].starts_with("! unknown command `bogus`"));
        assert!(lines[2].starts_with("! invalid side `c`"));
        assert_eq!(lines[3], "accepted, output now 1 lines");
        assert_eq!(lines[4], "x");
        assert_eq!(session.output_text(), "x\n");
    }

    #[test]
    fn write_without_output_file_fails() {
        let mut session = session();
        let mut out = Vec::new();
        let err = run_command(&mut session, "write", None, &mut out).unwrap_err();
        assert!(err.to_string().contains("no output file"));
        assert!(run(&mut session, "write\n", None).starts_with("! no output file"));
    }

    #[test]
    fn quit_writes_output_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("merged.txt");
        let mut session = session();
        let text = run(&mut session, "accept b\nquit\naccept a\n", Some(&path));
        assert_eq!(text.lines().count(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x\n");
    }

    #[test]
    fn end_of_input_writes_output_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("merged.txt");
        let mut session = session();
        run(&mut session, "accept a\nwrite\n", Some(&path));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "b\n");
    }

    #[test]
    fn blocks_and_sync_show_focus() {
        let mut session = session();
        let text = run(&mut session, "blocks a\nsync\n", None);
        assert!(text.contains("> #2 replace [2, 3)"));
        assert!(text.contains("    | b"));
        assert!(text.contains("a: [2, 3)  b: [2, 3)"));
    }
}
