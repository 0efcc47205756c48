//! Operator-driven resolution of duplicate groups.

use std::io::{BufRead, Write};

use color_eyre::eyre::{Result, WrapErr};

use deduplicate_analyze::{DuplicateGroup, DuplicateReport};
use deduplicate_ops::{DeletionExecutor, DeletionReport, KeepFilter};

use crate::output::write_outcome;

const PROMPT: &str = "# of path to keep or 'skip'> ";

/// What the operator chose for one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Keep the member at this 1-based position.
    Keep(usize),
    Skip,
    /// Input ended; stop without touching the current group.
    Quit,
}

/// Walk every group in report order, asking which member to keep.
pub fn resolve_groups<R: BufRead, W: Write>(
    report: &DuplicateReport,
    executor: &DeletionExecutor,
    input: &mut R,
    output: &mut W,
) -> Result<DeletionReport> {
    let mut total = DeletionReport::default();

    for group in report.iter() {
        writeln!(output)?;
        match prompt_group(input, output, group)? {
            Choice::Keep(position) => {
                let outcome = executor
                    .execute_group(&KeepFilter::position(position), group)
                    .wrap_err_with(|| format!("Failed to resolve group {}", group.hash))?;
                write_outcome(output, &outcome, executor.is_dry_run())?;
                total.merge(outcome);
            }
            Choice::Skip => writeln!(output, "skipped {}", group.hash)?,
            Choice::Quit => {
                tracing::info!(hash = %group.hash, "input closed, stopping");
                break;
            }
        }
    }

    Ok(total)
}

/// Show one group and read choices until a valid one arrives.
pub fn prompt_group<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    group: &DuplicateGroup,
) -> std::io::Result<Choice> {
    writeln!(output, "{}", group.hash)?;
    for (index, path) in group.paths.iter().enumerate() {
        writeln!(output, "{:>4}.) {}", index + 1, path.display())?;
    }

    let mut line = String::new();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(Choice::Quit);
        }
        if let Some(choice) = parse_choice(&line, group.count()) {
            return Ok(choice);
        }
    }
}

/// `s`/`skip` in any case, or a position in `[1, len]`.
fn parse_choice(line: &str, len: usize) -> Option<Choice> {
    let answer = line.trim();
    if answer.eq_ignore_ascii_case("s") || answer.eq_ignore_ascii_case("skip") {
        return Some(Choice::Skip);
    }
    match answer.parse::<usize>() {
        Ok(position) if (1..=len).contains(&position) => Some(Choice::Keep(position)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deduplicate_analyze::{ContentHash, DuplicateFinder};
    use std::fs;
    use std::io::Cursor;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn group() -> DuplicateGroup {
        DuplicateGroup {
            hash: ContentHash::of(b"x"),
            size: 1,
            paths: vec![PathBuf::from("/a"), PathBuf::from("/b")],
            wasted_bytes: 1,
        }
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("s\n", 2), Some(Choice::Skip));
        assert_eq!(parse_choice("  SKIP ", 2), Some(Choice::Skip));
        assert_eq!(parse_choice("Skip", 2), Some(Choice::Skip));
        assert_eq!(parse_choice("2\n", 2), Some(Choice::Keep(2)));
        assert_eq!(parse_choice("0", 2), None);
        assert_eq!(parse_choice("3", 2), None);
        assert_eq!(parse_choice("-1", 2), None);
        assert_eq!(parse_choice("skipped", 2), None);
        assert_eq!(parse_choice("", 2), None);
    }

    #[test]
    fn test_prompt_lists_members_and_reprompts() {
        let mut input = Cursor::new("nope\n7\n1\n");
        let mut output = Vec::new();

        let choice = prompt_group(&mut input, &mut output, &group()).unwrap();

        assert_eq!(choice, Choice::Keep(1));
        let text = String::from_utf8(output).unwrap();
        let expected_header = format!("{}\n   1.) /a\n   2.) /b\n", ContentHash::of(b"x"));
        assert!(text.starts_with(&expected_header));
        assert_eq!(text.matches(PROMPT).count(), 3);
    }

    #[test]
    fn test_end_of_input_quits() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();

        let choice = prompt_group(&mut input, &mut output, &group()).unwrap();
        assert_eq!(choice, Choice::Quit);
    }

    #[test]
    fn test_resolve_groups() {
        let temp = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = [("a1", "aaaa"), ("a2", "aaaa"), ("b1", "bb"), ("b2", "bb")]
            .iter()
            .map(|(name, content)| {
                let path = temp.path().join(name);
                fs::write(&path, content).unwrap();
                path
            })
            .collect();
        let report = DuplicateFinder::new().find_duplicates(paths.clone()).unwrap();

        let mut input = Cursor::new("2\nskip\n");
        let mut output = Vec::new();
        let total =
            resolve_groups(&report, &DeletionExecutor::new(), &mut input, &mut output).unwrap();

        assert_eq!(total.deleted, vec![paths[0].clone()]);
        assert_eq!(total.bytes_reclaimed, 4);
        assert!(!paths[0].exists());
        assert!(paths[1].exists());
        assert!(paths[2].exists() && paths[3].exists());

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains(&format!("deleted {}", paths[0].display())));
        assert!(text.contains(&format!("skipped {}", ContentHash::of(b"bb"))));
    }

    #[test]
    fn test_blank_line_precedes_each_group() {
        let temp = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = [("a1", "aaaa"), ("a2", "aaaa"), ("b1", "bb"), ("b2", "bb")]
            .iter()
            .map(|(name, content)| {
                let path = temp.path().join(name);
                fs::write(&path, content).unwrap();
                path
            })
            .collect();
        let report = DuplicateFinder::new().find_duplicates(paths).unwrap();

        let mut input = Cursor::new("skip\nskip\n");
        let mut output = Vec::new();
        resolve_groups(&report, &DeletionExecutor::new(), &mut input, &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let first = ContentHash::of(b"aaaa");
        let second = ContentHash::of(b"bb");
        assert!(text.starts_with(&format!("\n{first}\n")));
        assert!(text.contains(&format!("skipped {first}\n\n{second}\n")));
        assert!(text.ends_with(&format!("skipped {second}\n")));
    }

    #[test]
    fn test_quit_leaves_current_group_untouched() {
        let temp = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = ["a", "b"]
            .iter()
            .map(|name| {
                let path = temp.path().join(name);
                fs::write(&path, "same").unwrap();
                path
            })
            .collect();
        let report = DuplicateFinder::new().find_duplicates(paths.clone()).unwrap();

        let mut input = Cursor::new("");
        let mut output = Vec::new();
        let total =
            resolve_groups(&report, &DeletionExecutor::new(), &mut input, &mut output).unwrap();

        assert_eq!(total.deleted_count(), 0);
        assert!(paths.iter().all(|p| p.exists()));
    }
}
