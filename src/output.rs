//! Text rendering shared by the subcommands.

use std::io::{self, Write};

use deduplicate_analyze::DuplicateReport;
use deduplicate_ops::DeletionReport;

/// Format size in human-readable form.
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Each group's hash followed by its members, one per tab-indented line.
pub fn write_groups<W: Write>(output: &mut W, report: &DuplicateReport) -> io::Result<()> {
    for group in report.iter() {
        writeln!(output, "{}", group.hash)?;
        for path in &group.paths {
            writeln!(output, "\t{}", path.display())?;
        }
    }
    Ok(())
}

/// One line per deleted or failed member of a resolved group.
pub fn write_outcome<W: Write>(
    output: &mut W,
    outcome: &DeletionReport,
    dry_run: bool,
) -> io::Result<()> {
    let verb = if dry_run { "would delete" } else { "deleted" };
    for path in &outcome.deleted {
        writeln!(output, "{verb} {}", path.display())?;
    }
    for failure in &outcome.failures {
        writeln!(output, "failed {failure}")?;
    }
    Ok(())
}

/// Final count of deleted files and reclaimed space.
pub fn write_summary<W: Write>(
    output: &mut W,
    total: &DeletionReport,
    dry_run: bool,
) -> io::Result<()> {
    if dry_run {
        writeln!(
            output,
            "Dry run: would delete {} files, reclaiming {}",
            total.deleted_count(),
            format_size(total.bytes_reclaimed)
        )
    } else {
        writeln!(
            output,
            "{}, reclaimed {}",
            total.summary(),
            format_size(total.bytes_reclaimed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deduplicate_ops::DeletionFailure;
    use std::path::PathBuf;

    #[test]
    fn test_write_outcome() {
        let outcome = DeletionReport {
            kept: vec![PathBuf::from("/k")],
            deleted: vec![PathBuf::from("/a"), PathBuf::from("/b")],
            failures: vec![DeletionFailure::new(PathBuf::from("/c"), "busy")],
            bytes_reclaimed: 0,
        };

        let mut out = Vec::new();
        write_outcome(&mut out, &outcome, false).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "deleted /a\ndeleted /b\nfailed /c: busy\n"
        );

        let mut out = Vec::new();
        write_outcome(&mut out, &outcome, true).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("would delete /a\n"));
    }

    #[test]
    fn test_write_summary() {
        let total = DeletionReport {
            deleted: vec![PathBuf::from("/a")],
            bytes_reclaimed: 2048,
            ..Default::default()
        };

        let mut out = Vec::new();
        write_summary(&mut out, &total, false).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Deleted 1 files, reclaimed 2 KiB\n"
        );
    }
}
