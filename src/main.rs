//! deduplicate - find byte-identical files and delete the extra copies.
//!
//! Usage:
//!   deduplicate [PATH]                 Choose which copy to keep, group by group
//!   deduplicate [PATH] auto --keep F   Keep one copy per group using filter F
//!   deduplicate [PATH] show            List duplicate groups without deleting
//!   deduplicate --help                 Show help

mod interactive;
mod logging;
mod output;

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};

use deduplicate_analyze::{DuplicateConfig, DuplicateFinder, DuplicateReport};
use deduplicate_ops::{DeletionExecutor, DeletionReport, KeepFilter};
use deduplicate_scan::{JwalkScanner, ScanConfig};

use crate::output::{format_size, write_groups, write_outcome, write_summary};

#[derive(Parser)]
#[command(
    name = "deduplicate",
    version,
    about = "Find byte-identical files and delete the extra copies",
    long_about = "deduplicate walks a directory, groups files with identical content \
                  (size, then a hash of the first KiB, then a full SHA-256) and \
                  deletes every copy but the ones you keep.\n\n\
                  Without a subcommand it asks which copy to keep for each group."
)]
struct Cli {
    /// Directory to search (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Report what would be deleted without deleting anything
    #[arg(long, global = true)]
    dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Minimum file size to consider (e.g., "1", "4KB", "1MB")
    #[arg(long, default_value = "1", global = true)]
    min_size: String,

    /// Skip files whose full path matches this glob (repeatable)
    #[arg(long = "exclude", value_name = "GLOB", global = true)]
    exclude: Vec<String>,

    /// Do not descend into hidden files and directories
    #[arg(long, global = true)]
    skip_hidden: bool,

    /// Follow symbolic links while walking
    #[arg(long, global = true)]
    follow_symlinks: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Keep one copy per group, chosen by a filter, and delete the rest
    Auto {
        /// Which copy to keep: last-modified, first-modified, shallowest, deepest
        #[arg(short, long, default_value = "last-modified")]
        keep: KeepFilter,
    },

    /// List duplicate groups without deleting anything
    Show {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let report = find_duplicates(&cli)?;
    let executor = DeletionExecutor::new().with_dry_run(cli.dry_run);

    match cli.command {
        None => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut out = io::stdout().lock();
            let total = interactive::resolve_groups(&report, &executor, &mut input, &mut out)?;
            write_summary(&mut out, &total, executor.is_dry_run())?;
        }
        Some(Command::Auto { keep }) => {
            run_auto(&report, keep, &executor)?;
        }
        Some(Command::Show { format }) => {
            run_show(&report, format)?;
        }
    }

    Ok(())
}

/// Walk the tree and group its files by content.
fn find_duplicates(cli: &Cli) -> Result<DuplicateReport> {
    let scan_config = ScanConfig::builder()
        .root(cli.path.as_path())
        .include_hidden(!cli.skip_hidden)
        .follow_symlinks(cli.follow_symlinks)
        .build()
        .context("Invalid scan options")?;

    let scan = JwalkScanner::new()
        .scan(&scan_config)
        .with_context(|| format!("Failed to scan {}", cli.path.display()))?;
    for warning in &scan.warnings {
        tracing::warn!(path = %warning.path.display(), kind = ?warning.kind, "{}", warning.message);
    }
    tracing::info!(
        files = scan.file_count(),
        dirs = scan.dirs_scanned,
        "scanned {} in {:.2}s",
        scan.root.display(),
        scan.scan_duration.as_secs_f64()
    );

    let config = DuplicateConfig::builder()
        .min_size(parse_size(&cli.min_size)?)
        .exclude_patterns(cli.exclude.clone())
        .build()
        .context("Invalid duplicate options")?;

    let report = DuplicateFinder::with_config(config)
        .find_duplicates(scan.files)
        .context("Duplicate discovery failed")?;
    tracing::info!(
        groups = report.group_count(),
        wasted = %format_size(report.total_wasted_space),
        "found duplicates"
    );

    Ok(report)
}

/// Resolve every group with the same filter.
fn run_auto(report: &DuplicateReport, keep: KeepFilter, executor: &DeletionExecutor) -> Result<()> {
    let mut out = io::stdout().lock();
    let mut total = DeletionReport::default();

    for group in report.iter() {
        let outcome = executor
            .execute_group(&keep, group)
            .with_context(|| format!("Failed to resolve group {}", group.hash))?;
        write_outcome(&mut out, &outcome, executor.is_dry_run())?;
        total.merge(outcome);
    }

    write_summary(&mut out, &total, executor.is_dry_run())?;
    Ok(())
}

/// List duplicate groups.
fn run_show(report: &DuplicateReport, format: OutputFormat) -> Result<()> {
    let mut out = io::stdout().lock();

    match format {
        OutputFormat::Text => {
            write_groups(&mut out, report)?;
            if report.has_duplicates() {
                writeln!(
                    out,
                    "{} groups, {} files, {} reclaimable",
                    report.group_count(),
                    report.files_with_duplicates,
                    format_size(report.total_wasted_space)
                )?;
            } else {
                writeln!(out, "No duplicate files found.")?;
            }
        }
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
        }
    }

    Ok(())
}

/// Parse a size string (e.g., "512", "1KB", "10MB", "1GB").
fn parse_size(s: &str) -> Result<u64> {
    let upper = s.trim().to_uppercase();
    let digits = upper.trim_end_matches(|c: char| c.is_ascii_alphabetic());

    let unit = &upper[digits.len()..];

    let multiplier: u64 = match unit.strip_suffix('B').unwrap_or(unit) {
        "" => 1,
        "K" => 1024,
        "M" => 1024 * 1024,
        "G" => 1024 * 1024 * 1024,
        _ => bail!("Invalid size {s:?}"),
    };
    let num: f64 = digits
        .trim()
        .parse()
        .with_context(|| format!("Invalid size {s:?}"))?;

    let bytes = num * multiplier as f64;
    if !bytes.is_finite() || bytes < 0.0 || bytes > u64::MAX as f64 {
        bail!("Invalid size {s:?}");
    }
    Ok(bytes as u64)
}
