//! Reconcile Part 1 checklists and Part 2 redirect pages into one JSON file.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use cdspec::extractor::{
    DEFAULT_LOG_FILE, DEFAULT_OUTPUT_FILE, DEFAULT_PART1_DIR, DEFAULT_PART2_DIR,
};
use cdspec::{run_extraction, ExtractPaths, ExtractionLog};
use cdspec_cli::config::{resolve_extract_paths, resolve_root};

#[derive(Parser)]
#[command(
    name = "extract-student-data",
    about = "Reconcile StoryMap submissions into a single student dataset",
    version
)]
struct Cli {
    /// Base directory for relative paths (also read from CDSPEC_ROOT).
    #[arg(long)]
    root: Option<String>,

    /// Directory of Part 1 checklists (CSV or spreadsheet).
    #[arg(long, default_value = DEFAULT_PART1_DIR)]
    part1_dir: PathBuf,

    /// Directory of Part 2 HTML redirect pages.
    #[arg(long, default_value = DEFAULT_PART2_DIR)]
    part2_dir: PathBuf,

    /// Output JSON file.
    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Diagnostic log, truncated on every run.
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cdspec_cli::init_tracing(&cli.log_level);

    let root = resolve_root(cli.root.as_deref());
    let paths = resolve_extract_paths(
        &root,
        ExtractPaths {
            part1_dir: cli.part1_dir,
            part2_dir: cli.part2_dir,
            output_file: cli.output,
            log_file: cli.log_file,
        },
    );

    let mut log = ExtractionLog::open(&paths.log_file)
        .with_context(|| format!("failed to open {}", paths.log_file.display()))?;
    let (_, summary) = run_extraction(&paths, &mut log).context("extraction failed")?;

    println!(
        "Processed {} student records. Output saved to {}",
        summary.records,
        paths.output_file.display()
    );
    println!(
        "  Needs review: {}  URL mismatches: {}  Part 2 only: {}",
        summary.needs_review, summary.url_mismatches, summary.part2_only
    );
    let log_path = log.path().unwrap_or(paths.log_file.as_path());
    println!(
        "Errors and warnings logged to {} ({} lines)",
        log_path.display(),
        summary.diagnostics
    );

    Ok(())
}
