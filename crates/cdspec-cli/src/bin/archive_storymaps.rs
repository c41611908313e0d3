//! Screenshot every StoryMap listed in the reviewed student dataset.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use cdspec::archive::{DEFAULT_ARCHIVE_INPUT, DEFAULT_ARCHIVE_ROOT};
use cdspec::read_records;
use cdspec_cli::renderer::chromium::ChromiumRenderer;
use cdspec_cli::renderer::Renderer;
use cdspec_cli::{archive_records, resolve_chromium_path, resolve_root, ArchiveOptions};

#[derive(Parser)]
#[command(
    name = "archive-storymaps",
    about = "Save full-page screenshots of every student StoryMap",
    version
)]
struct Cli {
    /// Base directory for relative paths (also read from CDSPEC_ROOT).
    #[arg(long)]
    root: Option<String>,

    /// Reviewed student dataset (JSON array).
    #[arg(long, default_value = DEFAULT_ARCHIVE_INPUT)]
    input: PathBuf,

    /// Archive directory; one subdirectory per student.
    #[arg(long, default_value = DEFAULT_ARCHIVE_ROOT)]
    output_dir: PathBuf,

    /// Chromium binary (also read from CDSPEC_CHROMIUM_PATH).
    #[arg(long)]
    chromium: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cdspec_cli::init_tracing(&cli.log_level);

    let root = resolve_root(cli.root.as_deref());
    let input = root.join(&cli.input);
    let archive_root = root.join(&cli.output_dir);

    let records = read_records(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let renderer = ChromiumRenderer::new(resolve_chromium_path(cli.chromium.as_deref())).await?;
    let result = archive_records(&renderer, &records, &archive_root, &ArchiveOptions::default()).await;

    if let Err(e) = renderer.shutdown().await {
        tracing::warn!("browser shutdown failed: {e:#}");
    }

    let summary = result?;
    println!(
        "Archived {} students: {} saved, {} skipped, {} failed",
        summary.students, summary.saved, summary.skipped, summary.failed
    );

    Ok(())
}
