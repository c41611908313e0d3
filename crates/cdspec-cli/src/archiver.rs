//! Sequential StoryMap screenshot loop.
//!
//! Each target is visited in its own context: navigate, let the map settle,
//! strip cookie banners, capture, close. A failure is logged against the
//! student and label and the loop moves on. Targets whose image already
//! exists are never loaded, so re-runs only fill gaps.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use cdspec::archive::student_dir;
use cdspec::{plan_targets, ArchiveSummary, ShotOutcome, ShotTarget, StudentRecord};

use crate::renderer::{RenderContext, Renderer};

/// Upper bound on navigation plus network idle.
pub const NAV_TIMEOUT: Duration = Duration::from_secs(60);

/// Pause after load for map tiles and intro animations.
pub const GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Removes known cookie banners and returns how many were removed.
pub const BANNER_REMOVAL_JS: &str = "(() => { \
    const banners = document.querySelectorAll('.cookie-banner, #onetrust-banner-sdk'); \
    banners.forEach(b => b.remove()); \
    return banners.length; \
})()";

/// Timing knobs for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveOptions {
    pub nav_timeout: Duration,
    pub grace_period: Duration,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            nav_timeout: NAV_TIMEOUT,
            grace_period: GRACE_PERIOD,
        }
    }
}

/// Capture every planned target for every record, in order.
pub async fn archive_records(
    renderer: &dyn Renderer,
    records: &[StudentRecord],
    archive_root: &Path,
    options: &ArchiveOptions,
) -> Result<ArchiveSummary> {
    tokio::fs::create_dir_all(archive_root)
        .await
        .with_context(|| format!("failed to create {}", archive_root.display()))?;

    let mut summary = ArchiveSummary::default();

    for record in records {
        if record.student.is_empty() {
            continue;
        }
        tracing::info!("Processing {}...", record.student);
        summary.students += 1;

        let dir = student_dir(archive_root, &record.student);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;

        for target in plan_targets(record, archive_root) {
            let outcome = capture_target(renderer, &target, options).await;
            summary.count(&outcome);
        }
    }

    Ok(summary)
}

/// Capture one target, skipping it if the image is already on disk.
pub async fn capture_target(
    renderer: &dyn Renderer,
    target: &ShotTarget,
    options: &ArchiveOptions,
) -> ShotOutcome {
    if target.is_done() {
        tracing::info!("  - Skipping {} (already exists)", target.label);
        return ShotOutcome::Skipped;
    }

    tracing::info!("  - Downloading {}: {}", target.label, target.url);

    match visit(renderer, target, options).await {
        Ok(()) => {
            tracing::info!("    -> Saved to {}", target.path.display());
            ShotOutcome::Saved
        }
        Err(e) => {
            tracing::warn!(
                student = %target.student,
                label = %target.label,
                "    -> FAILED {}: {e:#}",
                target.label
            );
            ShotOutcome::Failed(format!("{e:#}"))
        }
    }
}

async fn visit(renderer: &dyn Renderer, target: &ShotTarget, options: &ArchiveOptions) -> Result<()> {
    let mut ctx = renderer.new_context().await?;
    let result = load_and_capture(ctx.as_mut(), target, options).await;
    if let Err(e) = ctx.close().await {
        tracing::debug!("failed to close page for {}: {e}", target.student);
    }
    result
}

async fn load_and_capture(
    ctx: &mut dyn RenderContext,
    target: &ShotTarget,
    options: &ArchiveOptions,
) -> Result<()> {
    let nav = ctx.navigate(&target.url, options.nav_timeout).await?;
    tracing::debug!("loaded {} in {}ms", nav.final_url, nav.load_time_ms);

    tokio::time::sleep(options.grace_period).await;

    match ctx.execute_js(BANNER_REMOVAL_JS).await {
        Ok(removed) => tracing::debug!("removed {removed} cookie banner(s)"),
        Err(e) => tracing::debug!("cookie banner removal skipped: {e}"),
    }

    ctx.screenshot(&target.path).await
}
