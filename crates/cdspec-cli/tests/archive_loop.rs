//! Screenshot loop tests against an in-process fake browser.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use cdspec::StudentRecord;
use cdspec_cli::renderer::{NavigationResult, RenderContext, Renderer};
use cdspec_cli::{archive_records, ArchiveOptions};

// ─────────────────────── helpers ───────────────────────

#[derive(Default)]
struct Counters {
    navigations: AtomicUsize,
    open: AtomicUsize,
    closed: AtomicUsize,
    scripts: AtomicUsize,
}

/// Fake browser: fails navigation for listed URLs, writes a stub PNG otherwise.
struct FakeRenderer {
    counters: Arc<Counters>,
    failing: HashSet<String>,
    visited: Arc<Mutex<Vec<String>>>,
}

impl FakeRenderer {
    fn new(failing: &[&str]) -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            failing: failing.iter().map(|s| s.to_string()).collect(),
            visited: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn navigations(&self) -> usize {
        self.counters.navigations.load(Ordering::SeqCst)
    }
}

struct FakeContext {
    counters: Arc<Counters>,
    failing: HashSet<String>,
    visited: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        self.counters.open.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeContext {
            counters: Arc::clone(&self.counters),
            failing: self.failing.clone(),
            visited: Arc::clone(&self.visited),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        self.counters.open.load(Ordering::SeqCst) - self.counters.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RenderContext for FakeContext {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<NavigationResult> {
        self.counters.navigations.fetch_add(1, Ordering::SeqCst);
        self.visited.lock().unwrap().push(url.to_string());
        if self.failing.contains(url) {
            bail!("navigation timed out after 60000ms");
        }
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 1,
        })
    }

    async fn execute_js(&self, _script: &str) -> Result<serde_json::Value> {
        self.counters.scripts.fetch_add(1, Ordering::SeqCst);
        bail!("document is not ready")
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        std::fs::write(path, b"\x89PNG fake")?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn fast() -> ArchiveOptions {
    ArchiveOptions {
        nav_timeout: Duration::from_secs(1),
        grace_period: Duration::ZERO,
    }
}

fn record(student: &str, url1: Option<&str>, url2: Option<&str>, mismatch: bool) -> StudentRecord {
    StudentRecord {
        student: student.to_string(),
        storymap_url: url1.map(String::from),
        storymap_url_2: url2.map(String::from),
        url_mismatch: mismatch,
        part_1_completed: true,
        ..StudentRecord::default()
    }
}

// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_captures_primary_and_mismatched_part2() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = FakeRenderer::new(&[]);
    let records = vec![
        record("amir", Some("https://arcg.is/A1"), Some("https://arcg.is/A1"), false),
        record("bea", Some("https://arcg.is/B1"), Some("https://arcg.is/B2"), true),
    ];

    let summary = archive_records(&renderer, &records, dir.path(), &fast())
        .await
        .unwrap();

    assert_eq!(summary.students, 2);
    assert_eq!(summary.saved, 3);
    assert_eq!(summary.failed, 0);
    assert!(dir.path().join("amir/part1.png").exists());
    assert!(!dir.path().join("amir/part2.png").exists());
    assert!(dir.path().join("bea/part1.png").exists());
    assert!(dir.path().join("bea/part2.png").exists());
    assert_eq!(
        *renderer.visited.lock().unwrap(),
        vec!["https://arcg.is/A1", "https://arcg.is/B1", "https://arcg.is/B2"]
    );
    // Banner removal failures are ignored.
    assert_eq!(renderer.counters.scripts.load(Ordering::SeqCst), 3);
    assert_eq!(renderer.active_contexts(), 0);
}

#[tokio::test]
async fn test_rerun_performs_no_navigation() {
    let dir = tempfile::tempdir().unwrap();
    let records = vec![record(
        "cole",
        Some("https://arcg.is/C1"),
        Some("https://arcg.is/C2"),
        true,
    )];

    let first = FakeRenderer::new(&[]);
    archive_records(&first, &records, dir.path(), &fast())
        .await
        .unwrap();
    assert_eq!(first.navigations(), 2);

    let before = std::fs::read(dir.path().join("cole/part1.png")).unwrap();

    let second = FakeRenderer::new(&[]);
    let summary = archive_records(&second, &records, dir.path(), &fast())
        .await
        .unwrap();
    assert_eq!(second.navigations(), 0);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.navigations(), 0);
    assert_eq!(std::fs::read(dir.path().join("cole/part1.png")).unwrap(), before);
}

#[tokio::test]
async fn test_failure_does_not_abort_batch() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = FakeRenderer::new(&["https://arcg.is/BROKEN"]);
    let records = vec![
        record("dev", Some("https://arcg.is/BROKEN"), None, false),
        record("eun", Some("https://arcg.is/E1"), None, false),
    ];

    let summary = archive_records(&renderer, &records, dir.path(), &fast())
        .await
        .unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.saved, 1);
    assert!(!dir.path().join("dev/part1.png").exists());
    assert!(dir.path().join("dev").is_dir());
    assert!(dir.path().join("eun/part1.png").exists());
    // The failed visit still closed its page.
    assert_eq!(renderer.active_contexts(), 0);
}

#[tokio::test]
async fn test_records_without_urls_or_names() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = FakeRenderer::new(&[]);
    let records = vec![
        record("", Some("https://arcg.is/NONAME"), None, false),
        record("fern", None, None, false),
    ];

    let summary = archive_records(&renderer, &records, dir.path(), &fast())
        .await
        .unwrap();

    assert_eq!(summary.students, 1);
    assert_eq!(renderer.navigations(), 0);
    assert!(dir.path().join("fern").is_dir());
}
