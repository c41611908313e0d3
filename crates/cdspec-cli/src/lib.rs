//! Entry-point support for the StoryMap submission tools.
//!
//! `extract-student-data` reconciles checklists and redirect pages into one
//! JSON file; `archive-storymaps` screenshots every StoryMap in that file.

pub mod archiver;
pub mod config;
pub mod renderer;

pub use archiver::{archive_records, ArchiveOptions};
pub use config::{resolve_chromium_path, resolve_root};
pub use renderer::{RenderContext, Renderer};

/// Install the stderr subscriber. `RUST_LOG` wins over `log_level`.
pub fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
