//! Path resolution for both entry points.

use std::path::{Path, PathBuf};

use cdspec::ExtractPaths;

use crate::renderer::chromium::find_chromium;

/// Base directory for relative input/output paths.
pub const ROOT_ENV: &str = "CDSPEC_ROOT";

/// Resolve the working root: explicit flag, then `CDSPEC_ROOT`, then the
/// current directory.
pub fn resolve_root(explicit: Option<&str>) -> PathBuf {
    if let Some(root) = explicit {
        return PathBuf::from(root);
    }

    if let Ok(env_root) = std::env::var(ROOT_ENV) {
        if !env_root.is_empty() {
            return PathBuf::from(env_root);
        }
    }

    PathBuf::from(".")
}

/// Anchor extractor paths under `root`. Absolute paths are left alone.
pub fn resolve_extract_paths(root: &Path, paths: ExtractPaths) -> ExtractPaths {
    ExtractPaths {
        part1_dir: root.join(paths.part1_dir),
        part2_dir: root.join(paths.part2_dir),
        output_file: root.join(paths.output_file),
        log_file: root.join(paths.log_file),
    }
}

/// Resolve the browser binary: explicit flag, then the usual search.
pub fn resolve_chromium_path(explicit: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(PathBuf::from(path));
    }
    find_chromium()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_root_wins() {
        assert_eq!(resolve_root(Some("/srv/course")), PathBuf::from("/srv/course"));
    }

    #[test]
    fn test_extract_paths_are_anchored() {
        let paths = resolve_extract_paths(Path::new("/srv/course"), ExtractPaths::default());
        assert_eq!(
            paths.part1_dir,
            PathBuf::from("/srv/course/lecture_checklists/cdspec_1")
        );
        assert_eq!(
            paths.log_file,
            PathBuf::from("/srv/course/processing/extraction_errors.log")
        );

        let custom = ExtractPaths {
            output_file: PathBuf::from("/tmp/out.json"),
            ..ExtractPaths::default()
        };
        let paths = resolve_extract_paths(Path::new("/srv/course"), custom);
        assert_eq!(paths.output_file, PathBuf::from("/tmp/out.json"));
    }

    #[test]
    fn test_explicit_chromium_path() {
        assert_eq!(
            resolve_chromium_path(Some("/opt/chrome/chrome")),
            Some(PathBuf::from("/opt/chrome/chrome"))
        );
    }
}
