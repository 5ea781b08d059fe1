//! Age-based removal of abandoned artifact directories.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Remove subdirectories of `dir` whose name starts with `prefix` and whose
/// last modification is at least `older_than` ago. Paths in `skip` are never
/// removed.
///
/// Failures are logged and skipped; the sweep is best effort.
pub fn sweep_dir(dir: &Path, prefix: &str, older_than: Duration, skip: &[PathBuf]) -> usize {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %dir.display(), "sweep could not read directory: {e}");
            return 0;
        }
    };

    let now = SystemTime::now();
    let mut removed = 0;

    for entry in entries.flatten() {
        let path = entry.path();

        if skip.contains(&path) {
            continue;
        }
        if !entry.file_name().to_string_lossy().starts_with(prefix) {
            continue;
        }

        let Ok(metadata) = entry.metadata() else { continue };
        if !metadata.is_dir() {
            continue;
        }

        // a clock step backwards reads as zero age
        let age = metadata
            .modified()
            .ok()
            .and_then(|m| now.duration_since(m).ok())
            .unwrap_or_default();
        if age < older_than {
            continue;
        }

        match std::fs::remove_dir_all(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), age_secs = age.as_secs(), "swept abandoned artifacts");
                removed += 1;
            }
            Err(e) => tracing::warn!(path = %path.display(), "sweep failed to remove directory: {e}"),
        }
    }

    removed
}
