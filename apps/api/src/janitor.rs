//! Janitor — best-effort removal of stale audio artifacts.
//!
//! Tracks four name patterns across the working and audio directories and removes
//! matching files whose modification time is older than `max_age`. Files that
//! disappear mid-sweep are skipped silently.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, warn};

/// `<dir>/<prefix>*<suffix>`
#[derive(Debug, Clone)]
pub struct TempPattern {
    pub dir: PathBuf,
    pub prefix: &'static str,
    pub suffix: &'static str,
}

impl TempPattern {
    fn matches(&self, file_name: &str) -> bool {
        file_name.len() >= self.prefix.len() + self.suffix.len()
            && file_name.starts_with(self.prefix)
            && file_name.ends_with(self.suffix)
    }
}

#[derive(Debug, Default)]
pub struct SweepReport {
    pub removed: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Janitor {
    patterns: Vec<TempPattern>,
    max_age: Duration,
}

impl Janitor {
    /// The patterns produced by the speech adapter.
    pub fn for_dirs(work_dir: &Path, audio_dir: &Path, max_age: Duration) -> Self {
        let pattern = |dir: &Path, prefix, suffix| TempPattern {
            dir: dir.to_path_buf(),
            prefix,
            suffix,
        };
        Self {
            patterns: vec![
                pattern(work_dir, "temp_", ".wav"),
                pattern(audio_dir, "output_", ".mp3"),
                pattern(work_dir, "output_", ".wav"),
                pattern(work_dir, "converted_", ".wav"),
            ],
            max_age,
        }
    }

    /// Removes every tracked file last modified more than `max_age` before `now`.
    pub fn sweep(&self, now: SystemTime) -> SweepReport {
        let mut report = SweepReport::default();

        for pattern in &self.patterns {
            let entries = match std::fs::read_dir(&pattern.dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!("Janitor cannot read {}: {e}", pattern.dir.display());
                    continue;
                }
            };

            for entry in entries.filter_map(Result::ok) {
                let name = entry.file_name();
                let Some(name) = name.to_str() else { continue };
                if !pattern.matches(name) {
                    continue;
                }

                let path = entry.path();
                if self.is_expired(&path, now) && remove(&path) {
                    report.removed.push(path);
                }
            }
        }

        if !report.removed.is_empty() {
            debug!("Janitor removed {} stale files", report.removed.len());
        }
        report
    }

    fn is_expired(&self, path: &Path, now: SystemTime) -> bool {
        let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    warn!("Janitor cannot stat {}: {e}", path.display());
                }
                return false;
            }
        };
        // A modification time in the future counts as fresh.
        now.duration_since(modified)
            .map(|age| age > self.max_age)
            .unwrap_or(false)
    }
}

fn remove(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => {
            warn!("Janitor cannot remove {}: {e}", path.display());
            false
        }
    }
}
