//! Archive discovery and scratch directory handling

use crate::classify::{archive_stem, is_first_volume_archive};
use crate::config::ExtractionConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Recursively collect every first-volume archive under the source root
///
/// Directories below `source` named with the scratch suffix are leftovers of
/// an interrupted run and are not descended into.
pub fn find_archives(source: &Path, config: &ExtractionConfig) -> Vec<PathBuf> {
    collect_archives(source, config, Some(&config.scratch_suffix))
}

/// Recursively collect every first-volume archive extracted into `scratch`
pub fn find_nested_archives(scratch: &Path, config: &ExtractionConfig) -> Vec<PathBuf> {
    collect_archives(scratch, config, None)
}

fn collect_archives(
    dir: &Path,
    config: &ExtractionConfig,
    skip_suffix: Option<&str>,
) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| match skip_suffix {
            Some(suffix) => {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !is_scratch_name(entry.file_name(), suffix)
            }
            None => true,
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(?dir, error = %e, "failed to read entry while scanning for archives");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_first_volume_archive(path, config))
        .collect()
}

/// Scratch directory for an archive: `<archive dir>/<stem><suffix>`
pub fn scratch_dir_for(archive: &Path, config: &ExtractionConfig) -> PathBuf {
    let name = format!("{}{}", archive_stem(archive, config), config.scratch_suffix);
    archive
        .parent()
        .map_or_else(|| PathBuf::from(&name), |parent| parent.join(&name))
}

/// Remove a scratch directory, logging instead of failing
pub async fn remove_scratch_dir(scratch: &Path) {
    match tokio::fs::remove_dir_all(scratch).await {
        Ok(()) => debug!(?scratch, "removed scratch directory"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(?scratch, error = %e, "failed to remove scratch directory"),
    }
}

/// Delete directories directly under `root` whose names end with `suffix`
///
/// Returns the number of directories removed.
pub async fn purge_scratch_dirs(root: &Path, suffix: &str) -> usize {
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(?root, error = %e, "failed to read source directory for scratch purge");
            return 0;
        }
    };

    let mut purged = 0;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let is_dir = entry.file_type().await.map(|ft| ft.is_dir()).unwrap_or(false);
        if !is_dir || !is_scratch_name(&entry.file_name(), suffix) {
            continue;
        }
        let path = entry.path();
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => {
                debug!(?path, "purged leftover scratch directory");
                purged += 1;
            }
            Err(e) => warn!(?path, error = %e, "failed to purge scratch directory"),
        }
    }

    if purged > 0 {
        info!(purged, "purged leftover scratch directories");
    }
    purged
}

fn is_scratch_name(name: &std::ffi::OsStr, suffix: &str) -> bool {
    name.to_string_lossy().ends_with(suffix)
}
