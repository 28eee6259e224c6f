//! Sorting extracted content into the destination tree

use crate::classify::{is_archive, is_media_folder};
use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::utils::move_unique;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Folders already relocated while resolving one top-level archive
///
/// Shared between an archive and all of its nested archives, so a folder
/// moved by a nested pass is never picked up again by its parent.
#[derive(Debug, Default)]
pub struct MovedFolders {
    folders: HashSet<PathBuf>,
}

impl MovedFolders {
    /// Whether `folder` was relocated already
    pub fn contains(&self, folder: &Path) -> bool {
        self.folders.contains(folder)
    }

    /// Record a relocated folder
    pub fn insert(&mut self, folder: PathBuf) -> bool {
        self.folders.insert(folder)
    }

    /// Number of folders relocated
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Whether nothing was relocated
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

/// Move first-level subfolders of `scratch` that contain media into `dest`
///
/// Returns the destination paths.
pub async fn relocate_media_folders(
    scratch: &Path,
    dest: &Path,
    config: &ExtractionConfig,
    moved: &mut MovedFolders,
) -> Result<Vec<PathBuf>> {
    let mut relocated = Vec::new();

    for (path, is_dir) in sorted_entries(scratch).await? {
        if !is_dir || moved.contains(&path) {
            continue;
        }
        if !is_media_folder(&path, config) {
            debug!(?path, "folder has no media, leaving it for the leftover pass");
            continue;
        }

        let target = move_unique(&path, dest).await?;
        info!(from = ?path, to = ?target, "relocated media folder");
        moved.insert(path);
        relocated.push(target);
    }

    Ok(relocated)
}

/// Move everything else left in `scratch` into `dest`
///
/// Skips relocated media folders and archive files (including continuation
/// volumes). Returns the destination paths.
pub async fn relocate_leftovers(
    scratch: &Path,
    dest: &Path,
    config: &ExtractionConfig,
    moved: &MovedFolders,
) -> Result<Vec<PathBuf>> {
    let mut relocated = Vec::new();

    for (path, is_dir) in sorted_entries(scratch).await? {
        if is_dir && moved.contains(&path) {
            continue;
        }
        if !is_dir && is_archive(&path, config) {
            debug!(?path, "not relocating archive file");
            continue;
        }

        let target = move_unique(&path, dest).await?;
        debug!(from = ?path, to = ?target, "relocated leftover");
        relocated.push(target);
    }

    if !relocated.is_empty() {
        info!(count = relocated.len(), ?scratch, "relocated leftover entries");
    }
    Ok(relocated)
}

/// Direct children of `dir` with an is-directory flag, sorted by path
async fn sorted_entries(dir: &Path) -> Result<Vec<(PathBuf, bool)>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut children = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let file_type = entry.file_type().await?;
        children.push((entry.path(), file_type.is_dir()));
    }
    children.sort();
    Ok(children)
}
