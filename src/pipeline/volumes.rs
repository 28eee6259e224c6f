//! Multi-volume archive sets (`name.ext.001`, `name.ext.002`, ... and
//! `name.part1.rar`, `name.part2.rar`, ...)

use crate::classify::{rar_part_index, rar_part_set_name, volume_index, volume_set_name};
use crate::error::Result;
use crate::utils::move_path;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Highest volume number a three-digit suffix can express
const MAX_VOLUME: u32 = 999;

/// Naming scheme shared by the members of a split set
#[derive(Clone, Debug, PartialEq, Eq)]
enum SplitSet {
    /// `name.ext.001`, `name.ext.002`, ...
    Numbered(String),
    /// `name.part1.rar`, `name.part2.rar`, ...
    RarParts(String),
}

impl SplitSet {
    fn of(path: &Path) -> Option<Self> {
        volume_set_name(path)
            .map(Self::Numbered)
            .or_else(|| rar_part_set_name(path).map(Self::RarParts))
    }

    fn is_continuation(&self, path: &Path) -> bool {
        match self {
            Self::Numbered(set) => {
                volume_set_name(path).as_deref() == Some(set.as_str())
                    && volume_index(path).is_some_and(|volume| volume > 1)
            }
            Self::RarParts(set) => {
                rar_part_set_name(path).as_deref() == Some(set.as_str())
                    && rar_part_index(path).is_some_and(|part| part > 1)
            }
        }
    }
}

/// Gather the continuation volumes of a split set next to its first volume
///
/// Volumes are looked up in sequence starting at `.002`. A volume missing
/// from the first volume's directory is searched for under `search_roots`
/// and moved in; the search stops at the first number found nowhere. Returns
/// the continuation volumes now sitting next to `first`.
///
/// Does nothing for archives that are not part of a split set.
pub async fn consolidate_volumes(first: &Path, search_roots: &[&Path]) -> Result<Vec<PathBuf>> {
    let (Some(set_name), Some(dir)) = (volume_set_name(first), first.parent()) else {
        return Ok(Vec::new());
    };

    let mut strays: Option<HashMap<String, PathBuf>> = None;
    let mut volumes = Vec::new();

    for number in 2..=MAX_VOLUME {
        let name = format!("{set_name}.{number:03}");
        let expected = dir.join(&name);
        if expected.is_file() {
            volumes.push(expected);
            continue;
        }

        // walk the search roots only once, on the first missing volume
        let pending = strays.get_or_insert_with(|| {
            collect_strays(&SplitSet::Numbered(set_name.clone()), dir, search_roots)
        });
        let Some(found) = pending.remove(&name) else {
            debug!(?first, missing = %name, "no further volumes found");
            break;
        };

        info!(from = ?found, to = ?expected, "moving stray volume next to first volume");
        move_path(&found, &expected).await?;
        volumes.push(expected);
    }

    Ok(volumes)
}

/// Continuation volumes (`.002` and up, `.part2.rar` and up) sharing a directory with `first`
pub async fn continuation_volumes(first: &Path) -> Vec<PathBuf> {
    let (Some(set), Some(dir)) = (SplitSet::of(first), first.parent()) else {
        return Vec::new();
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(?dir, error = %e, "failed to list volumes");
            return Vec::new();
        }
    };

    let mut volumes = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if set.is_continuation(&path) {
            volumes.push(path);
        }
    }
    volumes.sort();
    volumes
}

/// Delete the continuation volumes of `first` (best effort)
///
/// Returns the number of volumes deleted.
pub async fn remove_continuations(first: &Path) -> usize {
    let mut removed = 0;
    for volume in continuation_volumes(first).await {
        match tokio::fs::remove_file(&volume).await {
            Ok(()) => {
                debug!(?volume, "deleted consumed volume");
                removed += 1;
            }
            Err(e) => warn!(?volume, error = %e, "failed to delete consumed volume"),
        }
    }
    removed
}

/// Continuation volumes of `set` anywhere under `roots`, outside `home`
fn collect_strays(set: &SplitSet, home: &Path, roots: &[&Path]) -> HashMap<String, PathBuf> {
    let mut strays = HashMap::new();
    for root in roots {
        for entry in WalkDir::new(root).sort_by_file_name().into_iter().flatten() {
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.parent() == Some(home)
                || !set.is_continuation(path)
            {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            strays.entry(name).or_insert_with(|| path.to_path_buf());
        }
    }
    strays
}
