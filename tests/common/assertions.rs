//! Directory tree assertions

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;
use walkdir::WalkDir;

/// Every file below `root`, as sorted `/`-separated relative paths
pub fn files_under(root: &Path) -> Vec<String> {
    if !root.exists() {
        return Vec::new();
    }
    let mut files: Vec<String> = WalkDir::new(root)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    files.sort();
    files
}

/// Assert that no directory below `root` carries the scratch suffix
pub fn assert_no_scratch_dirs(root: &Path) {
    let leftovers: Vec<_> = WalkDir::new(root)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_dir())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with("_extracted"))
        .map(|entry| entry.into_path())
        .collect();
    assert!(leftovers.is_empty(), "scratch directories left: {leftovers:?}");
}
