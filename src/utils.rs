//! Utility functions for file operations and path manipulation

use crate::error::{Error, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Maximum number of rename attempts when resolving name collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Get a collision-free path for `name` inside `dest_dir`
///
/// Never returns an existing path. Files get `_1`, `_2`, ... inserted before
/// the extension, directories get it appended as a bare suffix.
///
/// # Examples
///
/// ```
/// use media_unpack::utils::get_unique_path;
/// use std::path::Path;
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("x.jpg"), b"old").unwrap();
/// let unique = get_unique_path(dir.path(), "x.jpg", false).unwrap();
/// assert_eq!(unique, dir.path().join("x_1.jpg"));
/// ```
pub fn get_unique_path(
    dest_dir: &Path,
    name: impl AsRef<OsStr>,
    is_dir: bool,
) -> Result<PathBuf> {
    let name = name.as_ref();
    let candidate = dest_dir.join(name);
    if !candidate.exists() {
        return Ok(candidate);
    }

    let (stem, extension) = if is_dir {
        (name, None)
    } else {
        let as_path = Path::new(name);
        match (as_path.file_stem(), as_path.extension()) {
            (Some(stem), Some(ext)) => (stem, Some(ext)),
            _ => (name, None),
        }
    };

    for i in 1..=MAX_RENAME_ATTEMPTS {
        let mut new_name = OsString::from(stem);
        new_name.push(format!("_{i}"));
        if let Some(ext) = extension {
            new_name.push(".");
            new_name.push(ext);
        }
        let new_path = dest_dir.join(new_name);
        if !new_path.exists() {
            return Ok(new_path);
        }
    }

    Err(Error::InvalidPath {
        path: candidate,
        reason: format!("could not find a free name after {MAX_RENAME_ATTEMPTS} attempts"),
    })
}

/// Move a file or folder into `dest_dir` under a collision-free name
///
/// Returns the path the entry ended up at.
pub async fn move_unique(source: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let metadata = tokio::fs::metadata(source)
        .await
        .map_err(|e| Error::InvalidPath {
            path: source.to_path_buf(),
            reason: format!("source path is not readable: {e}"),
        })?;

    let name = source.file_name().ok_or_else(|| Error::InvalidPath {
        path: source.to_path_buf(),
        reason: "cannot extract file name".to_string(),
    })?;

    tokio::fs::create_dir_all(dest_dir).await?;
    let target = get_unique_path(dest_dir, name, metadata.is_dir())?;
    move_path(source, &target).await?;
    Ok(target)
}

/// Move `source` to `target`, copying across filesystems when a rename is impossible
pub async fn move_path(source: &Path, target: &Path) -> Result<()> {
    match tokio::fs::rename(source, target).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => {
            debug!(?source, ?target, "rename crosses devices, copying instead");
            let source_owned = source.to_path_buf();
            let target_owned = target.to_path_buf();
            tokio::task::spawn_blocking(move || copy_then_remove(&source_owned, &target_owned))
                .await
                .map_err(|e| Error::MoveFailed {
                    source_path: source.to_path_buf(),
                    dest_path: target.to_path_buf(),
                    reason: format!("copy task panicked: {e}"),
                })?
        }
        Err(e) => Err(Error::MoveFailed {
            source_path: source.to_path_buf(),
            dest_path: target.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

fn copy_then_remove(source: &Path, target: &Path) -> Result<()> {
    let move_failed = |reason: String| Error::MoveFailed {
        source_path: source.to_path_buf(),
        dest_path: target.to_path_buf(),
        reason,
    };

    if source.is_file() {
        std::fs::copy(source, target).map_err(|e| move_failed(e.to_string()))?;
        std::fs::remove_file(source).map_err(|e| move_failed(e.to_string()))?;
        return Ok(());
    }

    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| move_failed(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| move_failed(e.to_string()))?;
        let dest = target.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest).map_err(|e| move_failed(e.to_string()))?;
        } else {
            std::fs::copy(entry.path(), &dest).map_err(|e| move_failed(e.to_string()))?;
        }
    }
    std::fs::remove_dir_all(source).map_err(|e| move_failed(e.to_string()))
}

/// Estimated bytes needed to extract an archive of `archive_size` bytes
pub fn estimate_required_space(archive_size: u64, factor: f64) -> u64 {
    (archive_size as f64 * factor).ceil() as u64
}

/// Size in mebibytes with two decimals, as shown in progress logs
pub fn format_size_mb(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / (1024.0 * 1024.0))
}

/// Get available disk space for a given path
///
/// Uses platform-specific APIs to query filesystem statistics:
/// - Linux: statvfs
/// - macOS: statvfs
/// - Windows: GetDiskFreeSpaceExW
///
/// # Arguments
///
/// * `path` - The path to check (typically the directory holding the archive)
///
/// # Returns
///
/// Returns the available disk space in bytes, or an IO error if the check fails.
pub fn get_available_space(path: &Path) -> std::io::Result<u64> {
    #[cfg(unix)]
    {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        // SAFETY: c_path is a valid NUL-terminated string, stat is zeroed
        // before the call and only read after statvfs reports success.
        unsafe {
            let mut stat: libc::statvfs = std::mem::zeroed();
            if libc::statvfs(c_path.as_ptr(), &mut stat) != 0 {
                return Err(std::io::Error::last_os_error());
            }

            // f_bavail: blocks available to unprivileged users
            #[allow(clippy::unnecessary_cast)]
            let available_bytes = (stat.f_bavail as u64).saturating_mul(stat.f_frsize as u64);
            Ok(available_bytes)
        }
    }

    #[cfg(windows)]
    {
        use std::os::windows::ffi::OsStrExt;
        use winapi::um::fileapi::GetDiskFreeSpaceExW;

        let wide_path: Vec<u16> = path
            .as_os_str()
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();

        // SAFETY: wide_path is NUL-terminated and every out pointer refers to
        // a live, aligned u64 that is only read after a successful call.
        unsafe {
            let mut free_bytes_available: u64 = 0;
            let mut _total_bytes: u64 = 0;
            let mut _total_free_bytes: u64 = 0;

            if GetDiskFreeSpaceExW(
                wide_path.as_ptr(),
                &mut free_bytes_available as *mut u64 as *mut _,
                &mut _total_bytes as *mut u64 as *mut _,
                &mut _total_free_bytes as *mut u64 as *mut _,
            ) == 0
            {
                return Err(std::io::Error::last_os_error());
            }

            Ok(free_bytes_available)
        }
    }

    #[cfg(not(any(unix, windows)))]
    {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "Disk space checking is not supported on this platform",
        ))
    }
}
