//! Archive, volume and media detection by file name.
//!
//! Split archives use a three-digit volume suffix (`movie.7z.001`,
//! `movie.7z.002`, ...). Only the first volume is ever handed to an
//! extraction tool; the tools locate the continuation volumes themselves.
//! Continuation volumes still count as archives so they are never sorted
//! into the destination as loose files.

use crate::config::ExtractionConfig;
use crate::types::{ArchiveEntry, ArchiveType};
use std::path::Path;
use walkdir::WalkDir;

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Split `name.ext.NNN` into (`name.ext`, NNN) when the last suffix is exactly three digits.
fn split_volume_suffix(name: &str) -> Option<(&str, u32)> {
    let (stem, digits) = name.rsplit_once('.')?;
    if digits.len() == 3 && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some((stem, digits.parse().ok()?))
    } else {
        None
    }
}

/// Split `name.partN.rar` into (`name`, N). The `.part`/`.rar` match ignores case.
fn split_rar_part(name: &str) -> Option<(&str, u32)> {
    let lower = name.to_ascii_lowercase();
    let stem = lower.strip_suffix(".rar")?;
    let part_idx = stem.rfind(".part")?;
    let digits = &stem[part_idx + 5..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // ASCII lowercasing keeps byte offsets valid in `name`
    Some((&name[..part_idx], digits.parse().ok()?))
}

/// Longest configured archive suffix that `lower_name` ends with.
fn matching_archive_suffix<'a>(lower_name: &str, config: &'a ExtractionConfig) -> Option<&'a str> {
    config
        .archive_extensions
        .iter()
        .filter(|ext| lower_name.ends_with(ext.as_str()))
        .max_by_key(|ext| ext.len())
        .map(|ext| ext.as_str())
}

/// Volume number parsed from a `.NNN` suffix, if any.
pub fn volume_index(path: &Path) -> Option<u32> {
    let name = file_name_lossy(path);
    split_volume_suffix(&name).map(|(_, volume)| volume)
}

/// Part number of a `name.partN.rar` volume, if any.
pub fn rar_part_index(path: &Path) -> Option<u32> {
    let name = file_name_lossy(path);
    split_rar_part(&name).map(|(_, part)| part)
}

/// Name shared by every volume of a `name.partN.rar` set (`movie` for `movie.part2.rar`).
pub fn rar_part_set_name(path: &Path) -> Option<String> {
    let name = file_name_lossy(path);
    split_rar_part(&name).map(|(set, _)| set.to_string())
}

/// Check if a file is an archive, including every volume of a split set.
///
/// True when the lowercased name ends with a known archive suffix, or when it
/// ends with `.NNN` and the remainder ends with a known archive suffix.
pub fn is_archive(path: &Path, config: &ExtractionConfig) -> bool {
    let name = file_name_lossy(path).to_lowercase();
    if matching_archive_suffix(&name, config).is_some() {
        return true;
    }
    match split_volume_suffix(&name) {
        Some((stem, _)) => matching_archive_suffix(stem, config).is_some(),
        None => false,
    }
}

/// Check if a file is an archive that should be queued for extraction.
///
/// Continuation volumes (`.002` and up, `.part2.rar` and up) are archives but
/// never queued.
pub fn is_first_volume_archive(path: &Path, config: &ExtractionConfig) -> bool {
    is_archive(path, config)
        && volume_index(path).is_none_or(|volume| volume == 1)
        && rar_part_index(path).is_none_or(|part| part == 1)
}

/// Check if a file is an image or video by extension
pub fn is_media_file(path: &Path, config: &ExtractionConfig) -> bool {
    let Some(ext) = path.extension() else {
        return false;
    };
    let ext = format!(".{}", ext.to_string_lossy().to_lowercase());
    config.image_extensions.contains(&ext) || config.video_extensions.contains(&ext)
}

/// Check if a folder recursively contains at least one media file
pub fn is_media_folder(dir: &Path, config: &ExtractionConfig) -> bool {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .any(|entry| entry.file_type().is_file() && is_media_file(entry.path(), config))
}

/// Extension used to pick an extraction tool, lowercased with a leading dot.
///
/// For `name.rar.001` this is `.rar`; otherwise the plain extension. Empty
/// when the name has no extension.
pub fn base_extension(path: &Path) -> String {
    let name = file_name_lossy(path).to_lowercase();
    let name = split_volume_suffix(&name).map_or(name.as_str(), |(stem, _)| stem);
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Container format of an archive, looking through any volume suffix.
pub fn archive_type(path: &Path, config: &ExtractionConfig) -> Option<ArchiveType> {
    let name = file_name_lossy(path).to_lowercase();
    let name = split_volume_suffix(&name).map_or(name.as_str(), |(stem, _)| stem);
    matching_archive_suffix(name, config).and_then(ArchiveType::from_suffix)
}

/// Name shared by every member of a split set (`photos.7z` for `photos.7z.003`).
pub fn volume_set_name(path: &Path) -> Option<String> {
    let name = file_name_lossy(path);
    split_volume_suffix(&name).map(|(stem, _)| stem.to_string())
}

/// Archive name without volume suffix and container extension.
///
/// `c.rar.001` → `c`, `movie.part1.rar` → `movie`, `shots.tar.gz` → `shots`,
/// `a.zip` → `a`. Falls back to the full name when nothing would remain.
pub fn archive_stem(path: &Path, config: &ExtractionConfig) -> String {
    let name = file_name_lossy(path);
    if let Some((set, _)) = split_rar_part(&name).filter(|(set, _)| !set.is_empty()) {
        return set.to_string();
    }
    let name = split_volume_suffix(&name).map_or(name.as_str(), |(stem, _)| stem);
    let lower = name.to_lowercase();

    let suffix_len = match matching_archive_suffix(&lower, config) {
        Some(suffix) => suffix.len(),
        None => Path::new(name)
            .extension()
            .map_or(0, |ext| ext.len() + 1),
    };

    // suffix is ASCII, so byte lengths agree between `name` and `lower`
    match name.get(..name.len().saturating_sub(suffix_len)) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => name.to_string(),
    }
}

/// Build an [`ArchiveEntry`] for a path, reading its size from disk.
pub fn archive_entry(path: &Path, config: &ExtractionConfig) -> std::io::Result<ArchiveEntry> {
    let size = std::fs::metadata(path)?.len();
    Ok(ArchiveEntry {
        path: path.to_path_buf(),
        archive_type: archive_type(path, config),
        volume: volume_index(path)
            .or_else(|| rar_part_index(path))
            .unwrap_or(1),
        size,
    })
}
