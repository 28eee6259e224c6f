//! Core types shared across the pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Archive container format detected by file extension
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveType {
    /// 7-Zip archive (.7z)
    SevenZip,
    /// ZIP archive (.zip)
    Zip,
    /// RAR archive (.rar)
    Rar,
    /// Plain tarball (.tar)
    Tar,
    /// Gzip-compressed tarball (.tar.gz)
    TarGz,
    /// Bzip2-compressed tarball (.tar.bz2)
    TarBz2,
    /// Xz-compressed tarball (.tar.xz)
    TarXz,
    /// Single gzip stream (.gz)
    Gzip,
    /// Single bzip2 stream (.bz2)
    Bzip2,
    /// Single xz stream (.xz)
    Xz,
}

impl ArchiveType {
    /// Map a lowercased suffix (with leading dot) to an archive type
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            ".7z" => Some(Self::SevenZip),
            ".zip" => Some(Self::Zip),
            ".rar" => Some(Self::Rar),
            ".tar" => Some(Self::Tar),
            ".tar.gz" | ".tgz" => Some(Self::TarGz),
            ".tar.bz2" | ".tbz2" => Some(Self::TarBz2),
            ".tar.xz" | ".txz" => Some(Self::TarXz),
            ".gz" => Some(Self::Gzip),
            ".bz2" => Some(Self::Bzip2),
            ".xz" => Some(Self::Xz),
            _ => None,
        }
    }
}

impl fmt::Display for ArchiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SevenZip => "7z",
            Self::Zip => "zip",
            Self::Rar => "rar",
            Self::Tar => "tar",
            Self::TarGz => "tar.gz",
            Self::TarBz2 => "tar.bz2",
            Self::TarXz => "tar.xz",
            Self::Gzip => "gz",
            Self::Bzip2 => "bz2",
            Self::Xz => "xz",
        };
        f.write_str(name)
    }
}

/// A filesystem path identified as an archive
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path to the archive (first volume for split sets)
    pub path: PathBuf,
    /// Detected container format, `None` when only the volume suffix matched
    pub archive_type: Option<ArchiveType>,
    /// 1 for standalone archives and first volumes, >1 for continuation volumes
    pub volume: u32,
    /// Size in bytes at discovery time
    pub size: u64,
}

impl ArchiveEntry {
    /// Whether this entry is part of a `.NNN` or `.partN.rar` split set
    pub fn is_split(&self) -> bool {
        crate::classify::volume_index(&self.path).is_some()
            || crate::classify::rar_part_index(&self.path).is_some()
    }
}

/// Lifecycle stage of one archive inside the pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Found by the source scan
    Discovered,
    /// External tool is running
    Extracting,
    /// Nested archives inside the scratch directory are being resolved
    RelocatingNested,
    /// Media folders and leftovers are moved into the destination
    Sorting,
    /// Scratch directory and consumed inputs are removed
    Cleanup,
    /// Fully processed, archive deleted
    Done,
    /// Processing failed, archive retained for a retry
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Discovered => "discovered",
            Self::Extracting => "extracting",
            Self::RelocatingNested => "relocating_nested",
            Self::Sorting => "sorting",
            Self::Cleanup => "cleanup",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Running counters for progress reporting
///
/// `total` is dynamic: discovering a nested archive increments it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Archives handed to the extractor so far (top-level and nested)
    pub processed: usize,
    /// Archives known to need processing
    pub total: usize,
    /// Top-level archives fully processed
    pub succeeded: usize,
    /// Top-level archives that failed and were retained
    pub failed: usize,
}

impl RunStats {
    /// Completion percentage (0 when nothing is known yet)
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.processed * 100 / self.total
        }
    }
}

/// Final report of one pipeline run
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    /// Final counters
    pub stats: RunStats,
    /// Archives that failed, with the rendered error
    pub failures: Vec<(PathBuf, String)>,
    /// Paths created inside the destination tree
    pub relocated: Vec<PathBuf>,
}
