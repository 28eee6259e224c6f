//! Error types for media-unpack
//!
//! This module provides the error taxonomy for the unpacking pipeline:
//! - [`ExtractionError`] for everything that can go wrong while handing one
//!   archive to an external tool (missing tool, pre-flight checks, classified
//!   tool failures)
//! - [`Error`] for the pipeline as a whole (configuration, I/O, relocation,
//!   nested archive failures)
//!
//! Every error carries a human-readable [`Error::suggestion`] that is logged
//! next to per-archive failures.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for media-unpack operations
pub type Result<T> = std::result::Result<T, Error>;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

fn gigabytes(bytes: &u64) -> String {
    format!("{:.2}", *bytes as f64 / BYTES_PER_GB)
}

/// Main error type for media-unpack
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "password")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Extraction of a single archive failed
    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    /// A nested archive failed, aborting the relocation step of its parent
    #[error("nested archive {nested} inside {archive} failed: {source}")]
    NestedFailure {
        /// The parent archive whose processing was aborted
        archive: PathBuf,
        /// The nested archive that failed
        nested: PathBuf,
        /// The underlying failure of the nested archive
        #[source]
        source: Box<Error>,
    },

    /// Source directory does not exist
    #[error("source directory does not exist: {0}")]
    SourceMissing(PathBuf),

    /// No extraction tool is installed at all
    #[error("no extraction tool found (need at least one of 7z, unzip, unar, unrar)")]
    NoToolsAvailable,

    /// File or folder move into the destination failed
    #[error("failed to move {source_path} to {dest_path}: {reason}")]
    MoveFailed {
        /// The path being moved
        source_path: PathBuf,
        /// The destination it was being moved to
        dest_path: PathBuf,
        /// The reason the move failed
        reason: String,
    },

    /// Invalid path encountered while sorting outputs
    #[error("invalid path {path}: {reason}")]
    InvalidPath {
        /// The invalid path
        path: PathBuf,
        /// The reason the path is invalid
        reason: String,
    },

    /// Failed to check disk space
    #[error("failed to check disk space: {0}")]
    DiskSpaceCheckFailed(String),

    /// External tool could not be executed
    #[error("external tool error: {0}")]
    ExternalTool(String),
}

/// Errors raised while extracting a single archive
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// No eligible extraction tool is installed for this archive kind
    #[error("extracting {kind} archives requires {tool}; install it with: {hint}")]
    ToolNotFound {
        /// The archive kind (base extension, e.g. ".rar")
        kind: String,
        /// The missing tool
        tool: String,
        /// Install suggestion (text only, never executed)
        hint: String,
    },

    /// Pre-flight estimate exceeds the available disk space
    #[error(
        "insufficient disk space for {archive}: need {} GB, have {} GB",
        gigabytes(.required),
        gigabytes(.available)
    )]
    DiskSpace {
        /// The archive being extracted
        archive: PathBuf,
        /// Estimated bytes required
        required: u64,
        /// Bytes currently available
        available: u64,
    },

    /// Wrong or missing password for an encrypted archive
    #[error("wrong or missing password for encrypted archive {archive}")]
    WrongPassword {
        /// The encrypted archive
        archive: PathBuf,
    },

    /// Archive is corrupted (CRC failure, truncated data, not an archive)
    #[error("archive {archive} is corrupted: {reason}")]
    CorruptArchive {
        /// The damaged archive
        archive: PathBuf,
        /// The tool output line describing the damage
        reason: String,
    },

    /// Archive or one of its volumes is missing
    #[error("archive file or volume missing for {archive}")]
    MissingFile {
        /// The archive that could not be found or completed
        archive: PathBuf,
    },

    /// Archive file is empty
    #[error("archive {archive} is empty (0 bytes)")]
    EmptyFile {
        /// The empty archive
        archive: PathBuf,
    },

    /// The extraction tool ran out of space while writing
    #[error("ran out of disk space while extracting {archive}")]
    InsufficientSpace {
        /// The archive being extracted
        archive: PathBuf,
    },

    /// Nested archives go deeper than the configured limit
    #[error("archive {archive} is nested deeper than {max_depth} levels")]
    TooDeep {
        /// The archive that exceeded the limit
        archive: PathBuf,
        /// The configured maximum depth
        max_depth: u32,
    },

    /// Unclassified tool failure
    #[error("{tool} failed for {archive}: {reason}")]
    Failed {
        /// The archive being extracted
        archive: PathBuf,
        /// The tool that failed
        tool: String,
        /// Captured tool output
        reason: String,
    },
}

impl ExtractionError {
    /// Suggestion shown to the user next to the failure
    pub fn suggestion(&self) -> String {
        match self {
            Self::ToolNotFound { hint, .. } => format!("Install the missing tool: {hint}"),
            Self::DiskSpace { .. } | Self::InsufficientSpace { .. } => {
                "Free up disk space next to the archive and run again".to_string()
            }
            Self::WrongPassword { .. } => {
                "Check the configured extraction password for this archive".to_string()
            }
            Self::CorruptArchive { .. } => {
                "Re-download the archive; it is kept in place for a retry".to_string()
            }
            Self::MissingFile { .. } => {
                "Make sure every volume (.001, .002, ...) of the set is present".to_string()
            }
            Self::EmptyFile { .. } => "The archive has no content; re-download it".to_string(),
            Self::TooDeep { .. } => {
                "Raise max_recursion_depth in the configuration if the nesting is expected"
                    .to_string()
            }
            Self::Failed { .. } => {
                "Run the tool by hand on the kept archive to inspect the failure".to_string()
            }
        }
    }
}

impl Error {
    /// Create a configuration error for a specific key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Suggestion shown to the user next to the failure
    pub fn suggestion(&self) -> String {
        match self {
            Self::Extraction(e) => e.suggestion(),
            Self::NestedFailure { source, .. } => source.suggestion(),
            Self::Config { .. } => "Check the configuration file syntax and values".to_string(),
            Self::Io(_) | Self::MoveFailed { .. } | Self::InvalidPath { .. } => {
                "Check permissions on the source and output directories".to_string()
            }
            Self::SourceMissing(path) => {
                format!("Create the source directory {} and put archives in it", path.display())
            }
            Self::NoToolsAvailable => {
                "Install 7z (brew install p7zip) or unzip (brew install unzip)".to_string()
            }
            Self::DiskSpaceCheckFailed(_) => {
                "Make sure the archive's directory is on a mounted filesystem".to_string()
            }
            Self::ExternalTool(_) => "Check that the configured tool path is executable".to_string(),
        }
    }
}
