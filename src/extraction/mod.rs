//! Archive extraction through external command line tools
//!
//! Extraction is delegated to whichever of `7z`, `unzip`, `unar` and `unrar`
//! is installed. [`ToolSet`] resolves the binaries once per run and picks one
//! per archive, [`CliExtractor`] runs it and turns its output into either
//! success or a classified [`ExtractionError`](crate::error::ExtractionError).
//!
//! The pipeline only sees the [`Extractor`] trait, so tests can drive it with
//! an in-memory implementation.

mod backend;
mod cli;
mod output;
mod tools;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use backend::ExtractorBackend;
pub use cli::CliExtractor;
pub use output::{ToolOutput, classify_failure};
pub use tools::{ToolSet, preference_order};

use crate::error::Result;
use crate::types::ArchiveEntry;
use async_trait::async_trait;
use std::path::PathBuf;

/// One archive to extract and where to put its contents
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractionJob {
    /// The archive (first volume for split sets)
    pub archive: ArchiveEntry,
    /// Scratch directory receiving the extracted tree, created if missing
    pub output_dir: PathBuf,
    /// Password handed to the tool, `None` for no password argument
    pub password: Option<String>,
}

/// Something that can unpack one archive into a directory
///
/// Implementations must leave the archive itself untouched; deleting
/// consumed inputs is the caller's job.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract `job.archive` into `job.output_dir`
    async fn extract(&self, job: &ExtractionJob) -> Result<()>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
