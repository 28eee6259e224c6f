//! Recursive unpacking pipeline
//!
//! [`Unpacker::run`] scans the source tree for archives and resolves them one
//! at a time. Each archive moves through the [`Stage`]s
//! `discovered → extracting → relocating_nested → sorting → cleanup → done`,
//! or ends in `failed` with the archive left in place for a retry.
//!
//! Nested archives found in a scratch directory are resolved depth-first
//! before their parent's output is sorted. A nested failure aborts the parent.

pub mod relocate;
pub mod scan;
pub mod volumes;

pub use relocate::MovedFolders;

use crate::classify::archive_entry;
use crate::config::ExtractionConfig;
use crate::error::{Error, ExtractionError, Result};
use crate::extraction::{ExtractionJob, Extractor};
use crate::types::{RunStats, RunSummary, Stage};
use crate::utils::format_size_mb;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Source and destination roots of one run
#[derive(Clone, Copy, Debug)]
struct Roots<'a> {
    source: &'a Path,
    dest: &'a Path,
}

/// Mutable state of one run, threaded through the recursion
#[derive(Debug, Default)]
struct RunState {
    processed: HashSet<PathBuf>,
    stats: RunStats,
    relocated: Vec<PathBuf>,
}

/// Drives extraction, nested resolution, sorting and cleanup
///
/// # Examples
///
/// ```no_run
/// use media_unpack::config::Config;
/// use media_unpack::extraction::{CliExtractor, ToolSet};
/// use media_unpack::pipeline::Unpacker;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let tools = ToolSet::discover(&config.tools);
/// let extractor = Arc::new(CliExtractor::from_config(tools, &config.extraction));
///
/// let unpacker = Unpacker::new(config.extraction, extractor);
/// let summary = unpacker.run(Path::new("source"), Path::new("upload")).await?;
/// println!("{} archives unpacked", summary.stats.succeeded);
/// # Ok(())
/// # }
/// ```
pub struct Unpacker {
    config: ExtractionConfig,
    extractor: Arc<dyn Extractor>,
}

impl Unpacker {
    /// Create a pipeline using `extractor` for every archive
    pub fn new(config: ExtractionConfig, extractor: Arc<dyn Extractor>) -> Self {
        Self { config, extractor }
    }

    /// Unpack every archive under `source` into `dest`
    ///
    /// Per-archive failures are logged and recorded in the summary; only
    /// setup problems (missing source, unusable destination) return an error.
    pub async fn run(&self, source: &Path, dest: &Path) -> Result<RunSummary> {
        if !tokio::fs::metadata(source)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(Error::SourceMissing(source.to_path_buf()));
        }
        tokio::fs::create_dir_all(dest).await?;

        let roots = Roots { source, dest };
        let queue = scan::find_archives(source, &self.config);
        info!(
            count = queue.len(),
            ?source,
            ?dest,
            extractor = self.extractor.name(),
            "found archives"
        );

        let mut state = RunState::default();
        state.stats.total = queue.len();
        let mut failures = Vec::new();

        for archive in queue {
            if state.processed.contains(&archive) {
                debug!(?archive, "already processed, skipping");
                state.stats.total = state.stats.total.saturating_sub(1);
                continue;
            }
            if tokio::fs::metadata(&archive).await.is_err() {
                debug!(?archive, "archive disappeared before processing, skipping");
                state.stats.total = state.stats.total.saturating_sub(1);
                continue;
            }

            debug!(?archive, stage = %Stage::Discovered, "queued archive");
            let mut moved = MovedFolders::default();
            match self
                .process_archive(&archive, roots, 0, &mut state, &mut moved)
                .await
            {
                Ok(()) => state.stats.succeeded += 1,
                Err(e) => {
                    state.stats.failed += 1;
                    error!(
                        ?archive,
                        error = %e,
                        suggestion = %e.suggestion(),
                        "failed to process archive, keeping it for a retry"
                    );
                    failures.push((archive, e.to_string()));
                }
            }

            let stats = state.stats;
            info!(
                "[{}/{}] ({}%) | ok: {} | failed: {}",
                stats.processed,
                stats.total,
                stats.percent(),
                stats.succeeded,
                stats.failed
            );
        }

        scan::purge_scratch_dirs(source, &self.config.scratch_suffix).await;

        info!(
            succeeded = state.stats.succeeded,
            failed = state.stats.failed,
            relocated = state.relocated.len(),
            "run complete"
        );

        Ok(RunSummary {
            stats: state.stats,
            failures,
            relocated: state.relocated,
        })
    }

    /// Resolve one archive and everything nested inside it
    ///
    /// The scratch directory is always removed. The archive and its
    /// continuation volumes are deleted only on success.
    fn process_archive<'a>(
        &'a self,
        archive: &'a Path,
        roots: Roots<'a>,
        depth: u32,
        state: &'a mut RunState,
        moved: &'a mut MovedFolders,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            state.processed.insert(archive.to_path_buf());
            state.stats.processed += 1;

            if depth > self.config.max_recursion_depth {
                return Err(ExtractionError::TooDeep {
                    archive: archive.to_path_buf(),
                    max_depth: self.config.max_recursion_depth,
                }
                .into());
            }

            let scratch = scan::scratch_dir_for(archive, &self.config);
            let result = self
                .unpack_into(archive, &scratch, roots, depth, state, moved)
                .await;

            debug!(?archive, depth, stage = %Stage::Cleanup, "cleaning up");
            scan::remove_scratch_dir(&scratch).await;

            if let Err(e) = result {
                warn!(?archive, depth, stage = %Stage::Failed, error = %e, "archive failed");
                return Err(e);
            }

            match tokio::fs::remove_file(archive).await {
                Ok(()) => debug!(?archive, "deleted processed archive"),
                Err(e) => warn!(?archive, error = %e, "failed to delete processed archive"),
            }
            volumes::remove_continuations(archive).await;

            info!(?archive, depth, stage = %Stage::Done, "archive unpacked");
            Ok(())
        })
    }

    /// Extract into `scratch`, resolve nested archives, then sort the output
    async fn unpack_into(
        &self,
        archive: &Path,
        scratch: &Path,
        roots: Roots<'_>,
        depth: u32,
        state: &mut RunState,
        moved: &mut MovedFolders,
    ) -> Result<()> {
        volumes::consolidate_volumes(archive, &[roots.source, roots.dest]).await?;

        let entry = archive_entry(archive, &self.config).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::from(ExtractionError::MissingFile {
                archive: archive.to_path_buf(),
            }),
            _ => Error::from(e),
        })?;

        if tokio::fs::metadata(scratch).await.is_ok() {
            debug!(?scratch, "removing stale scratch directory");
            tokio::fs::remove_dir_all(scratch).await?;
        }

        info!(
            ?archive,
            depth,
            size_mb = %format_size_mb(entry.size),
            stage = %Stage::Extracting,
            "extracting"
        );
        let job = ExtractionJob {
            archive: entry,
            output_dir: scratch.to_path_buf(),
            password: self.config.password.clone(),
        };
        self.extractor.extract(&job).await?;

        let nested: Vec<PathBuf> = scan::find_nested_archives(scratch, &self.config)
            .into_iter()
            .filter(|path| !state.processed.contains(path))
            .collect();
        if !nested.is_empty() {
            state.stats.total += nested.len();
            info!(
                ?archive,
                count = nested.len(),
                stage = %Stage::RelocatingNested,
                "resolving nested archives"
            );
        }
        for inner in nested {
            if state.processed.contains(&inner) || tokio::fs::metadata(&inner).await.is_err() {
                continue;
            }
            self.process_archive(&inner, roots, depth + 1, state, moved)
                .await
                .map_err(|e| Error::NestedFailure {
                    archive: archive.to_path_buf(),
                    nested: inner.clone(),
                    source: Box::new(e),
                })?;
        }

        debug!(?archive, stage = %Stage::Sorting, "sorting extracted content");
        let media =
            relocate::relocate_media_folders(scratch, roots.dest, &self.config, moved).await?;
        let leftovers =
            relocate::relocate_leftovers(scratch, roots.dest, &self.config, moved).await?;
        state.relocated.extend(media);
        state.relocated.extend(leftovers);

        Ok(())
    }
}
