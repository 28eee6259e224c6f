//! Extractor backed by external binaries

use super::output::{ToolOutput, classify_failure};
use super::tools::ToolSet;
use super::{ExtractionJob, Extractor};
use crate::classify::base_extension;
use crate::config::ExtractionConfig;
use crate::error::{Error, ExtractionError, Result};
use crate::utils::{estimate_required_space, get_available_space};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Runs the best installed tool for each archive
///
/// Before the tool runs the archive must exist and be non-empty. When the
/// generic archiver is chosen, free space next to the archive must also cover
/// the archive size times the space factor.
///
/// # Examples
///
/// ```no_run
/// use media_unpack::config::Config;
/// use media_unpack::extraction::{CliExtractor, ExtractionJob, Extractor, ToolSet};
/// use media_unpack::classify::archive_entry;
/// use std::path::{Path, PathBuf};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let extractor = CliExtractor::from_config(ToolSet::discover(&config.tools), &config.extraction);
///
/// let job = ExtractionJob {
///     archive: archive_entry(Path::new("source/photos.7z"), &config.extraction)?,
///     output_dir: PathBuf::from("source/photos_extracted"),
///     password: config.extraction.password.clone(),
/// };
/// extractor.extract(&job).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct CliExtractor {
    tools: ToolSet,
    space_factor: f64,
    check_disk_space: bool,
}

impl CliExtractor {
    /// Create an extractor with default pre-flight settings
    pub fn new(tools: ToolSet) -> Self {
        Self::from_config(tools, &ExtractionConfig::default())
    }

    /// Create an extractor using the pre-flight settings of `config`
    pub fn from_config(tools: ToolSet, config: &ExtractionConfig) -> Self {
        Self {
            tools,
            space_factor: config.space_factor,
            check_disk_space: config.check_disk_space,
        }
    }

    /// The tools this extractor chooses from
    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    fn ensure_disk_space(&self, archive: &Path, size: u64) -> Result<()> {
        let dir = archive
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let available = get_available_space(dir)
            .map_err(|e| Error::DiskSpaceCheckFailed(format!("{}: {}", dir.display(), e)))?;
        check_required_space(archive, size, self.space_factor, available)?;
        Ok(())
    }
}

/// Fail with [`ExtractionError::DiskSpace`] when `available` cannot hold the estimate
pub(crate) fn check_required_space(
    archive: &Path,
    archive_size: u64,
    factor: f64,
    available: u64,
) -> std::result::Result<(), ExtractionError> {
    let required = estimate_required_space(archive_size, factor);
    if available < required {
        return Err(ExtractionError::DiskSpace {
            archive: archive.to_path_buf(),
            required,
            available,
        });
    }
    Ok(())
}

#[async_trait]
impl Extractor for CliExtractor {
    async fn extract(&self, job: &ExtractionJob) -> Result<()> {
        let archive = job.archive.path.as_path();

        let size = match tokio::fs::metadata(archive).await {
            Ok(metadata) if metadata.is_file() => metadata.len(),
            Ok(_) => {
                return Err(ExtractionError::MissingFile {
                    archive: archive.to_path_buf(),
                }
                .into());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ExtractionError::MissingFile {
                    archive: archive.to_path_buf(),
                }
                .into());
            }
            Err(e) => return Err(e.into()),
        };
        if size == 0 {
            return Err(ExtractionError::EmptyFile {
                archive: archive.to_path_buf(),
            }
            .into());
        }

        let (backend, binary) = self.tools.select(&base_extension(archive))?;
        if backend.is_generic() && self.check_disk_space {
            self.ensure_disk_space(archive, size)?;
        }

        tokio::fs::create_dir_all(&job.output_dir).await?;

        info!(
            archive = %archive.display(),
            tool = %backend,
            output = %job.output_dir.display(),
            "extracting archive"
        );

        let output = Command::new(binary)
            .args(backend.args(archive, &job.output_dir, job.password.as_deref()))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                Error::ExternalTool(format!("failed to execute {}: {}", binary.display(), e))
            })?;
        let output = ToolOutput::from_output(&output);

        if output.is_success(backend) {
            debug!(archive = %archive.display(), exit_code = ?output.exit_code, "extraction finished");
            return Ok(());
        }

        let err = classify_failure(backend, archive, &output);
        warn!(
            archive = %archive.display(),
            tool = %backend,
            exit_code = ?output.exit_code,
            error = %err,
            "extraction tool failed"
        );
        Err(err.into())
    }

    fn name(&self) -> &'static str {
        "cli"
    }
}
