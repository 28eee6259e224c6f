//! Configuration types for media-unpack
//!
//! Every setting has a compiled-in default, so `Config::default()` reproduces
//! the behaviour of a plain `media-unpack` run. An optional TOML file can
//! override any subset of fields.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extraction password used when none is configured
pub const DEFAULT_PASSWORD: &str = "cosergirl.com";

/// Top-level configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory scanned for archives, relative to the project root (default: "source")
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Explicit output directory; overrides `output_layout` when set
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// How the output directory is named when `output_dir` is not set
    #[serde(default)]
    pub output_layout: OutputLayout,

    /// Extraction behaviour
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// External tool locations
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_dir: None,
            output_layout: OutputLayout::default(),
            extraction: ExtractionConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

/// Output directory naming policy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLayout {
    /// Fixed `upload` directory (default)
    #[default]
    Upload,
    /// Directory named after the current date (`YYYYMMDD`)
    Dated,
}

/// Archive extraction and sorting configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionConfig {
    /// Password passed to every tool (None = no password argument)
    #[serde(default = "default_password")]
    pub password: Option<String>,

    /// Suffixes treated as archives, with leading dot
    #[serde(default = "default_archive_extensions")]
    pub archive_extensions: Vec<String>,

    /// Image extensions, with leading dot
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,

    /// Video extensions, with leading dot
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,

    /// Suffix appended to scratch directory names (default: "_extracted")
    #[serde(default = "default_scratch_suffix")]
    pub scratch_suffix: String,

    /// Estimated extracted size as a multiple of the archive size (default: 1.5)
    #[serde(default = "default_space_factor")]
    pub space_factor: f64,

    /// Check free disk space before running the generic archiver (default: true)
    #[serde(default = "default_true")]
    pub check_disk_space: bool,

    /// Maximum depth for nested archive extraction (default: 16)
    #[serde(default = "default_max_recursion")]
    pub max_recursion_depth: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            password: default_password(),
            archive_extensions: default_archive_extensions(),
            image_extensions: default_image_extensions(),
            video_extensions: default_video_extensions(),
            scratch_suffix: default_scratch_suffix(),
            space_factor: default_space_factor(),
            check_disk_space: true,
            max_recursion_depth: default_max_recursion(),
        }
    }
}

/// External tool paths
///
/// Explicit paths win; otherwise the binaries are looked up on PATH when
/// `search_path` is enabled.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// Path to the 7z executable (auto-detected if None)
    #[serde(default)]
    pub sevenzip_path: Option<PathBuf>,

    /// Path to the unzip executable (auto-detected if None)
    #[serde(default)]
    pub unzip_path: Option<PathBuf>,

    /// Path to the unar executable (auto-detected if None)
    #[serde(default)]
    pub unar_path: Option<PathBuf>,

    /// Path to the unrar executable (auto-detected if None)
    #[serde(default)]
    pub unrar_path: Option<PathBuf>,

    /// Whether to search PATH for binaries without explicit paths (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            sevenzip_path: None,
            unzip_path: None,
            unar_path: None,
            unrar_path: None,
            search_path: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, filling missing fields with defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(text).map_err(|e| Error::Config {
            message: e.to_string(),
            key: None,
        })?;
        config.extraction.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Check that values are usable
    pub fn validate(&self) -> Result<()> {
        let extraction = &self.extraction;
        if extraction.scratch_suffix.trim().is_empty() {
            return Err(Error::config(
                "scratch suffix must not be empty",
                "extraction.scratch_suffix",
            ));
        }
        if !extraction.space_factor.is_finite() || extraction.space_factor < 1.0 {
            return Err(Error::config(
                format!(
                    "space factor must be at least 1.0, got {}",
                    extraction.space_factor
                ),
                "extraction.space_factor",
            ));
        }
        if extraction.archive_extensions.is_empty() {
            return Err(Error::config(
                "at least one archive extension is required",
                "extraction.archive_extensions",
            ));
        }
        if extraction.max_recursion_depth == 0 {
            return Err(Error::config(
                "max recursion depth must be at least 1",
                "extraction.max_recursion_depth",
            ));
        }
        Ok(())
    }

    /// Resolve the source directory against the project root
    pub fn source_path(&self, root: &Path) -> PathBuf {
        root.join(&self.source_dir)
    }

    /// Resolve the output directory against the project root for the given date
    pub fn output_path(&self, root: &Path, today: NaiveDate) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            return root.join(dir);
        }
        match self.output_layout {
            OutputLayout::Upload => root.join("upload"),
            OutputLayout::Dated => root.join(today.format("%Y%m%d").to_string()),
        }
    }
}

impl ExtractionConfig {
    /// Lowercase every extension and make sure it starts with a dot
    pub fn normalize(&mut self) {
        for list in [
            &mut self.archive_extensions,
            &mut self.image_extensions,
            &mut self.video_extensions,
        ] {
            for ext in list.iter_mut() {
                let lower = ext.trim().to_lowercase();
                *ext = if lower.starts_with('.') {
                    lower
                } else {
                    format!(".{lower}")
                };
            }
        }
    }
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("source")
}

fn default_password() -> Option<String> {
    Some(DEFAULT_PASSWORD.to_string())
}

fn default_archive_extensions() -> Vec<String> {
    [
        ".7z", ".zip", ".rar", ".tar", ".gz", ".bz2", ".xz", ".tar.gz", ".tar.bz2", ".tar.xz",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_image_extensions() -> Vec<String> {
    [
        ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".svg", ".ico", ".tiff", ".tif",
        ".heic", ".heif",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_video_extensions() -> Vec<String> {
    [
        ".mp4", ".avi", ".mov", ".mkv", ".wmv", ".flv", ".webm", ".m4v", ".mpg", ".mpeg", ".3gp",
        ".ts", ".mts",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_scratch_suffix() -> String {
    "_extracted".to_string()
}

fn default_space_factor() -> f64 {
    1.5
}

fn default_max_recursion() -> u32 {
    16
}

fn default_true() -> bool {
    true
}
