//! Discovery of installed extraction tools and per-archive tool selection

use super::backend::ExtractorBackend;
use crate::config::ToolsConfig;
use crate::error::ExtractionError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Installed extraction tools, resolved once per run
///
/// # Examples
///
/// ```
/// use media_unpack::extraction::{ExtractorBackend, ToolSet};
/// use std::path::PathBuf;
///
/// let tools = ToolSet::empty().with(ExtractorBackend::Unzip, PathBuf::from("/usr/bin/unzip"));
/// let (backend, _) = tools.select(".zip").unwrap();
/// assert_eq!(backend, ExtractorBackend::Unzip);
/// assert!(tools.select(".rar").is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ToolSet {
    sevenzip: Option<PathBuf>,
    unzip: Option<PathBuf>,
    unar: Option<PathBuf>,
    unrar: Option<PathBuf>,
}

impl ToolSet {
    /// A tool set with nothing installed
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolve every backend from explicit config paths, then PATH
    pub fn discover(config: &ToolsConfig) -> Self {
        let mut tools = Self::empty();
        for backend in ExtractorBackend::ALL {
            let explicit = match backend {
                ExtractorBackend::SevenZip => config.sevenzip_path.as_ref(),
                ExtractorBackend::Unzip => config.unzip_path.as_ref(),
                ExtractorBackend::Unar => config.unar_path.as_ref(),
                ExtractorBackend::Unrar => config.unrar_path.as_ref(),
            };

            let resolved = match explicit {
                Some(path) if path.exists() => Some(path.clone()),
                Some(path) => {
                    warn!(
                        tool = backend.binary_name(),
                        path = %path.display(),
                        "configured tool path does not exist, ignoring"
                    );
                    None
                }
                None => None,
            }
            .or_else(|| {
                config
                    .search_path
                    .then(|| which::which(backend.binary_name()).ok())
                    .flatten()
            });

            if let Some(path) = resolved {
                debug!(tool = backend.binary_name(), path = %path.display(), "found extraction tool");
                tools = tools.with(backend, path);
            }
        }
        tools
    }

    /// Register a binary for `backend`
    pub fn with(mut self, backend: ExtractorBackend, path: PathBuf) -> Self {
        *self.slot_mut(backend) = Some(path);
        self
    }

    /// Path of the binary for `backend`, if installed
    pub fn path(&self, backend: ExtractorBackend) -> Option<&Path> {
        match backend {
            ExtractorBackend::SevenZip => self.sevenzip.as_deref(),
            ExtractorBackend::Unzip => self.unzip.as_deref(),
            ExtractorBackend::Unar => self.unar.as_deref(),
            ExtractorBackend::Unrar => self.unrar.as_deref(),
        }
    }

    /// Whether no tool at all is installed
    pub fn is_empty(&self) -> bool {
        self.available().is_empty()
    }

    /// Installed backends, in discovery order
    pub fn available(&self) -> Vec<ExtractorBackend> {
        ExtractorBackend::ALL
            .into_iter()
            .filter(|backend| self.path(*backend).is_some())
            .collect()
    }

    /// Pick the tool for an archive by its base extension (`.rar`, `.zip`, ...)
    ///
    /// `.zip` prefers `unzip`, `.rar` prefers `unar` then `unrar`; the generic
    /// `7z` is the fallback for both and the only choice for everything else.
    pub fn select(&self, base_extension: &str) -> Result<(ExtractorBackend, &Path), ExtractionError> {
        let order = preference_order(base_extension);
        order
            .iter()
            .find_map(|backend| self.path(*backend).map(|path| (*backend, path)))
            .ok_or_else(|| ExtractionError::ToolNotFound {
                kind: if base_extension.is_empty() {
                    "unknown".to_string()
                } else {
                    base_extension.to_string()
                },
                tool: order
                    .iter()
                    .map(|backend| backend.binary_name())
                    .collect::<Vec<_>>()
                    .join(" or "),
                hint: ExtractorBackend::SevenZip.install_hint().to_string(),
            })
    }

    fn slot_mut(&mut self, backend: ExtractorBackend) -> &mut Option<PathBuf> {
        match backend {
            ExtractorBackend::SevenZip => &mut self.sevenzip,
            ExtractorBackend::Unzip => &mut self.unzip,
            ExtractorBackend::Unar => &mut self.unar,
            ExtractorBackend::Unrar => &mut self.unrar,
        }
    }
}

/// Backends eligible for a base extension, most preferred first
pub fn preference_order(base_extension: &str) -> &'static [ExtractorBackend] {
    match base_extension {
        ".zip" => &[ExtractorBackend::Unzip, ExtractorBackend::SevenZip],
        ".rar" => &[
            ExtractorBackend::Unar,
            ExtractorBackend::Unrar,
            ExtractorBackend::SevenZip,
        ],
        _ => &[ExtractorBackend::SevenZip],
    }
}
