//! # media-unpack
//!
//! Recursively unpack nested archives and sort the extracted media.
//!
//! ## Overview
//!
//! media-unpack scans a source folder for archives (7z, zip, rar, tar and its
//! compressed variants, including split `.001`/`.002` sets), extracts each one
//! with an installed command line tool, resolves archives nested inside the
//! extracted output, and moves the results into an output folder:
//! - folders containing images or videos are moved whole
//! - everything else is moved entry by entry
//! - nothing in the output folder is ever overwritten
//!
//! Fully processed archives are deleted; failed ones are kept for a retry.
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_unpack::{CliExtractor, Config, ToolSet, Unpacker};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let tools = ToolSet::discover(&config.tools);
//!     let extractor = Arc::new(CliExtractor::from_config(tools, &config.extraction));
//!
//!     let summary = Unpacker::new(config.extraction, extractor)
//!         .run(Path::new("source"), Path::new("upload"))
//!         .await?;
//!
//!     for (archive, reason) in &summary.failures {
//!         println!("kept {}: {}", archive.display(), reason);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Archive, volume and media detection
pub mod classify;
/// Command line interface
pub mod cli;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Archive extraction through external tools
pub mod extraction;
/// Recursive unpacking pipeline
pub mod pipeline;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use cli::Cli;
pub use config::{Config, ExtractionConfig, OutputLayout, ToolsConfig};
pub use error::{Error, ExtractionError, Result};
pub use extraction::{CliExtractor, ExtractionJob, Extractor, ExtractorBackend, ToolSet};
pub use pipeline::Unpacker;
pub use types::{ArchiveEntry, ArchiveType, RunStats, RunSummary, Stage};
