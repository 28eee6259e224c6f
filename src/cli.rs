//! Command line interface

use crate::config::{Config, OutputLayout};
use crate::error::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Command line arguments of the `media-unpack` binary
#[derive(Parser, Debug)]
#[command(name = "media-unpack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Recursively unpack archives and sort extracted media")]
#[command(
    long_about = "media-unpack extracts every archive found in the source folder, including \
                  archives nested inside other archives and split .001/.002 sets, moves media \
                  folders and loose files into the output folder, and deletes the archives it \
                  fully processed."
)]
#[command(after_help = "EXAMPLES:\n  \
    media-unpack\n  \
    media-unpack --root ~/Downloads --dated\n  \
    media-unpack --source incoming --output sorted --password secret -v\n  \
    media-unpack --config media-unpack.toml")]
pub struct Cli {
    /// Project root the source and output folders are resolved against
    /// (default: the directory holding the executable)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Source folder (default: "source")
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Output folder (default: "upload")
    #[arg(short, long, conflicts_with = "dated")]
    pub output: Option<PathBuf>,

    /// Write into a folder named after today's date (YYYYMMDD)
    #[arg(long)]
    pub dated: bool,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Password passed to the extraction tools
    #[arg(short, long)]
    pub password: Option<String>,

    /// Do not pass any password to the extraction tools
    #[arg(long, conflicts_with = "password")]
    pub no_password: bool,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Load the configuration file (or defaults) and apply command line overrides
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_toml_file(path)?,
            None => Config::default(),
        };

        if let Some(source) = &self.source {
            config.source_dir = source.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = Some(output.clone());
        }
        if self.dated {
            config.output_dir = None;
            config.output_layout = OutputLayout::Dated;
        }
        if let Some(password) = &self.password {
            config.extraction.password = Some(password.clone());
        }
        if self.no_password {
            config.extraction.password = None;
        }

        config.validate()?;
        Ok(config)
    }

    /// Root directory for relative source and output folders
    ///
    /// `--root` when given, otherwise the directory of the running
    /// executable. Falls back to the working directory when that cannot be
    /// determined.
    pub fn root_dir(&self) -> PathBuf {
        if let Some(root) = &self.root {
            return root.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Default log filter for the requested verbosity
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
