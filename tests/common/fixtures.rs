//! Source-tree fixtures and a scripted extractor
//!
//! `ScriptedExtractor` stands in for the external tools: every archive name
//! maps to the files it "contains" or to a failure. Archives inside archives
//! are just files whose names carry an archive suffix.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use media_unpack::classify::{volume_index, volume_set_name};
use media_unpack::error::{ExtractionError, Result};
use media_unpack::extraction::{ExtractionJob, Extractor};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// What extracting a given archive name produces
#[derive(Clone, Debug)]
pub enum Script {
    /// Write these (relative path, content) pairs into the output directory
    Files(Vec<(String, Vec<u8>)>),
    /// Write some files, then fail like a tool that died half way
    PartialThenFail(Vec<(String, Vec<u8>)>, String),
    /// Fail without writing anything
    Fail(String),
}

/// In-memory extractor driven by archive file names
#[derive(Debug, Default)]
pub struct ScriptedExtractor {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<PathBuf>>,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// `archive_name` extracts to `files`
    pub fn archive(mut self, archive_name: &str, files: &[(&str, &[u8])]) -> Self {
        self.scripts
            .insert(archive_name.to_string(), Script::Files(owned(files)));
        self
    }

    /// `archive_name` writes `files` and then fails
    pub fn partial_failure(mut self, archive_name: &str, files: &[(&str, &[u8])]) -> Self {
        self.scripts.insert(
            archive_name.to_string(),
            Script::PartialThenFail(owned(files), "simulated crash".to_string()),
        );
        self
    }

    /// `archive_name` fails with `reason`
    pub fn failing(mut self, archive_name: &str, reason: &str) -> Self {
        self.scripts
            .insert(archive_name.to_string(), Script::Fail(reason.to_string()));
        self
    }

    /// Archives handed to the extractor, in call order
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }

    /// File names of the archives handed to the extractor
    pub fn called_names(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }
}

fn owned(files: &[(&str, &[u8])]) -> Vec<(String, Vec<u8>)> {
    files
        .iter()
        .map(|(name, content)| (name.to_string(), content.to_vec()))
        .collect()
}

fn write_all(dir: &Path, files: &[(String, Vec<u8>)]) {
    for (name, content) in files {
        let path = dir.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}

#[async_trait]
impl Extractor for ScriptedExtractor {
    async fn extract(&self, job: &ExtractionJob) -> Result<()> {
        let archive = job.archive.path.clone();
        self.calls.lock().unwrap().push(archive.clone());

        if !archive.is_file() {
            return Err(ExtractionError::MissingFile { archive }.into());
        }

        // like the real tools, a first volume needs its .002 next to it
        if volume_index(&archive) == Some(1) {
            let set = volume_set_name(&archive).unwrap();
            let second = archive.parent().unwrap().join(format!("{set}.002"));
            if !second.is_file() {
                return Err(ExtractionError::MissingFile { archive }.into());
            }
        }

        let name = archive.file_name().unwrap().to_string_lossy().into_owned();
        match self.scripts.get(&name) {
            Some(Script::Files(files)) => {
                std::fs::create_dir_all(&job.output_dir).unwrap();
                write_all(&job.output_dir, files);
                Ok(())
            }
            Some(Script::PartialThenFail(files, reason)) => {
                std::fs::create_dir_all(&job.output_dir).unwrap();
                write_all(&job.output_dir, files);
                Err(ExtractionError::Failed {
                    archive,
                    tool: "scripted".to_string(),
                    reason: reason.clone(),
                }
                .into())
            }
            Some(Script::Fail(reason)) => Err(ExtractionError::CorruptArchive {
                archive,
                reason: reason.clone(),
            }
            .into()),
            None => Err(ExtractionError::Failed {
                archive,
                tool: "scripted".to_string(),
                reason: format!("no script for {name}"),
            }
            .into()),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Temporary project root with `source/` and `upload/` folders
pub struct Workspace {
    pub temp: TempDir,
    pub source: PathBuf,
    pub upload: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        let upload = temp.path().join("upload");
        std::fs::create_dir_all(&source).unwrap();
        Self {
            temp,
            source,
            upload,
        }
    }

    /// Write a file below `source/` (parents created)
    pub fn source_file(&self, relative: &str, content: &[u8]) -> PathBuf {
        write_file(&self.source.join(relative), content)
    }

    /// Write a file below `upload/` (parents created)
    pub fn upload_file(&self, relative: &str, content: &[u8]) -> PathBuf {
        write_file(&self.upload.join(relative), content)
    }
}

pub fn write_file(path: &Path, content: &[u8]) -> PathBuf {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
    path.to_path_buf()
}
