//! Interpretation of extraction tool output

use super::backend::ExtractorBackend;
use crate::error::ExtractionError;
use std::path::Path;

/// Maximum number of output lines kept in an unclassified failure
const MAX_REASON_LINES: usize = 10;

const PASSWORD_MARKERS: &[&str] = &[
    "wrong password",
    "incorrect password",
    "password is incorrect",
    "password required",
    "requires a password",
    "enter password",
    "bad password",
    "can not open encrypted archive",
];

const SPACE_MARKERS: &[&str] = &[
    "no space left",
    "disk full",
    "not enough space",
    "not enough disk space",
];

const CORRUPT_MARKERS: &[&str] = &[
    "crc failed",
    "crc error",
    "checksum error",
    "data error",
    "corrupt",
    "unexpected end of",
    "can not open the file as archive",
    "cannot open the file as archive",
    "is not archive",
    "not a zip file",
    "end-of-central-directory signature not found",
    "headers error",
    "damaged",
];

const MISSING_MARKERS: &[&str] = &[
    "no such file",
    "cannot find",
    "can't find",
    "missing volume",
    "cannot open volume",
    "could not open",
];

/// Captured result of one tool invocation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Process exit code (`None` when terminated by a signal)
    pub exit_code: Option<i32>,
    /// Captured stdout, lossily decoded
    pub stdout: String,
    /// Captured stderr, lossily decoded
    pub stderr: String,
}

impl ToolOutput {
    /// Build from a finished process
    pub fn from_output(output: &std::process::Output) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    /// stdout followed by stderr
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Whether the invocation counts as a successful extraction
    ///
    /// An accepted exit code always wins; otherwise the tool's success
    /// markers are looked for in the combined output.
    pub fn is_success(&self, backend: ExtractorBackend) -> bool {
        if backend.accepts_exit_code(self.exit_code) {
            return true;
        }
        let text = self.combined().to_lowercase();
        backend
            .success_markers()
            .iter()
            .any(|marker| text.contains(marker))
    }
}

/// Map failed tool output to a specific error kind
///
/// Checked in order: password, disk space, corruption, missing volume. Output
/// that matches none of them becomes [`ExtractionError::Failed`] carrying the
/// tail of the output.
pub fn classify_failure(
    backend: ExtractorBackend,
    archive: &Path,
    output: &ToolOutput,
) -> ExtractionError {
    let combined = output.combined();
    let lower = combined.to_lowercase();
    let archive = archive.to_path_buf();

    if contains_any(&lower, PASSWORD_MARKERS) {
        return ExtractionError::WrongPassword { archive };
    }
    if contains_any(&lower, SPACE_MARKERS) {
        return ExtractionError::InsufficientSpace { archive };
    }
    if contains_any(&lower, CORRUPT_MARKERS) {
        let reason = combined
            .lines()
            .find(|line| contains_any(&line.to_lowercase(), CORRUPT_MARKERS))
            .unwrap_or_default()
            .trim()
            .to_string();
        return ExtractionError::CorruptArchive { archive, reason };
    }
    if contains_any(&lower, MISSING_MARKERS) {
        return ExtractionError::MissingFile { archive };
    }

    ExtractionError::Failed {
        archive,
        tool: backend.binary_name().to_string(),
        reason: failure_reason(output),
    }
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| text.contains(marker))
}

fn failure_reason(output: &ToolOutput) -> String {
    let source = if output.stderr.trim().is_empty() {
        &output.stdout
    } else {
        &output.stderr
    };
    let lines: Vec<&str> = source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let tail = lines[lines.len().saturating_sub(MAX_REASON_LINES)..].join("; ");

    match (tail.is_empty(), output.exit_code) {
        (false, _) => tail,
        (true, Some(code)) => format!("exit code {code}"),
        (true, None) => "terminated by signal".to_string(),
    }
}
