use crate::classify::archive_entry;
use crate::config::ExtractionConfig;
use crate::error::{Error, ExtractionError};
use crate::extraction::*;
use serial_test::serial;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Write an executable shell script standing in for an extraction tool
///
/// `ARGS_FILE` in `body` is replaced with `args_file`, where the script can
/// record the arguments it was called with.
#[cfg(unix)]
fn fake_tool(dir: &Path, name: &str, body: &str, args_file: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    let script = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\n{}\n",
        args_file.display(),
        body
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Fake 7z: writes photo.jpg into the `-o<dir>` argument
const SEVENZIP_OK: &str = r#"for arg in "$@"; do
  case "$arg" in -o*) out="${arg#-o}" ;; esac
done
mkdir -p "$out"
printf 'jpg' > "$out/photo.jpg"
echo 'Everything is Ok'"#;

/// Fake unzip: writes photo.jpg into `-d <dir>`, then exits 1 like a warning run
const UNZIP_WARNING: &str = r#"mkdir -p "$4"
printf 'jpg' > "$4/photo.jpg"
echo "  inflating: $4/photo.jpg"
echo 'warning: a/photo.jpg appears to use backslashes as path separators' >&2
exit 1"#;

/// Fake unar: writes clip.mp4 into `-o <dir>`
const UNAR_OK: &str = r#"mkdir -p "$2"
printf 'mp4' > "$2/clip.mp4"
echo 'Successfully extracted to "out".'"#;

const SEVENZIP_WRONG_PASSWORD: &str = r#"echo 'Extracting archive: a.7z'
echo 'ERROR: Wrong password : photo.jpg' >&2
exit 2"#;

fn write_archive(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"archive-bytes").unwrap();
    path
}

fn job(archive: &Path, output_dir: PathBuf, password: Option<&str>) -> ExtractionJob {
    ExtractionJob {
        archive: archive_entry(archive, &ExtractionConfig::default()).unwrap(),
        output_dir,
        password: password.map(str::to_string),
    }
}

fn recorded_args(args_file: &Path) -> Vec<String> {
    std::fs::read_to_string(args_file)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Pre-flight checks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_archive_is_reported_before_tool_selection() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("gone.7z");
    let extractor = CliExtractor::new(ToolSet::empty());

    let job = ExtractionJob {
        archive: crate::types::ArchiveEntry {
            path: archive.clone(),
            archive_type: None,
            volume: 1,
            size: 10,
        },
        output_dir: temp_dir.path().join("gone_extracted"),
        password: None,
    };
    let result = extractor.extract(&job).await;
    assert!(
        matches!(
            result,
            Err(Error::Extraction(ExtractionError::MissingFile { .. }))
        ),
        "got {result:?}"
    );
    assert!(!temp_dir.path().join("gone_extracted").exists());
}

#[tokio::test]
async fn empty_archive_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("empty.zip");
    std::fs::write(&archive, b"").unwrap();
    let extractor = CliExtractor::new(ToolSet::empty());

    let result = extractor
        .extract(&job(&archive, temp_dir.path().join("empty_extracted"), None))
        .await;
    assert!(
        matches!(
            result,
            Err(Error::Extraction(ExtractionError::EmptyFile { .. }))
        ),
        "got {result:?}"
    );
}

#[tokio::test]
async fn no_eligible_tool_names_the_tool() {
    let temp_dir = TempDir::new().unwrap();
    let archive = write_archive(temp_dir.path(), "photos.7z");
    let tools = ToolSet::empty().with(ExtractorBackend::Unzip, PathBuf::from("/bin/unzip"));
    let extractor = CliExtractor::new(tools);

    let err = extractor
        .extract(&job(&archive, temp_dir.path().join("photos_extracted"), None))
        .await
        .unwrap_err();
    match &err {
        Error::Extraction(ExtractionError::ToolNotFound { tool, hint, .. }) => {
            assert_eq!(tool, "7z");
            assert_eq!(hint, "brew install p7zip");
        }
        other => panic!("expected ToolNotFound, got {other:?}"),
    }
    assert!(err.suggestion().contains("brew install p7zip"));
}

// ---------------------------------------------------------------------------
// Tool invocation
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn sevenzip_extracts_into_output_dir_with_password() {
    let temp_dir = TempDir::new().unwrap();
    let bin = TempDir::new().unwrap();
    let args_file = bin.path().join("args.txt");
    let sevenzip = fake_tool(bin.path(), "7z", SEVENZIP_OK, &args_file);

    let archive = write_archive(temp_dir.path(), "photos.7z");
    let output_dir = temp_dir.path().join("photos_extracted");
    let extractor =
        CliExtractor::new(ToolSet::empty().with(ExtractorBackend::SevenZip, sevenzip));

    extractor
        .extract(&job(&archive, output_dir.clone(), Some("cosergirl.com")))
        .await
        .unwrap();

    assert_eq!(std::fs::read(output_dir.join("photo.jpg")).unwrap(), b"jpg");
    assert!(archive.exists(), "extractor must not delete the archive");
    assert_eq!(
        recorded_args(&args_file),
        vec![
            "x".to_string(),
            archive.display().to_string(),
            format!("-o{}", output_dir.display()),
            "-y".to_string(),
            "-pcosergirl.com".to_string(),
        ]
    );
}

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn split_set_passes_only_the_first_volume() {
    let temp_dir = TempDir::new().unwrap();
    let bin = TempDir::new().unwrap();
    let args_file = bin.path().join("args.txt");
    let sevenzip = fake_tool(bin.path(), "7z", SEVENZIP_OK, &args_file);

    let first = write_archive(temp_dir.path(), "set.7z.001");
    write_archive(temp_dir.path(), "set.7z.002");
    let extractor =
        CliExtractor::new(ToolSet::empty().with(ExtractorBackend::SevenZip, sevenzip));

    extractor
        .extract(&job(&first, temp_dir.path().join("set_extracted"), None))
        .await
        .unwrap();

    let args = recorded_args(&args_file);
    assert!(args.contains(&first.display().to_string()));
    assert!(!args.iter().any(|a| a.ends_with(".002")));
    assert!(!args.iter().any(|a| a.starts_with("-p")));
}

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn unzip_warning_exit_with_inflating_output_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let bin = TempDir::new().unwrap();
    let args_file = bin.path().join("args.txt");
    let unzip = fake_tool(bin.path(), "unzip", UNZIP_WARNING, &args_file);
    let sevenzip = fake_tool(bin.path(), "7z", "exit 99", &bin.path().join("7z-args.txt"));

    let archive = write_archive(temp_dir.path(), "album.zip");
    let output_dir = temp_dir.path().join("album_extracted");
    let tools = ToolSet::empty()
        .with(ExtractorBackend::Unzip, unzip)
        .with(ExtractorBackend::SevenZip, sevenzip);

    CliExtractor::new(tools)
        .extract(&job(&archive, output_dir.clone(), Some("pw")))
        .await
        .unwrap();

    assert!(output_dir.join("photo.jpg").exists());
    assert_eq!(recorded_args(&args_file)[4], "-Ppw");
    assert!(!bin.path().join("7z-args.txt").exists(), "7z must not run for zip");
}

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn rar_prefers_unar() {
    let temp_dir = TempDir::new().unwrap();
    let bin = TempDir::new().unwrap();
    let args_file = bin.path().join("args.txt");
    let unar = fake_tool(bin.path(), "unar", UNAR_OK, &args_file);
    let unrar = fake_tool(bin.path(), "unrar", "exit 99", &bin.path().join("unrar-args.txt"));

    let archive = write_archive(temp_dir.path(), "clips.rar");
    let output_dir = temp_dir.path().join("clips_extracted");
    let tools = ToolSet::empty()
        .with(ExtractorBackend::Unar, unar)
        .with(ExtractorBackend::Unrar, unrar);

    CliExtractor::new(tools)
        .extract(&job(&archive, output_dir.clone(), Some("pw")))
        .await
        .unwrap();

    assert!(output_dir.join("clip.mp4").exists());
    assert_eq!(
        recorded_args(&args_file),
        vec![
            "-o".to_string(),
            output_dir.display().to_string(),
            "-password".to_string(),
            "pw".to_string(),
            archive.display().to_string(),
        ]
    );
    assert!(!bin.path().join("unrar-args.txt").exists());
}

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn wrong_password_is_classified_and_archive_kept() {
    let temp_dir = TempDir::new().unwrap();
    let bin = TempDir::new().unwrap();
    let sevenzip = fake_tool(
        bin.path(),
        "7z",
        SEVENZIP_WRONG_PASSWORD,
        &bin.path().join("args.txt"),
    );

    let archive = write_archive(temp_dir.path(), "locked.7z");
    let result = CliExtractor::new(ToolSet::empty().with(ExtractorBackend::SevenZip, sevenzip))
        .extract(&job(&archive, temp_dir.path().join("locked_extracted"), Some("nope")))
        .await;

    assert!(
        matches!(
            result,
            Err(Error::Extraction(ExtractionError::WrongPassword { .. }))
        ),
        "got {result:?}"
    );
    assert!(archive.exists());
}

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn insufficient_disk_space_fails_before_running_7z() {
    let temp_dir = TempDir::new().unwrap();
    let bin = TempDir::new().unwrap();
    let args_file = bin.path().join("args.txt");
    let sevenzip = fake_tool(bin.path(), "7z", SEVENZIP_OK, &args_file);

    let archive = write_archive(temp_dir.path(), "huge.7z");
    let output_dir = temp_dir.path().join("huge_extracted");
    let config = ExtractionConfig {
        space_factor: 1e18,
        ..ExtractionConfig::default()
    };
    let extractor = CliExtractor::from_config(
        ToolSet::empty().with(ExtractorBackend::SevenZip, sevenzip),
        &config,
    );

    let result = extractor.extract(&job(&archive, output_dir.clone(), None)).await;

    assert!(
        matches!(
            result,
            Err(Error::Extraction(ExtractionError::DiskSpace { .. }))
        ),
        "got {result:?}"
    );
    assert!(!args_file.exists(), "7z must not be spawned");
    assert!(!output_dir.exists());
    assert!(archive.exists());
}

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn non_executable_tool_is_external_tool_error() {
    let temp_dir = TempDir::new().unwrap();
    let not_executable = temp_dir.path().join("7z");
    std::fs::write(&not_executable, b"not a program").unwrap();

    let archive = write_archive(temp_dir.path(), "photos.7z");
    let result = CliExtractor::new(
        ToolSet::empty().with(ExtractorBackend::SevenZip, not_executable),
    )
    .extract(&job(&archive, temp_dir.path().join("photos_extracted"), None))
    .await;

    assert!(matches!(result, Err(Error::ExternalTool(_))), "got {result:?}");
}

// Integration test with a real tool
// Run with: cargo test --lib extraction -- --ignored

#[tokio::test]
#[ignore] // Requires unzip binary in PATH
async fn integration_real_unzip_extracts_zip() {
    use std::io::Write;

    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("real.zip");
    let file = std::fs::File::create(&archive).unwrap();
    let mut writer = ::zip::ZipWriter::new(file);
    writer
        .start_file("album/photo.jpg", ::zip::write::FileOptions::default())
        .unwrap();
    writer.write_all(b"jpeg bytes").unwrap();
    writer.finish().unwrap();

    let tools = ToolSet::discover(&crate::config::ToolsConfig::default());
    let output_dir = temp_dir.path().join("real_extracted");
    CliExtractor::new(tools)
        .extract(&job(&archive, output_dir.clone(), None))
        .await
        .unwrap();

    assert_eq!(
        std::fs::read(output_dir.join("album/photo.jpg")).unwrap(),
        b"jpeg bytes"
    );
}
