//! The closed set of external extraction tools and their command lines

use std::ffi::OsString;
use std::fmt;
use std::path::Path;

/// External binary used to extract an archive
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExtractorBackend {
    /// Generic archiver (`7z`), handles every supported format
    SevenZip,
    /// Info-ZIP `unzip`
    Unzip,
    /// The Unarchiver command line tool (`unar`), preferred for RAR
    Unar,
    /// RARLAB `unrar`
    Unrar,
}

impl ExtractorBackend {
    /// Every backend, in discovery order
    pub const ALL: [Self; 4] = [Self::SevenZip, Self::Unzip, Self::Unar, Self::Unrar];

    /// Executable name looked up on PATH
    pub fn binary_name(self) -> &'static str {
        match self {
            Self::SevenZip => "7z",
            Self::Unzip => "unzip",
            Self::Unar => "unar",
            Self::Unrar => "unrar",
        }
    }

    /// Install suggestion shown when the tool is missing
    pub fn install_hint(self) -> &'static str {
        match self {
            Self::SevenZip => "brew install p7zip",
            Self::Unzip => "brew install unzip",
            Self::Unar => "brew install unar",
            Self::Unrar => "brew install rar",
        }
    }

    /// Whether this is the generic archiver (the only backend with a disk-space pre-check)
    pub fn is_generic(self) -> bool {
        matches!(self, Self::SevenZip)
    }

    /// Command line arguments for extracting `archive` into `output_dir`
    ///
    /// An empty password is treated as no password.
    pub fn args(self, archive: &Path, output_dir: &Path, password: Option<&str>) -> Vec<OsString> {
        let password = password.filter(|p| !p.is_empty());
        let mut args: Vec<OsString> = Vec::new();

        match self {
            // 7z x <archive> -o<dir> -y [-p<password>]
            Self::SevenZip => {
                args.push("x".into());
                args.push(archive.into());
                args.push(prefixed("-o", output_dir.as_os_str()));
                args.push("-y".into());
                if let Some(pw) = password {
                    args.push(format!("-p{pw}").into());
                }
            }
            // unzip -o <archive> -d <dir> [-P<password>]
            Self::Unzip => {
                args.push("-o".into());
                args.push(archive.into());
                args.push("-d".into());
                args.push(output_dir.into());
                if let Some(pw) = password {
                    args.push(format!("-P{pw}").into());
                }
            }
            // unar -o <dir> [-password <password>] <archive>
            Self::Unar => {
                args.push("-o".into());
                args.push(output_dir.into());
                if let Some(pw) = password {
                    args.push("-password".into());
                    args.push(pw.into());
                }
                args.push(archive.into());
            }
            // unrar x -y [-p<password>] <archive> <dir>/
            Self::Unrar => {
                args.push("x".into());
                args.push("-y".into());
                if let Some(pw) = password {
                    args.push(format!("-p{pw}").into());
                }
                args.push(archive.into());
                let mut dir = output_dir.as_os_str().to_owned();
                dir.push(std::path::MAIN_SEPARATOR_STR);
                args.push(dir);
            }
        }

        args
    }

    /// Lowercase output markers meaning "extracted despite a non-zero exit code"
    pub fn success_markers(self) -> &'static [&'static str] {
        match self {
            Self::SevenZip => &["everything is ok"],
            Self::Unzip => &["inflating", "extracting"],
            Self::Unar => &["successfully extracted"],
            Self::Unrar => &["all ok"],
        }
    }

    /// Whether the exit code alone means success
    ///
    /// `unrar` exits with 1 for warnings after a complete extraction.
    pub fn accepts_exit_code(self, code: Option<i32>) -> bool {
        match (self, code) {
            (_, Some(0)) => true,
            (Self::Unrar, Some(1)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ExtractorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary_name())
    }
}

fn prefixed(prefix: &str, value: &std::ffi::OsStr) -> OsString {
    let mut arg = OsString::from(prefix);
    arg.push(value);
    arg
}
