use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use glob::{MatchOptions, Pattern, glob_with};

use crate::SourceError;

/// A directory to scan and the file name suffix to look for, `PATH:EXT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRoot {
    pub path: PathBuf,
    pub extension: String,
}

impl Default for ScanRoot {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            extension: "JPG".to_string(),
        }
    }
}

impl FromStr for ScanRoot {
    type Err = SourceError;

    /// Splits at the last colon; an empty path means the current directory.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, extension) = s.rsplit_once(':').ok_or_else(|| SourceError::InvalidRoot {
            value: s.to_string(),
        })?;
        let path = if path.is_empty() { "." } else { path };
        Ok(Self {
            path: PathBuf::from(path),
            extension: extension.to_string(),
        })
    }
}

impl fmt::Display for ScanRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.extension)
    }
}

/// Finds every file below `root` whose name ends with its extension.
///
/// The match is case-sensitive. Paths are returned sorted.
pub fn discover(root: &ScanRoot) -> Result<Vec<PathBuf>, SourceError> {
    if !root.path.is_dir() {
        return Err(SourceError::io(
            &root.path,
            io::Error::new(io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let pattern = format!(
        "{}/**/*{}",
        Pattern::escape(&root.path.to_string_lossy()),
        Pattern::escape(&root.extension)
    );
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let mut paths = Vec::new();
    for entry in glob_with(&pattern, options)? {
        let path = match entry {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    tracing::debug!(root = %root, files = paths.len(), "discovered files");
    Ok(paths)
}
