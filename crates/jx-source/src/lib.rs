//! Record sources for jexifs.
//!
//! Records come either from an index file, one record per line in a known
//! [`LineFormat`], or from the EXIF metadata of image files found under a
//! [`ScanRoot`].
//!
//! # Index Files
//!
//! The first line of an index may be a headline: the line format itself,
//! e.g. `path date time exposure_time`. Fields are separated by the first
//! run of non-word characters between the field names. Index files written
//! by `jexifs --headline` can be read back without further options.
//!
//! Values that do not parse are treated as absent and logged at debug
//! level; a malformed line never ends the scan.

mod image;
mod index;
mod layout;
mod walk;

use std::path::PathBuf;

use thiserror::Error;

pub use image::{read_image, read_images};
pub use index::{IndexReader, STDIN_PATH, open_index};
pub use layout::LineFormat;
pub use walk::{ScanRoot, discover};

/// Errors raised while locating or reading records.
#[derive(Debug, Error)]
pub enum SourceError {
    /// An I/O failure on a file, directory or stdin (`-`).
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A format string containing words that are not record fields.
    #[error("{format:?} is not a valid line format")]
    InvalidFormat { format: String },
    #[error("no index format specified and the index has no headline")]
    MissingIndexFormat,
    #[error("invalid scan pattern")]
    Pattern(#[from] glob::PatternError),
    #[error("invalid source {value:?}, expected PATH:EXT")]
    InvalidRoot { value: String },
}

impl SourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
