use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use jx_core::{Field, Record, ValueParser};

use crate::SourceError;
use crate::layout::LineFormat;

/// Index path meaning "read standard input".
pub const STDIN_PATH: &str = "-";

/// Buffer size for index files (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Lazily reads records from an index, one per line.
pub struct IndexReader<R> {
    reader: R,
    buffer: Vec<u8>,
    format: LineFormat,
    headline: bool,
    /// A first line that turned out to be data.
    first: Option<String>,
    parser: ValueParser,
    source: PathBuf,
    line_number: usize,
}

impl<R: BufRead> IndexReader<R> {
    /// Starts reading `reader`, detecting a headline on the first line.
    ///
    /// A headline takes precedence over `fallback`, which is required when
    /// the index has none.
    pub fn new(
        mut reader: R,
        source: impl Into<PathBuf>,
        fallback: Option<&LineFormat>,
    ) -> Result<Self, SourceError> {
        let source = source.into();
        let mut buffer = Vec::new();
        let first = read_line(&mut reader, &mut buffer, &source, 1)
            .map_err(|e| SourceError::io(&source, e))?;

        let headline = first
            .as_deref()
            .and_then(|line| line.trim_end_matches('\r').parse::<LineFormat>().ok());

        let (format, headline, first) = match (headline, fallback) {
            (Some(format), _) => (format, true, None),
            (None, Some(format)) => (format.clone(), false, first),
            (None, None) => return Err(SourceError::MissingIndexFormat),
        };
        tracing::debug!(
            source = %source.display(),
            format = %format,
            headline,
            "reading index"
        );

        Ok(Self {
            reader,
            buffer,
            format,
            headline,
            first,
            parser: ValueParser::new(),
            source,
            line_number: 1,
        })
    }

    pub const fn format(&self) -> &LineFormat {
        &self.format
    }

    /// Whether the format came from the index's own first line.
    pub const fn has_headline(&self) -> bool {
        self.headline
    }

    fn parse_line(&mut self, line: &str) -> Record {
        let mut record = Record::default();
        for (field, value) in self.format.split(line) {
            let value = value.trim();
            if value.is_empty() || value == "-" {
                continue;
            }
            let parsed = match field {
                Field::Path => {
                    record.path = Some(value.to_string());
                    Ok(())
                }
                Field::Name => {
                    record.name = Some(value.to_string());
                    Ok(())
                }
                Field::Model => {
                    record.model = Some(value.to_string());
                    Ok(())
                }
                Field::Date => self.parser.date(value).map(|v| record.date = Some(v)),
                Field::Time => self.parser.time(value).map(|v| record.time = Some(v)),
                Field::Datetime => self.parser.datetime(value).map(|v| record.datetime = Some(v)),
                Field::ExposureTime => value.parse().map(|v| record.exposure_time = Some(v)),
            };
            if let Err(e) = parsed {
                tracing::debug!(
                    source = %self.source.display(),
                    line = self.line_number,
                    %field,
                    error = %e,
                    "treating unparseable value as absent"
                );
            }
        }
        record.normalized()
    }
}

impl<R: BufRead> Iterator for IndexReader<R> {
    type Item = Result<Record, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.first.take() {
                Some(line) => line,
                None => {
                    self.line_number += 1;
                    let line = read_line(
                        &mut self.reader,
                        &mut self.buffer,
                        &self.source,
                        self.line_number,
                    );
                    match line {
                        Ok(Some(line)) => line,
                        Ok(None) => return None,
                        Err(e) => return Some(Err(SourceError::io(&self.source, e))),
                    }
                }
            };
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            return Some(Ok(self.parse_line(line)));
        }
    }
}

/// Reads one line without its newline. Bytes that are not UTF-8 are
/// replaced, so a line from a foreign encoding still yields a record.
fn read_line<R: BufRead>(
    reader: &mut R,
    buffer: &mut Vec<u8>,
    source: &Path,
    line_number: usize,
) -> io::Result<Option<String>> {
    buffer.clear();
    if reader.read_until(b'\n', buffer)? == 0 {
        return Ok(None);
    }
    if buffer.last() == Some(&b'\n') {
        buffer.pop();
    }
    let line = match String::from_utf8_lossy(buffer) {
        Cow::Borrowed(line) => line.to_string(),
        Cow::Owned(line) => {
            tracing::debug!(
                source = %source.display(),
                line = line_number,
                "replacing invalid UTF-8"
            );
            line
        }
    };
    Ok(Some(line))
}

/// Opens an index file, or standard input for [`STDIN_PATH`].
pub fn open_index(
    path: &Path,
    fallback: Option<&LineFormat>,
) -> Result<IndexReader<Box<dyn BufRead>>, SourceError> {
    let reader: Box<dyn BufRead> = if path == Path::new(STDIN_PATH) {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(path).map_err(|e| SourceError::io(path, e))?;
        Box::new(BufReader::with_capacity(BUFFER_SIZE, file))
    };
    IndexReader::new(reader, path, fallback)
}
