use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use jx_core::Field;
use regex::Regex;

use crate::SourceError;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").unwrap());

/// Field layout of an index line, e.g. `path;date;time`.
///
/// The separator is the first run of non-word characters after the first
/// field name, or a single space when there is only one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFormat {
    text: String,
    fields: Vec<Field>,
    separator: String,
}

impl LineFormat {
    /// The format as originally written.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Pairs each field with its column in `line`.
    ///
    /// The last field takes the rest of the line, so it may contain the
    /// separator. Missing trailing columns are simply not yielded.
    pub fn split<'a>(&'a self, line: &'a str) -> impl Iterator<Item = (Field, &'a str)> {
        self.fields
            .iter()
            .copied()
            .zip(line.splitn(self.fields.len(), self.separator.as_str()))
    }
}

impl FromStr for LineFormat {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SourceError::InvalidFormat {
            format: s.to_string(),
        };

        let words: Vec<_> = WORD_RE.find_iter(s).collect();
        let Some(first) = words.first() else {
            return Err(invalid());
        };
        let fields = words
            .iter()
            .map(|word| word.as_str().parse::<Field>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;

        let separator = if fields.len() == 1 {
            " ".to_string()
        } else {
            SEPARATOR_RE
                .find_at(s, first.end())
                .map_or(" ", |m| m.as_str())
                .to_string()
        };

        Ok(Self {
            text: s.to_string(),
            fields,
            separator,
        })
    }
}

impl fmt::Display for LineFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
