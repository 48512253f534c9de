//! Rendering selected records.

use std::io::{self, Write};
use std::sync::LazyLock;

use jx_core::{Field, Record};
use regex::Regex;

/// Output format used when nothing else is configured.
pub const DEFAULT_FORMAT: &str = "path date time exposure_time";

/// Printed for attributes a record does not have.
const ABSENT: &str = "-";

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Text(String),
    Value(Field),
}

/// An output line format. Whole words naming a field are replaced by the
/// record's value; everything else is printed as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
    parts: Vec<Part>,
}

impl Template {
    pub fn new(text: &str) -> Self {
        let mut parts = Vec::new();
        let mut literal_start = 0;
        for word in WORD_RE.find_iter(text) {
            let Ok(field) = word.as_str().parse::<Field>() else {
                continue;
            };
            if literal_start < word.start() {
                parts.push(Part::Text(text[literal_start..word.start()].to_string()));
            }
            parts.push(Part::Value(field));
            literal_start = word.end();
        }
        if literal_start < text.len() {
            parts.push(Part::Text(text[literal_start..].to_string()));
        }
        Self {
            text: text.to_string(),
            parts,
        }
    }

    /// The format as written, used as headline.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn render(&self, record: &Record) -> String {
        let mut line = String::new();
        for part in &self.parts {
            match part {
                Part::Text(text) => line.push_str(text),
                Part::Value(field) => {
                    line.push_str(field_value(record, *field).as_deref().unwrap_or(ABSENT));
                }
            }
        }
        line
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::new(DEFAULT_FORMAT)
    }
}

/// Formats one attribute of `record` for output.
pub fn field_value(record: &Record, field: Field) -> Option<String> {
    match field {
        Field::Path => record.path.clone(),
        Field::Name => record.name.clone(),
        Field::Date => record.date.map(|d| d.format("%Y-%m-%d").to_string()),
        Field::Time => record.time.map(|t| t.to_string()),
        Field::Datetime => record.datetime.map(|dt| dt.to_string()),
        Field::ExposureTime => record.exposure_time.map(|e| e.to_string()),
        Field::Model => record.model.clone(),
    }
}

/// How selected records are written.
#[derive(Debug, Clone)]
pub enum Output {
    Lines(Template),
    Json,
}

impl Output {
    pub fn write_headline<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            Self::Lines(template) => writeln!(writer, "{}", template.as_str()),
            Self::Json => Ok(()),
        }
    }

    pub fn write_record<W: Write>(&self, writer: &mut W, record: &Record) -> io::Result<()> {
        match self {
            Self::Lines(template) => writeln!(writer, "{}", template.render(record)),
            Self::Json => {
                serde_json::to_writer(&mut *writer, record)?;
                writeln!(writer)
            }
        }
    }
}
