//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use jx_core::{Exposure, Field, InputOrder};

/// Select photos by the date, time, exposure time and model they were taken
/// with.
///
/// Records are read from the EXIF data of image files below PATH whose names
/// end with EXT, or from an index file. Selected records are printed one per
/// line.
#[derive(Debug, Parser)]
#[command(name = "jexifs", version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan and file name suffix, e.g. `photos:JPG` [default: .:JPG].
    #[arg(value_name = "PATH:EXT")]
    pub source: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Read records from an index file instead of images (`-` or no value: stdin).
    #[arg(
        short,
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = "-"
    )]
    pub index: Option<PathBuf>,

    /// Format of an index without a headline, e.g. `name;date;time`.
    #[arg(short = 'F', long, value_name = "FORMAT")]
    pub index_format: Option<String>,

    /// Output line format; field names are replaced by their values.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Print the output format as first line.
    #[arg(short = 'H', long)]
    pub headline: bool,

    /// Print selected records as JSON lines.
    #[arg(long, conflicts_with = "headline")]
    pub json: bool,

    /// Sort records by a field before selecting.
    #[arg(short, long, value_name = "FIELD")]
    pub sort: Option<Field>,

    /// Declare that the index is already sorted by date or datetime.
    #[arg(long, value_enum, value_name = "ORDER", conflicts_with = "sort")]
    pub presorted: Option<Presorted>,

    /// Select records taken on any of these dates.
    #[arg(short, long, value_name = "DATE", num_args = 1..)]
    pub dates: Vec<String>,

    /// Select records taken at any of these times of day.
    #[arg(short, long, value_name = "TIME", num_args = 1..)]
    pub times: Vec<String>,

    /// Select records taken at any of these moments.
    #[arg(short = 'D', long, value_name = "DATETIME", num_args = 1..)]
    pub datetimes: Vec<String>,

    /// Select by exposure time: one value exactly, or two as `[LOW, HIGH)`.
    #[arg(short, long, value_name = "SECONDS", num_args = 1..=2)]
    pub exposure_time: Vec<Exposure>,

    /// Select records taken with this camera model.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Widen times and datetimes into periods: HOURS [MINUTES [SECONDS]] or
    /// units like `1h30m`.
    #[arg(short, long, value_name = "DURATION", num_args = 1..=3)]
    pub plus: Vec<String>,

    /// Select only the first record after each time or datetime.
    #[arg(short = 'a', long)]
    pub first_after: bool,
}

/// Delivery orders an index can be declared to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Presorted {
    Date,
    Datetime,
}

impl From<Presorted> for InputOrder {
    fn from(order: Presorted) -> Self {
        match order {
            Presorted::Date => Self::ByDate,
            Presorted::Datetime => Self::ByDatetime,
        }
    }
}
