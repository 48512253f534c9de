//! Core domain logic for selecting photos by capture metadata.
//!
//! This crate contains the fundamental types and logic for:
//! - Records: the attributes a photo carries and the `Capture` seam
//! - Targets: requested times, dates and datetimes with matching state
//! - Matching: per-criterion checks, including windows and first-after latches
//! - Selection: combining criteria and stopping a scan once targets run out
//! - Parsing: dates, times, datetimes and durations in common layouts

pub mod matching;
pub mod parse;
pub mod record;
pub mod selection;
pub mod targets;
pub mod types;

pub use matching::{TimeMode, Verdict};
pub use parse::{
    ValueParser, parse_date, parse_datetime, parse_duration, parse_duration_parts, parse_time,
};
pub use record::{Capture, Field, Record};
pub use selection::{Criteria, InputOrder, ScanStats, Selection, Selector};
pub use targets::{PendingTargets, TimeTarget, TimeTargets};
pub use types::{Exposure, ExposureRange, ValidationError};
