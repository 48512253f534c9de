//! The selection scan: read records, filter them, print the survivors.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use jx_core::{
    Criteria, ExposureRange, Field, InputOrder, Record, ScanStats, Selector, ValueParser,
    parse_duration_parts,
};
use jx_source::{LineFormat, ScanRoot, SourceError, discover, open_index, read_image, read_images};

use crate::output::{DEFAULT_FORMAT, Output, Template};
use crate::{Cli, Config};

type Records = Box<dyn Iterator<Item = Result<Record, SourceError>>>;

pub fn run<W: Write>(writer: &mut W, cli: &Cli, config: &Config) -> Result<ScanStats> {
    let order = input_order(cli);
    let criteria = criteria(cli, order)?;
    for warning in ineffective(&criteria) {
        tracing::warn!("{warning}");
    }

    let (records, source_format) = if let Some(index) = &cli.index {
        open_records(index, cli, config)?
    } else {
        (scan_records(cli, config)?, None)
    };

    let records: Records = match cli.sort {
        Some(field) => {
            let mut records = records
                .collect::<Result<Vec<_>, _>>()
                .context("failed to read records")?;
            records.sort_by(|a, b| a.cmp_by(b, field));
            Box::new(records.into_iter().map(Ok))
        }
        None => records,
    };

    let output = if cli.json {
        Output::Json
    } else {
        let format = cli
            .format
            .as_deref()
            .or(source_format.as_deref())
            .or(config.format.as_deref())
            .unwrap_or(DEFAULT_FORMAT);
        Output::Lines(Template::new(format))
    };

    if cli.headline && !quietly(output.write_headline(writer))? {
        return Ok(ScanStats::default());
    }

    // A failing source ends the selection; the error is reported after it.
    let mut failure = None;
    let records = records.map_while(|record| record.map_err(|e| failure = Some(e)).ok());
    let mut selection = Selector::new(&criteria).select(records);
    while let Some(record) = selection.next() {
        if !quietly(output.write_record(writer, &record))? {
            return Ok(selection.stats());
        }
    }
    let stats = selection.stats();
    drop(selection);
    if let Some(e) = failure {
        return Err(e).context("failed to read record");
    }

    quietly(writer.flush())?;
    Ok(stats)
}

/// Treats a closed output (e.g. piped into `head`) as the end of the scan.
fn quietly(result: io::Result<()>) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!("output closed");
            Ok(false)
        }
        Err(e) => Err(e).context("failed to write output"),
    }
}

/// The order records will be delivered in, as far as it is known.
fn input_order(cli: &Cli) -> InputOrder {
    match (cli.sort, cli.presorted) {
        (Some(Field::Date), _) => InputOrder::ByDate,
        (Some(Field::Datetime), _) => InputOrder::ByDatetime,
        (None, Some(presorted)) => presorted.into(),
        _ => InputOrder::Unordered,
    }
}

fn criteria(cli: &Cli, order: InputOrder) -> Result<Criteria> {
    let mut parser = ValueParser::new();

    let dates = cli
        .dates
        .iter()
        .map(|value| parser.date(value))
        .collect::<Result<Vec<_>, _>>()
        .context("invalid --dates")?;
    let times = cli
        .times
        .iter()
        .map(|value| parser.time(value))
        .collect::<Result<Vec<_>, _>>()
        .context("invalid --times")?;
    let datetimes = cli
        .datetimes
        .iter()
        .map(|value| parser.datetime(value))
        .collect::<Result<Vec<_>, _>>()
        .context("invalid --datetimes")?;

    let exposure = if cli.exposure_time.is_empty() {
        None
    } else {
        Some(ExposureRange::from_bounds(&cli.exposure_time).context("invalid --exposure-time")?)
    };
    let period = if cli.plus.is_empty() {
        None
    } else {
        Some(parse_duration_parts(&cli.plus).context("invalid --plus")?)
    };

    Ok(Criteria {
        dates,
        times,
        datetimes,
        exposure,
        model: cli.model.clone(),
        period,
        first_after: cli.first_after,
        order,
    })
}

/// Option combinations that are accepted but do not do what they suggest.
fn ineffective(criteria: &Criteria) -> Vec<&'static str> {
    let mut warnings = Vec::new();
    let timed = !criteria.times.is_empty() || !criteria.datetimes.is_empty();
    if criteria.period.is_some() && !timed {
        warnings.push("--plus has no effect without --times or --datetimes");
    }
    if criteria.first_after && !timed {
        warnings.push("--first-after has no effect without --times or --datetimes");
    }
    if criteria.first_after
        && !criteria.times.is_empty()
        && criteria.order == InputOrder::Unordered
    {
        warnings.push(
            "records are not sorted by date; --first-after follows the order they are read in",
        );
    }
    if criteria.first_after
        && !criteria.datetimes.is_empty()
        && criteria.order != InputOrder::ByDatetime
    {
        warnings.push(
            "records are not sorted by datetime; --first-after drops every datetime target a record has passed",
        );
    }
    if criteria.period.is_some() && timed && criteria.order == InputOrder::Unordered {
        warnings.push(
            "records are not sorted; --plus windows are checked one record at a time and never end the scan",
        );
    }
    warnings
}

/// Opens an index and returns its records with the format describing them.
fn open_records(path: &Path, cli: &Cli, config: &Config) -> Result<(Records, Option<String>)> {
    let fallback = cli
        .index_format
        .as_deref()
        .or(config.index_format.as_deref())
        .map(str::parse::<LineFormat>)
        .transpose()
        .context("invalid index format")?;

    let reader = open_index(path, fallback.as_ref())
        .with_context(|| format!("failed to open index {}", path.display()))?;
    let format = reader.format().as_str().to_string();
    Ok((Box::new(reader), Some(format)))
}

/// Discovers images below the scan root. Images are read up front, in
/// parallel, only when they will be sorted anyway.
fn scan_records(cli: &Cli, config: &Config) -> Result<Records> {
    let source = cli.source.as_deref().unwrap_or(&config.source);
    let root: ScanRoot = source.parse()?;
    let paths = discover(&root).with_context(|| format!("failed to scan {root}"))?;

    if cli.sort.is_some() {
        Ok(Box::new(read_images(&paths).into_iter().map(Ok)))
    } else {
        Ok(Box::new(paths.into_iter().map(|path| Ok(read_image(&path)))))
    }
}
