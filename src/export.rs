use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info};

use crate::model::{DailyCountRow, ScrapeResult, TotalsByTypeRow};
use crate::parser::Tables;

pub const DAILY_COUNT_FILE: &str = "daily_count.csv";
pub const TOTALS_BY_TYPE_FILE: &str = "totals_by_type.csv";

/// JSON document handed to downstream consumers. Field names are fixed.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub url: &'a str,
    pub date_scraped: NaiveDate,
    pub total_entries: u64,
    pub daily_count: &'a [DailyCountRow],
    pub totals_by_type: &'a [TotalsByTypeRow],
}

impl<'a> Report<'a> {
    pub fn new(result: &'a ScrapeResult, tables: &'a Tables) -> Self {
        Report {
            url: &result.url,
            date_scraped: result.date_scraped,
            total_entries: tables.total_entries(),
            daily_count: &tables.daily_count,
            totals_by_type: &tables.totals_by_type,
        }
    }
}

/// Write both CSV tables into `dir`, creating it if needed.
pub fn write_csv_dir(dir: &Path, tables: &Tables) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let daily = dir.join(DAILY_COUNT_FILE);
    write_rows(create(&daily)?, &tables.daily_count)?;
    debug!("Saved {} rows to {}", tables.daily_count.len(), daily.display());

    let totals = dir.join(TOTALS_BY_TYPE_FILE);
    write_rows(create(&totals)?, &tables.totals_by_type)?;
    debug!("Saved {} rows to {}", tables.totals_by_type.len(), totals.display());

    Ok(vec![daily, totals])
}

/// `-` as a JSON path means stdout.
pub fn is_stdout(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn write_json(path: &Path, report: &Report<'_>, indent: usize) -> Result<()> {
    let json = to_json(report, indent)?;
    if is_stdout(path) {
        println!("{}", json);
        return Ok(());
    }
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Saved JSON report to {}", path.display());
    Ok(())
}

/// Pretty-print with `indent` spaces per level.
pub fn to_json(report: &Report<'_>, indent: usize) -> Result<String> {
    let indent = b" ".repeat(indent);
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(&indent));
    report.serialize(&mut ser).context("Failed to serialize report")?;
    String::from_utf8(buf).context("Report is not valid UTF-8")
}

/// Serialize rows with a header line taken from the struct's field order.
pub fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_rows<R: Read, T: DeserializeOwned>(reader: R) -> Result<Vec<T>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result.context("Failed to deserialize CSV row")?);
    }
    Ok(rows)
}

pub fn read_totals_by_type(dir: &Path) -> Result<Vec<TotalsByTypeRow>> {
    let path = dir.join(TOTALS_BY_TYPE_FILE);
    let file = fs::File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_rows(file)
}

fn create(path: &Path) -> Result<fs::File> {
    fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))
}
