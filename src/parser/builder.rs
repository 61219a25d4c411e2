use std::collections::HashSet;

use tracing::{debug, warn};

use super::matchers::{
    match_markers, CategoryCapture, CountryCapture, EquipmentCapture, Status, StatusFields,
};
use crate::error::ScrapeError;
use crate::model::{CategoryTotal, CountryTotal, EquipmentEntry, StatusCounts};

/// Case-insensitive set of countries to keep. Empty means keep everything.
#[derive(Debug, Clone, Default)]
pub struct CountryFilter {
    names: HashSet<String>,
}

impl CountryFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|n| normalize_country(n.as_ref()))
            .filter(|n| !n.is_empty())
            .collect();
        CountryFilter { names }
    }

    pub fn is_all(&self) -> bool {
        self.names.is_empty()
    }

    /// A record outside any country section only passes an unrestricted filter.
    pub fn accepts(&self, country: Option<&str>) -> bool {
        if self.is_all() {
            return true;
        }
        country.is_some_and(|c| self.names.contains(&normalize_country(c)))
    }
}

/// Turns matcher captures into typed records and applies the country filter.
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    filter: CountryFilter,
}

impl RecordBuilder {
    pub fn new(filter: CountryFilter) -> Self {
        RecordBuilder { filter }
    }

    pub fn accepts(&self, country: Option<&str>) -> bool {
        self.filter.accepts(country)
    }

    pub fn country_total(&self, cap: &CountryCapture<'_>) -> Result<CountryTotal, ScrapeError> {
        let record = CountryTotal {
            country: normalize_country(cap.country),
            total: parse_count("total", cap.total, cap.line)?,
            status: status_counts(&cap.status, cap.line)?,
        };
        check_sum(&record.country, record.total, &record.status);
        Ok(record)
    }

    pub fn category_total(
        &self,
        cap: &CategoryCapture<'_>,
        country: Option<&str>,
    ) -> Result<CategoryTotal, ScrapeError> {
        let record = CategoryTotal {
            label: normalize_label(cap.label),
            country: country.map(str::to_string),
            total: parse_count("total", cap.total, cap.line)?,
            status: status_counts(&cap.status, cap.line)?,
            equipment: Vec::new(),
        };
        check_sum(&record.label, record.total, &record.status);
        Ok(record)
    }

    pub fn equipment(
        &self,
        cap: &EquipmentCapture<'_>,
        category: &str,
    ) -> Result<EquipmentEntry, ScrapeError> {
        let count = parse_count("count", cap.count, cap.line)?;
        let type_name = normalize_label(cap.type_name);
        let status = marker_breakdown(cap.tail, count, &type_name);
        Ok(EquipmentEntry {
            category: category.to_string(),
            type_name,
            count,
            status,
        })
    }
}

pub fn normalize_country(name: &str) -> String {
    normalize_label(name).to_lowercase()
}

pub fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_count(field: &'static str, raw: &str, line: &str) -> Result<u32, ScrapeError> {
    raw.replace(',', "")
        .parse::<u32>()
        .map_err(|_| ScrapeError::validation(field, raw, line))
}

fn parse_opt(field: &'static str, raw: Option<&str>, line: &str) -> Result<u32, ScrapeError> {
    raw.map_or(Ok(0), |r| parse_count(field, r, line))
}

fn status_counts(fields: &StatusFields<'_>, line: &str) -> Result<StatusCounts, ScrapeError> {
    Ok(StatusCounts {
        destroyed: parse_opt("destroyed", fields.destroyed, line)?,
        damaged: parse_opt("damaged", fields.damaged, line)?,
        abandoned: parse_opt("abandoned", fields.abandoned, line)?,
        captured: parse_opt("captured", fields.captured, line)?,
    })
}

fn check_sum(name: &str, total: u32, status: &StatusCounts) {
    if status.sum() > total {
        warn!(record = name, total, status_sum = status.sum(), "status breakdown exceeds total");
    }
}

/// Breakdown from inline markers, kept only when it accounts for every piece.
fn marker_breakdown(tail: &str, count: u32, type_name: &str) -> Option<StatusCounts> {
    let markers = match_markers(tail);
    if markers.is_empty() {
        return None;
    }
    let mut counts = StatusCounts::default();
    for m in &markers {
        let slot = match m.status {
            Status::Destroyed => &mut counts.destroyed,
            Status::Damaged => &mut counts.damaged,
            Status::Abandoned => &mut counts.abandoned,
            Status::Captured => &mut counts.captured,
        };
        *slot = slot.saturating_add(m.pieces);
    }
    if counts.sum() != count {
        debug!(
            type_name,
            count,
            markers = counts.sum(),
            "status markers do not match count, dropping per-type breakdown"
        );
        return None;
    }
    Some(counts)
}
