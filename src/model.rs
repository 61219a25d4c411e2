use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Four-way split of a loss count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub destroyed: u32,
    pub damaged: u32,
    pub abandoned: u32,
    pub captured: u32,
}

impl StatusCounts {
    pub fn sum(&self) -> u32 {
        self.destroyed
            .saturating_add(self.damaged)
            .saturating_add(self.abandoned)
            .saturating_add(self.captured)
    }

    pub fn add(&mut self, other: &StatusCounts) {
        self.destroyed = self.destroyed.saturating_add(other.destroyed);
        self.damaged = self.damaged.saturating_add(other.damaged);
        self.abandoned = self.abandoned.saturating_add(other.abandoned);
        self.captured = self.captured.saturating_add(other.captured);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryTotal {
    /// Lowercase, trimmed.
    pub country: String,
    pub total: u32,
    #[serde(flatten)]
    pub status: StatusCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub label: String,
    /// Country section the header appeared under, if any had been seen yet.
    pub country: Option<String>,
    pub total: u32,
    #[serde(flatten)]
    pub status: StatusCounts,
    pub equipment: Vec<EquipmentEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquipmentEntry {
    pub category: String,
    pub type_name: String,
    pub count: u32,
    /// Per-type breakdown from inline `(n, status)` markers. Only set when the
    /// markers account for exactly `count` pieces.
    pub status: Option<StatusCounts>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrapeResult {
    pub url: String,
    pub date_scraped: NaiveDate,
    pub countries: Vec<CountryTotal>,
    pub categories: Vec<CategoryTotal>,
}

impl ScrapeResult {
    /// Every equipment entry in document order, paired with its category.
    pub fn entries(&self) -> impl Iterator<Item = (&CategoryTotal, &EquipmentEntry)> + '_ {
        self.categories
            .iter()
            .flat_map(|c| c.equipment.iter().map(move |e| (c, e)))
    }
}

/// One row of `daily_count.csv`. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCountRow {
    pub country: String,
    pub equipment_type: String,
    pub destroyed: u32,
    pub abandoned: u32,
    pub captured: u32,
    pub damaged: u32,
    pub type_total: u32,
    pub date_recorded: NaiveDate,
}

/// One row of `totals_by_type.csv`. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsByTypeRow {
    pub country: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub destroyed: u32,
    pub abandoned: u32,
    pub captured: u32,
    pub damaged: u32,
    pub total: u32,
}
