use chrono::NaiveDate;
use tracing::debug;

use super::builder::{normalize_label, RecordBuilder};
use super::matchers::{classify, Hit};
use crate::error::ScrapeError;
use crate::model::{CategoryTotal, CountryTotal, ScrapeResult};

/// Which block of the document the current line belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    Seeking,
    InCountryTotals,
    InCategory(String),
}

impl Section {
    /// State after `hit`. Lines that match nothing never reach here and leave
    /// the state alone.
    pub fn transition(&self, hit: &Hit<'_>) -> Section {
        match hit {
            Hit::Country(_) => Section::InCountryTotals,
            Hit::Category(cap) => Section::InCategory(normalize_label(cap.label)),
            Hit::Equipment(_) => self.clone(),
        }
    }
}

/// Single linear pass over the lines, routing each hit to its accumulator.
pub struct Classifier {
    builder: RecordBuilder,
    state: Section,
    /// Country section the following categories belong to.
    country: Option<String>,
    /// Index into `categories` of the open block, `None` when it was filtered out.
    active: Option<usize>,
    countries: Vec<CountryTotal>,
    categories: Vec<CategoryTotal>,
    dropped: usize,
}

impl Classifier {
    pub fn new(builder: RecordBuilder) -> Self {
        Classifier {
            builder,
            state: Section::Seeking,
            country: None,
            active: None,
            countries: Vec::new(),
            categories: Vec::new(),
            dropped: 0,
        }
    }

    pub fn state(&self) -> &Section {
        &self.state
    }

    /// Equipment lines seen outside any category block.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn feed(&mut self, line: &str) -> Result<(), ScrapeError> {
        let Some(hit) = classify(line) else {
            return Ok(());
        };

        match &hit {
            Hit::Country(cap) => {
                let record = self.builder.country_total(cap)?;
                self.country = Some(record.country.clone());
                self.active = None;
                if self.builder.accepts(Some(&record.country)) {
                    self.countries.push(record);
                } else {
                    debug!(country = %record.country, "country excluded by filter");
                }
            }
            Hit::Category(cap) => {
                let record = self.builder.category_total(cap, self.country.as_deref())?;
                if self.builder.accepts(record.country.as_deref()) {
                    self.active = Some(self.categories.len());
                    self.categories.push(record);
                } else {
                    debug!(category = %record.label, country = ?record.country, "category excluded by filter");
                    self.active = None;
                }
            }
            Hit::Equipment(cap) => match &self.state {
                Section::InCategory(label) => {
                    let entry = self.builder.equipment(cap, label)?;
                    if let Some(category) = self.active.and_then(|i| self.categories.get_mut(i)) {
                        category.equipment.push(entry);
                    }
                }
                _ => {
                    debug!(line, "equipment line outside a category block, dropped");
                    self.dropped += 1;
                }
            },
        }

        self.state = self.state.transition(&hit);
        Ok(())
    }

    pub fn finish(self, url: &str, date_scraped: NaiveDate) -> ScrapeResult {
        ScrapeResult {
            url: url.to_string(),
            date_scraped,
            countries: self.countries,
            categories: self.categories,
        }
    }
}
