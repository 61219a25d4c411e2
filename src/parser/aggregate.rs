use std::collections::HashMap;

use crate::model::{DailyCountRow, ScrapeResult, StatusCounts, TotalsByTypeRow};

/// The two flat export projections of one scrape.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub daily_count: Vec<DailyCountRow>,
    pub totals_by_type: Vec<TotalsByTypeRow>,
}

impl Tables {
    /// Pieces of equipment across all rows.
    pub fn total_entries(&self) -> u64 {
        self.totals_by_type.iter().map(|r| u64::from(r.total)).sum()
    }
}

struct Rollup {
    country: String,
    type_name: String,
    status: StatusCounts,
    total: u32,
}

/// Fold equipment entries into one row per (country, type), summing repeats.
///
/// Status columns only carry what the source states per type (inline markers).
/// Lines without an unambiguous breakdown add to the total and leave the
/// status columns at 0, so a row's status sum can be below its total.
pub fn aggregate(result: &ScrapeResult) -> Tables {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut rollups: Vec<Rollup> = Vec::new();

    for (category, entry) in result.entries() {
        let country = category.country.clone().unwrap_or_default();
        let key = (country.to_lowercase(), entry.type_name.to_lowercase());
        let idx = *index.entry(key).or_insert_with(|| {
            rollups.push(Rollup {
                country,
                type_name: entry.type_name.clone(),
                status: StatusCounts::default(),
                total: 0,
            });
            rollups.len() - 1
        });

        let rollup = &mut rollups[idx];
        rollup.total = rollup.total.saturating_add(entry.count);
        if let Some(status) = &entry.status {
            rollup.status.add(status);
        }
    }

    let daily_count = rollups
        .iter()
        .map(|r| DailyCountRow {
            country: r.country.clone(),
            equipment_type: r.type_name.clone(),
            destroyed: r.status.destroyed,
            abandoned: r.status.abandoned,
            captured: r.status.captured,
            damaged: r.status.damaged,
            type_total: r.total,
            date_recorded: result.date_scraped,
        })
        .collect();

    let totals_by_type = rollups
        .into_iter()
        .map(|r| TotalsByTypeRow {
            country: r.country,
            type_name: r.type_name,
            destroyed: r.status.destroyed,
            abandoned: r.status.abandoned,
            captured: r.status.captured,
            damaged: r.status.damaged,
            total: r.total,
        })
        .collect();

    Tables {
        daily_count,
        totals_by_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_text, CountryFilter};
    use chrono::NaiveDate;

    fn tables(text: &str) -> Tables {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let result = parse_text(text, "http://test", date, CountryFilter::all()).unwrap();
        aggregate(&result)
    }

    fn totals(t: &Tables) -> Vec<(String, String, u32)> {
        let mut v: Vec<_> = t
            .totals_by_type
            .iter()
            .map(|r| (r.country.clone(), r.type_name.to_lowercase(), r.total))
            .collect();
        v.sort();
        v
    }

    #[test]
    fn duplicates_are_summed_not_overwritten() {
        let t = tables(
            "Russia - 9, of which: destroyed: 9\n\
             Tanks (9, of which destroyed: 9)\n\
             4 T-72B3:\n\
             3 T-80BV:\n\
             2 t-72b3:",
        );
        assert_eq!(t.totals_by_type.len(), 2);
        let first = &t.totals_by_type[0];
        assert_eq!(first.type_name, "T-72B3");
        assert_eq!(first.total, 6);
        assert_eq!(t.daily_count[0].type_total, 6);
        assert_eq!(t.total_entries(), 9);
    }

    #[test]
    fn order_within_block_does_not_change_totals() {
        let a = tables(
            "Russia - 9, of which: destroyed: 9\nTanks (9, of which destroyed: 9)\n4 T-72B3:\n3 T-80BV:\n2 T-72B3:",
        );
        let b = tables(
            "Russia - 9, of which: destroyed: 9\nTanks (9, of which destroyed: 9)\n2 T-72B3:\n4 T-72B3:\n3 T-80BV:",
        );
        assert_eq!(totals(&a), totals(&b));
    }

    #[test]
    fn statuses_are_zero_without_markers() {
        let t = tables("Russia - 40, of which: destroyed: 40\nTanks (40, of which destroyed: 40)\n40 T-72:");
        let row = &t.daily_count[0];
        assert_eq!(
            (row.destroyed, row.abandoned, row.captured, row.damaged, row.type_total),
            (0, 0, 0, 0, 40)
        );
        assert_eq!(row.date_recorded, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn marker_breakdowns_are_summed() {
        let t = tables(
            "Russia - 5, of which: destroyed: 3, captured: 2\n\
             Tanks (5, of which destroyed: 3, captured: 2)\n\
             2 T-72: (1, destroyed) (2, captured)\n\
             3 T-72: (3 and 4, destroyed) (5, captured)",
        );
        let row = &t.totals_by_type[0];
        assert_eq!((row.destroyed, row.captured, row.total), (3, 2, 5));
    }

    #[test]
    fn same_type_in_two_countries_stays_separate() {
        let t = tables(
            "Russia - 1, of which: destroyed: 1\nTanks (1, of which destroyed: 1)\n1 T-72:\n\
             Ukraine - 1, of which: captured: 1\nTanks (1, of which captured: 1)\n1 T-72:",
        );
        let countries: Vec<_> = t.totals_by_type.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(countries, vec!["russia", "ukraine"]);
    }
}
