pub mod aggregate;
pub mod builder;
pub mod classifier;
pub mod lines;
pub mod matchers;

use chrono::NaiveDate;
use tracing::info;

pub use aggregate::{aggregate, Tables};
pub use builder::CountryFilter;

use crate::error::ScrapeError;
use crate::model::ScrapeResult;
use builder::RecordBuilder;
use classifier::Classifier;
use lines::Lines;

/// Full pipeline on raw markup: html → lines → classified records.
pub fn parse_html(
    html: &str,
    url: &str,
    date_scraped: NaiveDate,
    filter: CountryFilter,
) -> Result<ScrapeResult, ScrapeError> {
    let lines = Lines::from_html(html)?;
    parse_lines(&lines, url, date_scraped, filter)
}

/// Same as [`parse_html`] for text that is already one record per line.
pub fn parse_text(
    text: &str,
    url: &str,
    date_scraped: NaiveDate,
    filter: CountryFilter,
) -> Result<ScrapeResult, ScrapeError> {
    parse_lines(&Lines::from_text(text), url, date_scraped, filter)
}

pub fn parse_lines(
    lines: &Lines,
    url: &str,
    date_scraped: NaiveDate,
    filter: CountryFilter,
) -> Result<ScrapeResult, ScrapeError> {
    let mut classifier = Classifier::new(RecordBuilder::new(filter));
    for line in lines.iter() {
        classifier.feed(line)?;
    }

    let dropped = classifier.dropped();
    let last_section = format!("{:?}", classifier.state());
    let result = classifier.finish(url, date_scraped);
    info!(
        lines = lines.len(),
        countries = result.countries.len(),
        categories = result.categories.len(),
        entries = result.entries().count(),
        dropped,
        last_section,
        "parsed document"
    );
    Ok(result)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StatusCounts;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 24).unwrap()
    }

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    #[test]
    fn russia_tanks_scenario() {
        let text = "Russia - 100, of which: destroyed: 80, abandoned: 20\n\
                    Tanks (50, of which destroyed: 40, abandoned: 10)\n\
                    40 T-72:\n\
                    10 T-80:";
        let r = parse_text(text, "http://test", date(), CountryFilter::all()).unwrap();

        assert_eq!(r.countries.len(), 1);
        let c = &r.countries[0];
        assert_eq!(c.country, "russia");
        assert_eq!(c.total, 100);
        assert_eq!(
            c.status,
            StatusCounts { destroyed: 80, damaged: 0, abandoned: 20, captured: 0 }
        );

        assert_eq!(r.categories.len(), 1);
        let t = &r.categories[0];
        assert_eq!(t.label, "Tanks");
        assert_eq!(t.total, 50);
        assert_eq!(
            t.status,
            StatusCounts { destroyed: 40, damaged: 0, abandoned: 10, captured: 0 }
        );

        let entries: Vec<_> = r
            .entries()
            .map(|(_, e)| (e.category.as_str(), e.type_name.as_str(), e.count))
            .collect();
        assert_eq!(entries, vec![("Tanks", "T-72", 40), ("Tanks", "T-80", 10)]);
    }

    #[test]
    fn fixture_full_document() {
        let r = parse_html(&fixture("oryx_sample"), "http://test", date(), CountryFilter::all())
            .unwrap();
        let countries: Vec<_> = r.countries.iter().map(|c| c.country.as_str()).collect();
        assert_eq!(countries, vec!["russia", "ukraine"]);
        assert_eq!(r.countries[0].total, 1212);

        let labels: Vec<_> = r
            .categories
            .iter()
            .map(|c| (c.country.as_deref().unwrap_or(""), c.label.as_str()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("russia", "Tanks"),
                ("russia", "Armoured Fighting Vehicles"),
                ("ukraine", "Tanks"),
                ("ukraine", "Self-Propelled Artillery"),
            ]
        );

        let t54 = r
            .entries()
            .map(|(_, e)| e)
            .find(|e| e.type_name == "T-54-3M")
            .unwrap();
        assert_eq!(t54.count, 2);
        assert_eq!(
            t54.status,
            Some(StatusCounts { destroyed: 1, damaged: 0, abandoned: 0, captured: 1 })
        );
    }

    #[test]
    fn fixture_filtered_to_russia() {
        let r = parse_html(
            &fixture("oryx_sample"),
            "http://test",
            date(),
            CountryFilter::from_names(["RUSSIA"]),
        )
        .unwrap();
        assert!(r.countries.iter().all(|c| c.country == "russia"));
        assert!(r.categories.iter().all(|c| c.country.as_deref() == Some("russia")));
        assert!(r.entries().all(|(_, e)| e.type_name != "2S1 Gvozdika"));
    }

    #[test]
    fn changed_site_structure_is_parse_error() {
        let err = parse_html("<html><body><main>moved</main></body></html>", "u", date(), CountryFilter::all())
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Parse(_)));
    }
}
