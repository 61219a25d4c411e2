use thiserror::Error;

/// Errors that abort a scrape. No partial result is ever returned alongside one.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Fetch failed, timed out, or the server answered with a non-success status.
    #[error("failed to fetch {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The document no longer has the shape we parse (site structure changed).
    #[error("document structure not recognized: {0}")]
    Parse(String),

    /// A matched line carried a number we could not coerce.
    #[error("invalid {field} value {value:?} in line {line:?}")]
    Validation {
        field: &'static str,
        value: String,
        line: String,
    },
}

impl ScrapeError {
    pub fn validation(field: &'static str, value: &str, line: &str) -> Self {
        ScrapeError::Validation {
            field,
            value: value.to_string(),
            line: line.to_string(),
        }
    }
}
