use std::time::Instant;

use tracing::info;

use crate::error::ScrapeError;
use crate::settings::Settings;

/// GET the page once and return its markup. No retries; the client lives only
/// for this call.
pub async fn fetch_page(url: &str, settings: &Settings) -> Result<String, ScrapeError> {
    let network = |source: reqwest::Error| ScrapeError::Network {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .timeout(settings.timeout())
        .user_agent(settings.user_agent.as_str())
        .build()
        .map_err(network)?;

    info!("Fetching page: {}", url);
    let start = Instant::now();
    let html = client
        .get(url)
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(network)?
        .text()
        .await
        .map_err(network)?;

    info!(
        bytes = html.len(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Fetched page"
    );
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn settings() -> Settings {
        Settings {
            url: String::new(),
            timeout_secs: 5,
            user_agent: "oryx_scraper/test".to_string(),
            out_dir: PathBuf::from("outputfiles"),
        }
    }

    #[tokio::test]
    async fn refused_connection_is_network_error() {
        let url = "http://127.0.0.1:1/";
        match fetch_page(url, &settings()).await {
            Err(ScrapeError::Network { url: failed, .. }) => assert_eq!(failed, url),
            other => panic!("expected network error, got {:?}", other.map(|h| h.len())),
        }
    }
}
