pub mod config;
pub mod error;
pub mod fs;
pub mod http;
pub mod pipeline;
pub mod tui;
pub mod writer;

/// Language-model extraction of product announcements from filing text.
pub mod extract;

/// US company information from the [SEC]; tickers, filing indexes and filing documents.
///
/// [SEC]: https://www.sec.gov/search-filings/edgar-application-programming-interfaces
pub mod stock;

pub use config::SpiderConfig;
pub use error::{Result, SpiderError};

/// Build the reqwest client used for every SEC request.
///
/// The SEC answers anonymous clients with `403 Forbidden`, so the configured `USER_AGENT` is
/// always attached. Requests are paced to `sec_requests_per_second`.
pub fn std_client_build(config: &SpiderConfig) -> Result<http::HttpClient> {
    let client = reqwest::ClientBuilder::new()
        .user_agent(&config.user_agent)
        .timeout(config.timeout)
        .build()?;
    Ok(http::HttpClient::new(client, config.sec_requests_per_second))
}

pub(crate) fn time_elapsed(time: std::time::Instant) -> String {
    format!("time elapsed: {:?}", time.elapsed())
}
