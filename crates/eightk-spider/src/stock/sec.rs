/// Filing documents: download, cache and convert to plain text.
pub mod filings;

/// Per-company filing indexes from `data.sec.gov/submissions`.
pub mod submissions;

/// The SEC's published `company_tickers.json`.
pub mod tickers;
