pub(crate) mod common;

/// US stock information from the [SEC]; company tickers, 8-K filing indexes and filing documents.
///
/// [SEC]: https://www.sec.gov/search-filings/edgar-application-programming-interfaces
pub mod sec;
