use crate::error::{Result, SpiderError};
use crate::http::*;
use crate::stock::common::de_cik;
use serde::de::{IgnoredAny, Visitor};
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, error, trace, warn};

/// Where the `company_tickers.json` reference file is read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickerSource {
    Url(String),
    Path(PathBuf),
}

impl FromStr for TickerSource {
    type Err = SpiderError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SpiderError::Config("empty ticker source".to_string()));
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(Self::Url(s.to_string()))
        } else {
            Ok(Self::Path(PathBuf::from(s)))
        }
    }
}

impl std::fmt::Display for TickerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A listed company, as published by the SEC.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompanyRecord {
    /// 10-digit, zero-padded Central Index Key.
    pub cik: String,
    pub name: String,
    pub ticker: String,
}

/// Load every company from `source`, in file order.
///
/// Entries with a blank ticker are dropped.
pub async fn fetch(http_client: &HttpClient, source: &TickerSource) -> Result<Vec<CompanyRecord>> {
    let time = std::time::Instant::now();
    debug!("fetching SEC Company Tickers from {source}");

    let tickers: Tickers = match source {
        TickerSource::Url(url) => {
            let response = http_client.get(url).await.map_err(|err| {
                error!("failed to fetch SEC Company Tickers, error({err})");
                err
            })?;

            let body = response.bytes().await?;
            serde_json::from_slice(&body).map_err(|err| {
                error!("failed to parse JSON, error({err})");
                err
            })?
        }
        TickerSource::Path(path) => crate::fs::read_json(path).await?,
    };

    let companies = tickers.into_companies();
    debug!(
        "{} SEC Company Tickers loaded, {}",
        companies.len(),
        crate::time_elapsed(time)
    );

    Ok(companies)
}

// de
// ----------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct Tickers(Vec<Ticker>);

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Ticker {
    #[serde(rename = "cik_str", deserialize_with = "de_cik")]
    cik: String,
    ticker: String,
    title: String,
}

impl Tickers {
    fn into_companies(self) -> Vec<CompanyRecord> {
        self.0
            .into_iter()
            .filter_map(|t| {
                let ticker = t.ticker.trim();
                if ticker.is_empty() {
                    warn!("dropping {} (CIK {}) with an empty ticker", t.title, t.cik);
                    return None;
                }
                trace!("loaded [{ticker}] {}", t.title);
                Some(CompanyRecord {
                    cik: t.cik,
                    name: t.title.trim().to_string(),
                    ticker: ticker.to_string(),
                })
            })
            .collect()
    }
}

struct TickerVisitor;

impl<'de> Visitor<'de> for TickerVisitor {
    type Value = Tickers;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("Map of tickers")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        // each entry is in the form of:
        // `"0": { "cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc." },
        //  "1": { ... },
        //  ...`
        let mut tickers: Vec<Ticker> = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((_, ticker)) = map.next_entry::<IgnoredAny, Ticker>()? {
            tickers.push(ticker);
        }
        Ok(Tickers(tickers))
    }
}

impl<'de> Deserialize<'de> for Tickers {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // we want a vector returned, but the deserialize will expect a map, given
        // how the API has been designed
        deserializer.deserialize_map(TickerVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICKERS: &str = r#"{
        "0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."},
        "1": {"cik_str": 789019, "ticker": "MSFT", "title": "MICROSOFT CORP"},
        "2": {"cik_str": 1045810, "ticker": "  ", "title": "Blank Ticker Corp"},
        "3": {"cik_str": 1652044, "ticker": "GOOGL", "title": "Alphabet Inc."}
    }"#;

    #[test]
    fn tickers_keep_file_order_and_drop_blank_tickers() {
        let tickers: Tickers = serde_json::from_str(TICKERS).unwrap();
        let companies = tickers.into_companies();

        assert_eq!(companies.len(), 3);
        assert_eq!(
            companies[0],
            CompanyRecord {
                cik: "0000320193".to_string(),
                name: "Apple Inc.".to_string(),
                ticker: "AAPL".to_string(),
            }
        );
        assert_eq!(companies[2].ticker, "GOOGL");
        assert!(companies.iter().all(|c| !c.ticker.is_empty()));
    }

    #[test]
    fn malformed_entry_fails_the_whole_file() {
        let bad = r#"{"0": {"cik_str": 320193, "title": "Apple Inc."}}"#;
        assert!(serde_json::from_str::<Tickers>(bad).is_err());
    }

    #[test]
    fn ticker_source_from_str() {
        assert_eq!(
            "https://www.sec.gov/files/company_tickers.json"
                .parse::<TickerSource>()
                .unwrap(),
            TickerSource::Url("https://www.sec.gov/files/company_tickers.json".to_string())
        );
        assert_eq!(
            "data/company_tickers.json".parse::<TickerSource>().unwrap(),
            TickerSource::Path(PathBuf::from("data/company_tickers.json"))
        );
        assert!("".parse::<TickerSource>().is_err());
    }

    #[tokio::test]
    async fn fetch_from_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("company_tickers.json");
        std::fs::write(&path, TICKERS).unwrap();

        let client = HttpClient::new(reqwest::Client::new(), 10);
        let companies = fetch(&client, &TickerSource::Path(path)).await.unwrap();
        assert_eq!(companies.len(), 3);
        assert_eq!(companies[1].name, "MICROSOFT CORP");
    }
}
