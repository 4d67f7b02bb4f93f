use super::tickers::CompanyRecord;
use crate::error::Result;
use crate::http::*;
use crate::stock::common::convert_date_type;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use tracing::{debug, error, trace, warn};

/// The form type this spider collects.
pub const FORM_8K: &str = "8-K";

/// One 8-K entry of a company's submissions index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilingRef {
    /// e.g. `0000320193-24-000006`
    pub accession_number: String,
    pub filing_date: NaiveDate,
    /// When EDGAR accepted the filing, if the index reports it.
    pub acceptance_time: Option<DateTime<Utc>>,
    /// File name of the main document within the filing folder.
    pub primary_document: String,
}

impl FilingRef {
    /// The acceptance timestamp, or midnight UTC of the filing date.
    pub fn filing_time(&self) -> DateTime<Utc> {
        self.acceptance_time
            .unwrap_or_else(|| self.filing_date.and_time(NaiveTime::MIN).and_utc())
    }

    /// `{base}/{cik}/{accession-without-dashes}/{primary_document}`
    pub fn document_url(&self, archives_url: &str, cik: &str) -> String {
        let cik = cik.trim_start_matches('0');
        let accession = self.accession_number.replace('-', "");
        format!(
            "{}/{cik}/{accession}/{}",
            archives_url.trim_end_matches('/'),
            self.primary_document
        )
    }
}

/// `{base}/CIK##########.json`
pub fn submissions_url(submissions_url: &str, cik: &str) -> String {
    format!("{}/CIK{cik}.json", submissions_url.trim_end_matches('/'))
}

/// Fetch a company's submissions index and return its most recent 8-K filings, newest first.
pub async fn fetch(
    http_client: &HttpClient,
    submissions_base: &str,
    company: &CompanyRecord,
    limit: usize,
) -> Result<Vec<FilingRef>> {
    let url = submissions_url(submissions_base, &company.cik);
    trace!("fetching submissions for [{}] {}: {url}", company.ticker, company.name);

    let response = http_client.get(&url).await.map_err(|err| {
        error!(
            "failed to fetch submissions for [{}] {}, error({err})",
            company.ticker, company.name
        );
        err
    })?;

    let body = response.bytes().await?;
    let submissions: Submissions = serde_json::from_slice(&body)?;
    let filings = submissions.recent_8k(limit);

    debug!(
        "{} 8-K filings selected for [{}] {}",
        filings.len(),
        company.ticker,
        company.name
    );

    Ok(filings)
}

// de
// ----------------------------------------------------------------------------

// {
//    "cik": "320193",
//    "name": "Apple Inc.",
//    "filings": {
//        "recent": {
//            "accessionNumber": ["0000320193-24-000006", ...],
//            "filingDate": ["2024-02-01", ...],
//            "acceptanceDateTime": ["2024-02-01T16:30:31.000Z", ...],
//            "form": ["8-K", ...],
//            "primaryDocument": ["aapl-20240201.htm", ...]
//        },
//        "files": [ ... older pages, not read ... ]
//    }
// }
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Submissions {
    #[serde(default)]
    filings: Filings,
}

#[derive(Debug, Default, Deserialize)]
struct Filings {
    #[serde(default)]
    recent: Recent,
}

// the index is column-oriented: entry `i` of every vector describes the same filing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Recent {
    #[serde(default)]
    accession_number: Vec<String>,
    #[serde(default)]
    filing_date: Vec<String>,
    #[serde(default)]
    acceptance_date_time: Vec<String>,
    #[serde(default)]
    form: Vec<String>,
    #[serde(default)]
    primary_document: Vec<String>,
}

impl Submissions {
    /// Select up to `limit` 8-K entries in index order.
    pub(crate) fn recent_8k(&self, limit: usize) -> Vec<FilingRef> {
        let recent = &self.filings.recent;
        recent
            .form
            .iter()
            .enumerate()
            .filter(|(_, form)| form.as_str() == FORM_8K)
            .filter_map(|(i, _)| {
                let accession_number = recent.accession_number.get(i)?;
                let primary_document = recent.primary_document.get(i)?;
                if primary_document.is_empty() {
                    warn!("8-K {accession_number} has no primary document, skipping");
                    return None;
                }

                let filing_date = match recent.filing_date.get(i).and_then(|d| convert_date_type(d)) {
                    Some(date) => date,
                    None => {
                        warn!("8-K {accession_number} has no valid filing date, skipping");
                        return None;
                    }
                };

                let acceptance_time = recent
                    .acceptance_date_time
                    .get(i)
                    .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
                    .map(|t| t.with_timezone(&Utc));

                Some(FilingRef {
                    accession_number: accession_number.clone(),
                    filing_date,
                    acceptance_time,
                    primary_document: primary_document.clone(),
                })
            })
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SUBMISSIONS: &str = r#"{
        "cik": "320193",
        "name": "Apple Inc.",
        "filings": {
            "recent": {
                "accessionNumber": ["0000320193-24-000010", "0000320193-24-000009", "0000320193-24-000008", "0000320193-24-000007", "0000320193-24-000006"],
                "filingDate": ["2024-03-01", "2024-02-20", "2024-02-15", "2024-02-10", "2024-02-01"],
                "acceptanceDateTime": ["2024-03-01T16:30:31.000Z", "2024-02-20T08:00:00.000Z", "bogus", "", "2024-02-01T16:30:31.000Z"],
                "form": ["10-Q", "8-K", "8-K/A", "8-K", "8-K"],
                "primaryDocument": ["aapl-10q.htm", "aapl-8k-1.htm", "aapl-8ka.htm", "aapl-8k-2.htm", "aapl-8k-3.htm"]
            },
            "files": []
        }
    }"#;

    #[test]
    fn only_exact_8k_forms_are_selected_in_order() {
        let submissions: Submissions = serde_json::from_str(SUBMISSIONS).unwrap();
        let filings = submissions.recent_8k(10);

        let accessions: Vec<&str> = filings.iter().map(|f| f.accession_number.as_str()).collect();
        assert_eq!(
            accessions,
            vec![
                "0000320193-24-000009",
                "0000320193-24-000007",
                "0000320193-24-000006"
            ]
        );
    }

    #[test]
    fn limit_keeps_the_most_recent() {
        let submissions: Submissions = serde_json::from_str(SUBMISSIONS).unwrap();
        let filings = submissions.recent_8k(2);
        assert_eq!(filings.len(), 2);
        assert_eq!(filings[0].primary_document, "aapl-8k-1.htm");
        assert_eq!(filings[1].primary_document, "aapl-8k-2.htm");
    }

    #[test]
    fn filing_time_prefers_acceptance_timestamp() {
        let submissions: Submissions = serde_json::from_str(SUBMISSIONS).unwrap();
        let filings = submissions.recent_8k(10);

        assert_eq!(
            filings[0].filing_time(),
            Utc.with_ymd_and_hms(2024, 2, 20, 8, 0, 0).unwrap()
        );
        // empty acceptance timestamp falls back to the filing date
        assert_eq!(
            filings[1].filing_time(),
            Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn empty_or_missing_index_yields_nothing() {
        let submissions: Submissions = serde_json::from_str(r#"{"cik": "1"}"#).unwrap();
        assert!(submissions.recent_8k(2).is_empty());

        let submissions: Submissions =
            serde_json::from_str(r#"{"filings": {"recent": {"form": []}}}"#).unwrap();
        assert!(submissions.recent_8k(2).is_empty());
    }

    #[test]
    fn urls() {
        let filing = FilingRef {
            accession_number: "0000320193-24-000006".to_string(),
            filing_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            acceptance_time: None,
            primary_document: "aapl-20240201.htm".to_string(),
        };
        assert_eq!(
            filing.document_url("https://www.sec.gov/Archives/edgar/data/", "0000320193"),
            "https://www.sec.gov/Archives/edgar/data/320193/000032019324000006/aapl-20240201.htm"
        );
        assert_eq!(
            submissions_url("https://data.sec.gov/submissions", "0000320193"),
            "https://data.sec.gov/submissions/CIK0000320193.json"
        );
    }
}
