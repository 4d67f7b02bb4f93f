use super::submissions::{self, FilingRef};
use super::tickers::CompanyRecord;
use crate::config::SpiderConfig;
use crate::error::Result;
use crate::fs::FilingCache;
use crate::http::*;
use chrono::{DateTime, Utc};
use tracing::{debug, error, trace, warn};

// wrap width handed to html2text; lines are re-joined afterwards
const RENDER_WIDTH: usize = 200;

/// A downloaded 8-K, reduced to plain text.
#[derive(Clone, Debug)]
pub struct Filing {
    pub company: CompanyRecord,
    pub accession_number: String,
    pub filing_time: DateTime<Utc>,
    pub document_text: String,
}

/// Fetch the most recent 8-K filings of `company`.
///
/// A failure to read the submissions index is returned to the caller; a failure on an
/// individual document only drops that filing.
pub async fn fetch(
    http_client: &HttpClient,
    config: &SpiderConfig,
    cache: Option<&FilingCache>,
    company: &CompanyRecord,
) -> Result<Vec<Filing>> {
    let time = std::time::Instant::now();
    let refs = submissions::fetch(
        http_client,
        &config.submissions_url,
        company,
        config.filings_per_company,
    )
    .await?;

    let mut filings = Vec::with_capacity(refs.len());
    for filing_ref in refs {
        let document =
            fetch_document(http_client, &config.archives_url, cache, company, &filing_ref).await;
        let html = match document {
            Ok(html) => html,
            Err(err) => {
                error!(
                    "failed to fetch 8-K {} for [{}] {}, error({err})",
                    filing_ref.accession_number, company.ticker, company.name
                );
                continue;
            }
        };

        let document_text = html_to_text(&html);
        if document_text.is_empty() {
            warn!(
                "8-K {} for [{}] {} has no text, skipping",
                filing_ref.accession_number, company.ticker, company.name
            );
            continue;
        }

        filings.push(Filing {
            company: company.clone(),
            accession_number: filing_ref.accession_number.clone(),
            filing_time: filing_ref.filing_time(),
            document_text,
        });
    }

    debug!(
        "{} 8-K documents fetched for [{}] {}, {}",
        filings.len(),
        company.ticker,
        company.name,
        crate::time_elapsed(time)
    );

    Ok(filings)
}

/// Fetch the raw primary document of a filing, going through the cache when one is given.
pub async fn fetch_document(
    http_client: &HttpClient,
    archives_url: &str,
    cache: Option<&FilingCache>,
    company: &CompanyRecord,
    filing_ref: &FilingRef,
) -> Result<String> {
    if let Some(cache) = cache {
        if let Some(html) = cache.load(&company.cik, &filing_ref.accession_number).await {
            return Ok(html);
        }
    }

    let url = filing_ref.document_url(archives_url, &company.cik);
    trace!("fetching 8-K document: {url}");

    let response = http_client.get(&url).await?;

    // EDGAR documents are occasionally not valid UTF-8
    let bytes = response.bytes().await?;
    let html = String::from_utf8_lossy(&bytes).into_owned();

    if let Some(cache) = cache {
        cache
            .store(&company.cik, &filing_ref.accession_number, &html)
            .await;
    }

    Ok(html)
}

/// Render filing HTML to a single line of plain text.
///
/// Whitespace runs collapse to one space; non-breaking spaces and the `☐` checkbox glyphs of
/// the 8-K cover page are dropped.
pub fn html_to_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let rendered = html2text::from_read(html.as_bytes(), RENDER_WIDTH);
    rendered
        .replace(|c: char| c == '\u{a0}' || c == '\u{2610}', " ")
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_is_flattened() {
        let html = "<html><body><p>Item&nbsp;8.01 Other Events</p>\n\
                    <p>&#9744; Written communications</p>\n\
                    <div>  Acme   launched\n the <b>RoadRunner 3000</b>.</div></body></html>";
        let text = html_to_text(html);

        assert!(text.contains("Item 8.01 Other Events"), "{text}");
        assert!(text.contains("Acme launched the"), "{text}");
        assert!(text.contains("RoadRunner 3000"), "{text}");
        assert!(!text.contains('\u{2610}'));
        assert!(!text.contains('\u{a0}'));
        assert!(!text.contains("  "));
        assert!(!text.contains('\n'));
    }

    #[test]
    fn empty_html_is_empty_text() {
        assert_eq!(html_to_text(""), "");
        assert_eq!(html_to_text("   \n"), "");
    }
}
