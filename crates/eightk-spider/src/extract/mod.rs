mod ollama;
mod parse;
mod prompt;

pub use ollama::{LlmClient, OllamaClient};
pub use parse::{parse_response, ProductInfo};
pub use prompt::build_prompt;

use crate::error::Result;
use crate::stock::sec::filings::Filing;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::trace;

/// Longest product description kept, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 180;

/// One product announcement; a row of the output CSV.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    #[serde(rename = "company_name")]
    pub company: String,
    #[serde(rename = "stock_name")]
    pub ticker: String,
    pub filing_time: DateTime<Utc>,
    #[serde(rename = "new_product")]
    pub product_name: String,
    #[serde(rename = "product_description")]
    pub description: String,
}

/// Ask `llm` whether `filing` announces a new product.
///
/// Model errors are returned; an answer without a product is `Ok(None)`.
pub async fn extract<L: LlmClient>(
    llm: &L,
    filing: &Filing,
    max_document_chars: Option<usize>,
) -> Result<Option<ProductRecord>> {
    let company = &filing.company;
    let prompt = build_prompt(
        &company.name,
        &company.ticker,
        &filing.document_text,
        max_document_chars,
    );

    let answer = llm.generate(&prompt).await?;
    trace!(
        "model answer for [{}] {}: {answer}",
        company.ticker,
        filing.accession_number
    );

    Ok(parse_response(&answer).map(|info| ProductRecord {
        company: company.name.clone(),
        ticker: company.ticker.clone(),
        filing_time: filing.filing_time,
        product_name: info.name,
        description: info.description,
    }))
}
