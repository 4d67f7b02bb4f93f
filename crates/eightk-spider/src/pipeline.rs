use crate::config::SpiderConfig;
use crate::extract::{self, LlmClient};
use crate::fs::FilingCache;
use crate::http::*;
use crate::stock::sec::filings;
use crate::stock::sec::tickers::{self, CompanyRecord};
use crate::tui::RunProgress;
use crate::writer::{CsvWriter, SharedCsvWriter};
use futures::{stream, StreamExt};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// Counts for a finished run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub companies: usize,
    /// Companies skipped because their filings could not be fetched.
    pub skipped: usize,
    /// Filings handed to the model.
    pub filings: usize,
    /// Rows appended to the output file.
    pub products: usize,
    pub output: PathBuf,
}

/// Load the ticker list and run every company through the pipeline.
///
/// Only a failure to load the tickers or to open the output file aborts the run.
pub async fn run<L: LlmClient>(
    config: &SpiderConfig,
    llm: &L,
    tui: bool,
) -> anyhow::Result<Summary> {
    config.validate()?;
    let http_client = crate::std_client_build(config)?;

    info!("fetching SEC Company Tickers ...");
    let mut companies = tickers::fetch(&http_client, &config.tickers).await?;
    if companies.len() > config.max_companies {
        debug!(
            "limiting run to the first {} of {} companies",
            config.max_companies,
            companies.len()
        );
        companies.truncate(config.max_companies);
    }

    process(config, &http_client, llm, companies, tui).await
}

/// Fetch, extract and write for each company, `company_concurrency` companies at a time.
pub async fn process<L: LlmClient>(
    config: &SpiderConfig,
    http_client: &HttpClient,
    llm: &L,
    companies: Vec<CompanyRecord>,
    tui: bool,
) -> anyhow::Result<Summary> {
    let time = std::time::Instant::now();

    let writer = SharedCsvWriter::new(CsvWriter::open(&config.output).map_err(|err| {
        error!(
            "failed to open output file {}, error({err})",
            config.output.display()
        );
        err
    })?);
    let cache = config.cache_dir.as_ref().map(FilingCache::new);
    let llm_permits = Semaphore::new(config.llm_concurrency);
    let progress = RunProgress::new(companies.len(), config.filings_per_company, tui)?;

    let total = companies.len();
    let skipped = AtomicUsize::new(0);
    let filings_seen = AtomicUsize::new(0);

    info!("processing {total} companies ...");
    stream::iter(companies)
        .for_each_concurrent(config.company_concurrency, |company| {
            let writer = &writer;
            let cache = cache.as_ref();
            let llm_permits = &llm_permits;
            let progress = &progress;
            let skipped = &skipped;
            let filings_seen = &filings_seen;
            async move {
                let spinner = progress.spinner(format!("[{}] {}", company.ticker, company.name));

                let filings = match filings::fetch(http_client, config, cache, &company).await {
                    Ok(filings) if filings.is_empty() => {
                        warn!(
                            "no 8-K filings for [{}] {}, skipping",
                            company.ticker, company.name
                        );
                        skipped.fetch_add(1, Ordering::Relaxed);
                        progress.skipped.inc(1);
                        progress.total.inc(1);
                        spinner.finish_and_clear();
                        return;
                    }
                    Ok(filings) => filings,
                    Err(err) => {
                        error!(
                            "skipping [{}] {}, error({err})",
                            company.ticker, company.name
                        );
                        skipped.fetch_add(1, Ordering::Relaxed);
                        progress.skipped.inc(1);
                        progress.total.inc(1);
                        spinner.finish_and_clear();
                        return;
                    }
                };

                for filing in &filings {
                    filings_seen.fetch_add(1, Ordering::Relaxed);

                    let result = {
                        let _permit = match llm_permits.acquire().await {
                            Ok(permit) => permit,
                            Err(err) => {
                                error!("model permits closed, error({err})");
                                break;
                            }
                        };
                        extract::extract(llm, filing, config.max_document_chars).await
                    };

                    match result {
                        Ok(Some(record)) => {
                            info!(
                                "found new product for [{}] {}: {}",
                                company.ticker, company.name, record.product_name
                            );
                            match writer.write(record).await {
                                Ok(_) => progress.products.inc(1),
                                Err(err) => error!(
                                    "failed to write product row for [{}] {}, error({err})",
                                    company.ticker, company.name
                                ),
                            }
                        }
                        Ok(None) => debug!(
                            "no new product in 8-K {} for [{}] {}",
                            filing.accession_number, company.ticker, company.name
                        ),
                        Err(err) => error!(
                            "extraction failed for 8-K {} of [{}] {}, error({err})",
                            filing.accession_number, company.ticker, company.name
                        ),
                    }
                }

                progress.total.inc(1);
                spinner.finish_and_clear();
            }
        })
        .await;

    progress.finish();

    let summary = Summary {
        companies: total,
        skipped: skipped.into_inner(),
        filings: filings_seen.into_inner(),
        products: writer.rows(),
        output: config.output.clone(),
    };

    info!(
        "run finished: {} companies, {} skipped, {} filings, {} products written to {}, {}",
        summary.companies,
        summary.skipped,
        summary.filings,
        summary.products,
        summary.output.display(),
        crate::time_elapsed(time)
    );

    Ok(summary)
}
