use crate::cli::{RunArgs, SourceArgs};
use colored::Colorize;
use eightk_spider::extract::OllamaClient;
use eightk_spider::{self as spider, SpiderConfig};
use tracing::{debug, trace};

/// Apply CLI overrides on top of the environment configuration.
fn configure(source: &SourceArgs) -> anyhow::Result<SpiderConfig> {
    let mut config = SpiderConfig::from_env()?;
    if let Some(tickers) = &source.tickers {
        config.tickers = tickers.parse()?;
    }
    Ok(config)
}

/// Run the full 8-K product scan.
pub(crate) async fn run(args: RunArgs, tui: bool) -> anyhow::Result<()> {
    let mut config = configure(&args.source)?;
    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(max) = args.max_companies {
        config.max_companies = max;
    }
    if let Some(n) = args.filings_per_company {
        config.filings_per_company = n;
    }
    if let Some(model) = args.model {
        config.ollama_model = model;
    }
    if args.no_cache {
        config.cache_dir = None;
    }
    trace!("spider configuration: {config:?}");

    let llm = OllamaClient::new(&config.ollama_url, &config.ollama_model, config.llm_timeout)?;
    debug!("extracting with {} at {}", llm.model(), config.ollama_url);

    if tui {
        println!(
            "{bar}\n{name:^40}\n{bar}",
            bar = "=".repeat(40),
            name = "SEC 8-K Product Releases"
        );
    }

    let summary = spider::pipeline::run(&config, &llm, tui).await?;

    if tui {
        println!(
            "{} {} companies, {} skipped, {} filings read",
            "done".green().bold(),
            summary.companies,
            summary.skipped.to_string().red(),
            summary.filings
        );
        println!(
            "{} products written to {}",
            summary.products.to_string().green(),
            summary.output.display()
        );
    }

    Ok(())
}

/// Print the ticker list.
pub(crate) async fn tickers(source: SourceArgs, limit: Option<usize>) -> anyhow::Result<()> {
    let config = configure(&source)?;
    let http_client = spider::std_client_build(&config)?;
    let companies = spider::stock::sec::tickers::fetch(&http_client, &config.tickers).await?;

    let limit = limit.unwrap_or(companies.len());
    for company in companies.iter().take(limit) {
        println!(
            "{} {:<8} {}",
            company.cik.dimmed(),
            company.ticker.bold(),
            company.name
        );
    }
    println!("{} of {} companies", limit.min(companies.len()), companies.len());

    Ok(())
}
