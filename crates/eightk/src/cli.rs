use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing.
    ///
    /// Without it, progress bars are shown instead of logs.
    #[arg(short, long, global = true)]
    pub trace: Option<TraceLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan recent 8-K filings for new products and append them to the CSV output.
    Run(RunArgs),

    /// Load the company ticker list and print it.
    Tickers {
        #[command(flatten)]
        source: SourceArgs,

        /// Print at most this many companies.
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[derive(Args, Debug)]
pub struct SourceArgs {
    /// URL or local path of `company_tickers.json`.
    #[arg(long)]
    pub tickers: Option<String>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// CSV file the products are appended to.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Process only the first N companies of the ticker list.
    #[arg(long)]
    pub max_companies: Option<usize>,

    /// Number of most recent 8-K filings read per company.
    #[arg(long)]
    pub filings_per_company: Option<usize>,

    /// Ollama model used for extraction.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Always download filings, and do not cache them.
    #[arg(long)]
    pub no_cache: bool,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
#[clap(rename_all = "UPPERCASE")]
pub enum TraceLevel {
    DEBUG,
    ERROR,
    INFO,
    TRACE,
    WARN,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "eightk",
            "run",
            "--tickers",
            "./company_tickers.json",
            "--max-companies",
            "10",
            "--no-cache",
            "-t",
            "DEBUG",
        ])
        .unwrap();

        assert_eq!(cli.trace, Some(TraceLevel::DEBUG));
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.source.tickers.as_deref(), Some("./company_tickers.json"));
                assert_eq!(args.max_companies, Some(10));
                assert!(args.no_cache);
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
