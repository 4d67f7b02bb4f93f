use crate::error::{Result, SpiderError};
use crate::stock::sec::tickers::TickerSource;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";
pub const SUBMISSIONS_URL: &str = "https://data.sec.gov/submissions";
pub const ARCHIVES_URL: &str = "https://www.sec.gov/Archives/edgar/data";
pub const OLLAMA_URL: &str = "http://localhost:11434";
pub const OLLAMA_MODEL: &str = "llama3.2:latest";
pub const OUTPUT_PATH: &str = "sec_8k_product_releases.csv";
pub const CACHE_DIR: &str = "filing_cache";

/// Settings for a single spider run.
///
/// Built from the environment (and `.env`) with [`SpiderConfig::from_env`], after which the CLI
/// overrides individual fields.
#[derive(Clone, Debug)]
pub struct SpiderConfig {
    /// Sent with every SEC request; the SEC asks for a contact e-mail here.
    pub user_agent: String,
    pub tickers: TickerSource,
    pub submissions_url: String,
    pub archives_url: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub output: PathBuf,
    /// Filing documents are cached here between runs; `None` disables the cache.
    pub cache_dir: Option<PathBuf>,
    pub max_companies: usize,
    pub filings_per_company: usize,
    pub company_concurrency: usize,
    pub llm_concurrency: usize,
    /// Upper bound on SEC requests per second, shared by every in-flight company.
    pub sec_requests_per_second: u32,
    /// Character budget for the filing text placed in the prompt; `None` sends everything.
    pub max_document_chars: Option<usize>,
    /// Per-request timeout for SEC requests.
    pub timeout: Duration,
    /// Per-request timeout for model requests.
    pub llm_timeout: Duration,
}

impl Default for SpiderConfig {
    fn default() -> Self {
        Self {
            user_agent: String::new(),
            tickers: TickerSource::Url(TICKERS_URL.to_string()),
            submissions_url: SUBMISSIONS_URL.to_string(),
            archives_url: ARCHIVES_URL.to_string(),
            ollama_url: OLLAMA_URL.to_string(),
            ollama_model: OLLAMA_MODEL.to_string(),
            output: PathBuf::from(OUTPUT_PATH),
            cache_dir: Some(PathBuf::from(CACHE_DIR)),
            max_companies: 100,
            filings_per_company: 2,
            company_concurrency: 8,
            llm_concurrency: 2,
            // SEC allows 10
            sec_requests_per_second: 9,
            max_document_chars: None,
            timeout: Duration::from_secs(30),
            llm_timeout: Duration::from_secs(300),
        }
    }
}

impl SpiderConfig {
    /// Read the configuration from `.env` and the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    /// Build the configuration from any key lookup, falling back to defaults for unset keys.
    ///
    /// `USER_AGENT` is the only required key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let user_agent = lookup("USER_AGENT")
            .filter(|agent| !agent.trim().is_empty())
            .ok_or_else(|| SpiderError::Config("environment variable USER_AGENT".to_string()))?;

        let cache_dir = match lookup("EIGHTK_CACHE_DIR") {
            Some(dir) if dir.is_empty() => None,
            Some(dir) => Some(PathBuf::from(dir)),
            None => defaults.cache_dir,
        };

        let max_document_chars = match lookup("EIGHTK_MAX_DOCUMENT_CHARS") {
            Some(chars) => Some(parse_value("EIGHTK_MAX_DOCUMENT_CHARS", &chars)?),
            None => defaults.max_document_chars,
        };

        let config = Self {
            user_agent,
            tickers: match lookup("EIGHTK_TICKERS") {
                Some(source) => source.parse()?,
                None => defaults.tickers,
            },
            submissions_url: lookup("EIGHTK_SUBMISSIONS_URL").unwrap_or(defaults.submissions_url),
            archives_url: lookup("EIGHTK_ARCHIVES_URL").unwrap_or(defaults.archives_url),
            ollama_url: lookup("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            ollama_model: lookup("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            output: lookup("EIGHTK_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output),
            cache_dir,
            max_companies: parse_or(&lookup, "EIGHTK_MAX_COMPANIES", defaults.max_companies)?,
            filings_per_company: parse_or(
                &lookup,
                "EIGHTK_FILINGS_PER_COMPANY",
                defaults.filings_per_company,
            )?,
            company_concurrency: parse_or(
                &lookup,
                "EIGHTK_COMPANY_CONCURRENCY",
                defaults.company_concurrency,
            )?,
            llm_concurrency: parse_or(&lookup, "EIGHTK_LLM_CONCURRENCY", defaults.llm_concurrency)?,
            sec_requests_per_second: parse_or(
                &lookup,
                "EIGHTK_SEC_RATE",
                defaults.sec_requests_per_second,
            )?,
            max_document_chars,
            timeout: Duration::from_secs(parse_or(
                &lookup,
                "EIGHTK_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )?),
            llm_timeout: Duration::from_secs(parse_or(
                &lookup,
                "EIGHTK_LLM_TIMEOUT_SECS",
                defaults.llm_timeout.as_secs(),
            )?),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would stall the run.
    pub fn validate(&self) -> Result<()> {
        if self.user_agent.trim().is_empty() {
            return Err(SpiderError::Config("user agent must not be empty".to_string()));
        }
        if self.company_concurrency == 0 || self.llm_concurrency == 0 {
            return Err(SpiderError::Config(
                "concurrency limits must be at least 1".to_string(),
            ));
        }
        if self.sec_requests_per_second == 0 {
            return Err(SpiderError::Config(
                "SEC request rate must be at least 1 per second".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => parse_value(key, &value),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SpiderError::Config(format!("invalid value for {key}: \"{value}\"")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_user_agent_is_set() {
        let config = SpiderConfig::from_lookup(lookup(&[("USER_AGENT", "me@example.com")])).unwrap();
        assert_eq!(config.user_agent, "me@example.com");
        assert_eq!(config.max_companies, 100);
        assert_eq!(config.filings_per_company, 2);
        assert_eq!(config.sec_requests_per_second, 9);
        assert_eq!(config.output, PathBuf::from(OUTPUT_PATH));
        assert_eq!(config.cache_dir, Some(PathBuf::from(CACHE_DIR)));
        assert_eq!(config.tickers, TickerSource::Url(TICKERS_URL.to_string()));
    }

    #[test]
    fn missing_user_agent_is_an_error() {
        let err = SpiderConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, SpiderError::Config(_)));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = SpiderConfig::from_lookup(lookup(&[
            ("USER_AGENT", "me@example.com"),
            ("EIGHTK_MAX_COMPANIES", "5"),
            ("EIGHTK_CACHE_DIR", ""),
            ("EIGHTK_MAX_DOCUMENT_CHARS", "4000"),
            ("EIGHTK_TICKERS", "./tickers.json"),
            ("EIGHTK_SEC_RATE", "4"),
        ]))
        .unwrap();
        assert_eq!(config.max_companies, 5);
        assert_eq!(config.sec_requests_per_second, 4);
        assert_eq!(config.cache_dir, None);
        assert_eq!(config.max_document_chars, Some(4000));
        assert_eq!(
            config.tickers,
            TickerSource::Path(PathBuf::from("./tickers.json"))
        );
    }

    #[test]
    fn bad_numbers_and_zero_concurrency_are_rejected() {
        assert!(SpiderConfig::from_lookup(lookup(&[
            ("USER_AGENT", "me@example.com"),
            ("EIGHTK_MAX_COMPANIES", "lots"),
        ]))
        .is_err());

        assert!(SpiderConfig::from_lookup(lookup(&[
            ("USER_AGENT", "me@example.com"),
            ("EIGHTK_LLM_CONCURRENCY", "0"),
        ]))
        .is_err());

        assert!(SpiderConfig::from_lookup(lookup(&[
            ("USER_AGENT", "me@example.com"),
            ("EIGHTK_SEC_RATE", "0"),
        ]))
        .is_err());
    }
}
