use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpiderError>;

#[derive(Error, Debug)]
pub enum SpiderError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("output writer failed: {0}")]
    Writer(String),

    #[error("language model error: {0}")]
    Llm(String),

    #[error("configuration error: {0}")]
    Config(String),
}
