use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

/// Reads a `.json` file from `path`.
pub async fn read_json<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    trace!("reading file path: {}", path.display());
    let file = tokio::fs::read(path).await?;
    trace!("file read; deserializing bytes ...");
    let data: T = serde_json::from_slice(&file)?;
    Ok(data)
}

/// On-disk cache of filing documents, one file per filing.
///
/// Cache failures never fail a run: a miss falls through to the network, and a failed write is
/// only logged.
#[derive(Clone, Debug)]
pub struct FilingCache {
    dir: PathBuf,
}

impl FilingCache {
    /// Open the cache at `dir`; the directory is created lazily on the first store.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `{cik}_{accession}.txt` within the cache directory.
    pub fn path_for(&self, cik: &str, accession_number: &str) -> PathBuf {
        self.dir.join(format!("{cik}_{accession_number}.txt"))
    }

    /// Return the cached document, if any.
    pub async fn load(&self, cik: &str, accession_number: &str) -> Option<String> {
        let path = self.path_for(cik, accession_number);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                trace!("cache hit: {}", path.display());
                Some(contents)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!("failed to read cached filing {}, error({err})", path.display());
                None
            }
        }
    }

    /// Write a document to the cache; errors are logged and swallowed.
    pub async fn store(&self, cik: &str, accession_number: &str, contents: &str) {
        if let Err(err) = tokio::fs::create_dir_all(&self.dir).await {
            warn!(
                "failed to create cache directory {}, error({err})",
                self.dir.display()
            );
            return;
        }

        let path = self.path_for(cik, accession_number);
        match tokio::fs::write(&path, contents).await {
            Ok(_) => trace!("cached filing at {}", path.display()),
            Err(err) => warn!("failed to cache filing {}, error({err})", path.display()),
        }
    }
}
