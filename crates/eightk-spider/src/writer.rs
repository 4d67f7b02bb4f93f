use crate::error::{Result, SpiderError};
use crate::extract::ProductRecord;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, trace};

/// Column names of the output file, in order.
pub const HEADERS: [&str; 5] = [
    "company_name",
    "stock_name",
    "filing_time",
    "new_product",
    "product_description",
];

/// Appends [`ProductRecord`]s to a CSV file.
///
/// A new or empty file gets the header row; an existing file is appended to as is, so re-runs
/// never repeat the header. Every row is flushed as soon as it is written.
pub struct CsvWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl CsvWriter {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        let needs_header = match std::fs::metadata(path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);

        if needs_header {
            debug!("creating {} with header", path.display());
            writer.write_record(HEADERS)?;
            writer.flush()?;
        } else {
            debug!("appending to existing {}", path.display());
        }

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            rows: 0,
        })
    }

    pub fn write(&mut self, record: &ProductRecord) -> Result<()> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        self.rows += 1;
        trace!(
            "row written to {}: [{}] {}",
            self.path.display(),
            record.ticker,
            record.product_name
        );
        Ok(())
    }

    /// Rows written through this writer (not counting rows already in the file).
    pub fn rows(&self) -> usize {
        self.rows
    }
}

/// A [`CsvWriter`] shared between tasks.
///
/// File writes run on tokio's blocking pool, so no runtime thread waits on disk.
#[derive(Clone)]
pub struct SharedCsvWriter {
    inner: Arc<Mutex<CsvWriter>>,
}

impl SharedCsvWriter {
    pub fn new(writer: CsvWriter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    pub async fn write(&self, record: ProductRecord) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut writer = inner
                .lock()
                .map_err(|_| SpiderError::Writer("writer lock poisoned".to_string()))?;
            writer.write(&record)
        })
        .await
        .map_err(|err| SpiderError::Writer(err.to_string()))?
    }

    /// Rows written so far through every handle.
    pub fn rows(&self) -> usize {
        self.inner.lock().map(|writer| writer.rows()).unwrap_or_default()
    }
}
