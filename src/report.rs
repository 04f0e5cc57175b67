//! Failure ledger: the durable list of URLs to retry.
//!
//! The ledger is a plain text file with one URL per line so it can be diffed,
//! edited, and fed back to other tools. It is rewritten on every run.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, instrument};

use crate::download::DispatchReport;

/// File name of the ledger inside the output directory.
pub const LEDGER_FILE_NAME: &str = "unprocessed_urls.txt";

/// Error writing the ledger.
#[derive(Debug, Error)]
#[error("cannot write failure ledger {path}: {source}")]
pub struct ReportError {
    /// Ledger path.
    pub path: PathBuf,
    /// The underlying IO error.
    #[source]
    pub source: std::io::Error,
}

/// Ordered failed URLs of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureLedger {
    urls: Vec<String>,
}

impl FailureLedger {
    /// Creates a ledger from failed URLs.
    #[must_use]
    pub fn new(urls: Vec<String>) -> Self {
        Self { urls }
    }

    /// Creates a ledger from a dispatcher report.
    #[must_use]
    pub fn from_report(report: &DispatchReport) -> Self {
        Self::new(report.failures().to_vec())
    }

    /// Number of failed URLs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Returns `true` when nothing failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Failed URLs in order.
    #[must_use]
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Ledger path for an output directory.
    #[must_use]
    pub fn path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(LEDGER_FILE_NAME)
    }

    /// Writes the ledger to `<base_dir>/unprocessed_urls.txt`, replacing any
    /// earlier content. An empty ledger produces an empty file.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if the file cannot be written.
    #[instrument(skip(self), fields(failures = self.urls.len(), base_dir = %base_dir.display()))]
    pub async fn write(&self, base_dir: &Path) -> Result<PathBuf, ReportError> {
        let path = Self::path_in(base_dir);
        let mut contents = String::with_capacity(self.urls.iter().map(|u| u.len() + 1).sum());
        for url in &self.urls {
            contents.push_str(url);
            contents.push('\n');
        }

        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| ReportError {
                path: path.clone(),
                source,
            })?;

        info!(path = %path.display(), failures = self.urls.len(), "failure ledger written");
        Ok(path)
    }
}
