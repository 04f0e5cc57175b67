//! Fetch-extract worker: turns one [`Task`] into a file on disk.
//!
//! Each execution performs at most one file write and at most one
//! extraction attempt. Errors are returned, never swallowed; the dispatcher
//! converts them into [`Outcome::Failure`](crate::Outcome::Failure).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::archive::extract_zip;
use super::constants::EXTRACTED_DIR_NAME;
use super::dispatcher::TaskExecutor;
use super::filename::filename_from_url;
use super::{DownloadError, HttpClient};
use crate::task::Task;

/// What to do with a file once it has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveMode {
    /// The file must be a zip; its entries go to the group's `extracted_data`.
    Extract,
    /// Keep the file as downloaded.
    Keep,
}

/// Downloads one task's file and expands it when required.
#[derive(Debug, Clone)]
pub struct FetchExtractWorker {
    client: HttpClient,
    base_dir: PathBuf,
    archive_mode: ArchiveMode,
}

impl FetchExtractWorker {
    /// Creates a worker writing below `base_dir`.
    pub fn new(client: HttpClient, base_dir: impl Into<PathBuf>, archive_mode: ArchiveMode) -> Self {
        Self {
            client,
            base_dir: base_dir.into(),
            archive_mode,
        }
    }

    /// Root of the output tree.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Returns the configured archive handling.
    #[must_use]
    pub fn archive_mode(&self) -> ArchiveMode {
        self.archive_mode
    }

    /// Fetches `task` into `<base>/<group>[/<subdir>]/<filename>`.
    ///
    /// With [`ArchiveMode::Extract`] the written file is then expanded into
    /// `<base>/<group>/extracted_data/`. Running the same task twice
    /// overwrites the file and re-extracts.
    ///
    /// # Returns
    ///
    /// Path of the downloaded file.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the URL has no file name, a directory
    /// cannot be created, the request fails or returns a non-success status,
    /// writing fails, or (in extract mode) the file is not a zip archive. The
    /// downloaded file is left on disk in the last case.
    #[instrument(skip(self, task), fields(url = %task.source_url, group = %task.group_name))]
    pub async fn fetch_extract(&self, task: &Task) -> Result<PathBuf, DownloadError> {
        let filename = filename_from_url(&task.source_url)?;
        let dest_dir = task.destination_dir(&self.base_dir);
        ensure_dir(&dest_dir).await?;

        let extract_dir = match self.archive_mode {
            ArchiveMode::Extract => {
                let dir = task.group_dir(&self.base_dir).join(EXTRACTED_DIR_NAME);
                ensure_dir(&dir).await?;
                Some(dir)
            }
            ArchiveMode::Keep => None,
        };

        let file_path = dest_dir.join(&filename);
        let bytes = self
            .client
            .download_to_path(&task.source_url, &file_path)
            .await?;
        debug!(path = %file_path.display(), bytes, "file written");

        if let Some(extract_dir) = extract_dir {
            let files = extract_zip(&file_path, &extract_dir).await?;
            info!(path = %file_path.display(), files, "downloaded and extracted");
        } else {
            info!(path = %file_path.display(), bytes, "downloaded");
        }

        Ok(file_path)
    }
}

#[async_trait]
impl TaskExecutor for FetchExtractWorker {
    async fn execute(&self, task: &Task) -> Result<(), DownloadError> {
        self.fetch_extract(task).await.map(|_| ())
    }
}

/// Creates `dir` and its parents; an existing directory is not an error.
async fn ensure_dir(dir: &Path) -> Result<(), DownloadError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DownloadError::io(dir, e))
}
