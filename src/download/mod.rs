//! Concurrent bulk download of discovered archive files.
//!
//! This module turns a flat list of [`Task`](crate::Task)s into files on disk.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large master tapes)
//! - Zip expansion into a per-group `extracted_data` folder
//! - Bounded worker pool with a fixed per-slot pacing delay
//! - Per-task failure isolation: errors and panics become ledger entries
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use whalesounds_core::download::{
//!     ArchiveMode, DEFAULT_WAIT, DEFAULT_WORKERS, Dispatcher, FetchExtractWorker, HttpClient,
//!     NoProgress,
//! };
//! use whalesounds_core::Task;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let worker = FetchExtractWorker::new(HttpClient::new(), "./downloads", ArchiveMode::Extract);
//! let dispatcher = Dispatcher::new(DEFAULT_WORKERS, DEFAULT_WAIT)?;
//! let tasks = vec![Task::new("http://cis.whoi.edu/data/tape1.zip", "BlueWhale")];
//! let report = dispatcher.run(tasks, Arc::new(worker), &NoProgress).await;
//! println!("Succeeded: {}, Failed: {}", report.succeeded(), report.failed());
//! # Ok(())
//! # }
//! ```

mod archive;
mod client;
mod constants;
mod dispatcher;
mod error;
mod filename;
mod worker;

pub use archive::extract_zip;
pub use client::HttpClient;
pub use constants::EXTRACTED_DIR_NAME;
pub use dispatcher::{
    DEFAULT_WAIT, DEFAULT_WORKERS, DispatchError, DispatchReport, Dispatcher, NoProgress,
    ProgressObserver, TaskExecutor,
};
pub use error::DownloadError;
pub use worker::{ArchiveMode, FetchExtractWorker};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
