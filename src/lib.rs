//! Whalesounds Core Library
//!
//! This library mirrors the WHOI Watkins Marine Mammal Sound Database to local
//! storage: it discovers every downloadable file of a collection, fetches the
//! files with a bounded pool of paced workers, expands bundled archives, and
//! records every failed URL for a later retry.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`discovery`] - Species/year/file crawling into a flat task list
//! - [`download`] - HTTP client, fetch-extract worker, and concurrent dispatcher
//! - [`report`] - Failure ledger persisted after each run
//! - [`config`] - Collections and explicit run configuration
//! - [`task`] - Task and outcome data model

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod discovery;
pub mod download;
pub mod report;
pub mod task;
mod user_agent;

// Re-export commonly used types
pub use config::{Collection, ConfigError, RunConfig};
pub use discovery::{Discovery, DiscoveryError, DiscoveryObserver, SpeciesWalk};
pub use download::{
    ArchiveMode, DEFAULT_WAIT, DEFAULT_WORKERS, DispatchError, DispatchReport, Dispatcher,
    DownloadError, FetchExtractWorker, HttpClient, NoProgress, ProgressObserver, TaskExecutor,
};
pub use report::{FailureLedger, LEDGER_FILE_NAME, ReportError};
pub use task::{Outcome, Task, sanitize_group_name};
