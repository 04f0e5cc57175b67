//! Constants for the download module (timeouts, layout).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large master tapes).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Per-group folder receiving expanded archive contents.
pub const EXTRACTED_DIR_NAME: &str = "extracted_data";
