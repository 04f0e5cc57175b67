//! Download tasks and their outcomes.
//!
//! A [`Task`] is one (file URL, destination group) pair produced by link
//! discovery. Every task executed by the dispatcher yields exactly one
//! [`Outcome`].

use std::path::{Path, PathBuf};

/// Fallback group name when a scraped label sanitizes to nothing.
const UNNAMED_GROUP: &str = "unnamed";

/// One file to download and the group folder it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Task {
    /// Absolute URL of the remote file.
    pub source_url: String,
    /// Sanitized species identifier used as the top-level destination folder.
    pub group_name: String,
    /// Optional folder below the group (the recording year for full cuts).
    pub subdir: Option<String>,
}

impl Task {
    /// Creates a task stored directly under its group folder.
    pub fn new(source_url: impl Into<String>, group_name: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            group_name: group_name.into(),
            subdir: None,
        }
    }

    /// Stores the task one level below the group folder.
    #[must_use]
    pub fn with_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.subdir = Some(subdir.into());
        self
    }

    /// Directory the downloaded file is written to.
    #[must_use]
    pub fn destination_dir(&self, base_dir: &Path) -> PathBuf {
        let group_dir = self.group_dir(base_dir);
        match &self.subdir {
            Some(subdir) => group_dir.join(subdir),
            None => group_dir,
        }
    }

    /// Top-level folder for this task's group.
    #[must_use]
    pub fn group_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.group_name)
    }
}

/// Result of executing one [`Task`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The file was fetched (and expanded, where required).
    Success,
    /// Something went wrong; the URL goes to the failure ledger.
    Failure {
        /// URL of the task that failed.
        source_url: String,
    },
}

impl Outcome {
    /// Returns `true` for [`Outcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Turns a scraped species label into a path-safe folder name.
///
/// Whitespace is removed, hyphens and commas become underscores, and any
/// other character that is unsafe in a path component becomes an underscore.
///
/// ```
/// use whalesounds_core::sanitize_group_name;
///
/// assert_eq!(sanitize_group_name("Blue Whale"), "BlueWhale");
/// assert_eq!(sanitize_group_name("Killer Whale, Orca"), "KillerWhale_Orca");
/// ```
#[must_use]
pub fn sanitize_group_name(label: &str) -> String {
    let sanitized: String = label
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '-' | ',' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        UNNAMED_GROUP.to_string()
    } else {
        sanitized
    }
}
