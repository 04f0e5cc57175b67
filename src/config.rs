//! Run configuration threaded into discovery, workers, dispatcher and ledger.
//!
//! There is no global output directory; every component receives the values
//! it needs from a [`RunConfig`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::discovery::SpeciesWalk;
use crate::download::{ArchiveMode, DEFAULT_WAIT, DEFAULT_WORKERS};

/// Root page of the master tape collection.
pub const MASTER_TAPES_URL: &str = "http://cis.whoi.edu/science/B/whalesounds/masterFiles.cfm";

/// Root page of the full cuts collection.
pub const FULL_CUTS_URL: &str = "http://cis.whoi.edu/science/B/whalesounds/fullCuts.cfm";

/// Upper bound for the pacing delay (10 minutes).
const MAX_WAIT_SECS: f64 = 600.0;

/// Configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Unrecognized collection name.
    #[error("unknown collection '{value}': expected 'master-tapes' or 'full-cuts'")]
    UnknownCollection {
        /// The rejected name.
        value: String,
    },

    /// Pacing delay that is negative, not finite, or too large.
    #[error("invalid wait {value}: must be a number of seconds between 0 and {MAX_WAIT_SECS}")]
    InvalidWait {
        /// The rejected value.
        value: f64,
    },
}

/// Which part of the archive to mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Collection {
    /// Zipped master tapes listed on species pages, expanded after download.
    #[default]
    MasterTapes,
    /// Individual cuts listed on year pages, stored per species and year without extraction.
    FullCuts,
}

impl Collection {
    /// Fixed root page of this collection.
    #[must_use]
    pub fn root_url(self) -> &'static str {
        match self {
            Self::MasterTapes => MASTER_TAPES_URL,
            Self::FullCuts => FULL_CUTS_URL,
        }
    }

    /// How downloaded files are post-processed.
    #[must_use]
    pub fn archive_mode(self) -> ArchiveMode {
        match self {
            Self::MasterTapes => ArchiveMode::Extract,
            Self::FullCuts => ArchiveMode::Keep,
        }
    }

    /// Pages that list this collection's files.
    #[must_use]
    pub fn species_walk(self) -> SpeciesWalk {
        match self {
            Self::MasterTapes => SpeciesWalk::SpeciesTable,
            Self::FullCuts => SpeciesWalk::YearPages,
        }
    }

    /// Default output directory.
    #[must_use]
    pub fn default_output_dir(self) -> PathBuf {
        match self {
            Self::MasterTapes => PathBuf::from("scraped_data/master_tapes"),
            Self::FullCuts => PathBuf::from("scraped_data/full_cuts"),
        }
    }

    /// Command-line name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MasterTapes => "master-tapes",
            Self::FullCuts => "full-cuts",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "master-tapes" | "master_tapes" => Ok(Self::MasterTapes),
            "full-cuts" | "full_cuts" => Ok(Self::FullCuts),
            _ => Err(ConfigError::UnknownCollection {
                value: value.to_string(),
            }),
        }
    }
}

/// Converts a pacing delay in seconds into a [`Duration`].
///
/// # Errors
///
/// Returns [`ConfigError::InvalidWait`] for negative, non-finite, or
/// excessively large values.
pub fn wait_from_secs(secs: f64) -> Result<Duration, ConfigError> {
    if !secs.is_finite() || !(0.0..=MAX_WAIT_SECS).contains(&secs) {
        return Err(ConfigError::InvalidWait { value: secs });
    }
    Ok(Duration::from_secs_f64(secs))
}

/// Everything one run needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Collection being mirrored.
    pub collection: Collection,
    /// Root page to start discovery from.
    pub root_url: String,
    /// Base output directory.
    pub output_dir: PathBuf,
    /// Worker slot count.
    pub workers: usize,
    /// Pacing delay per worker slot.
    pub wait: Duration,
}

impl RunConfig {
    /// Defaults for `collection`.
    #[must_use]
    pub fn for_collection(collection: Collection) -> Self {
        Self {
            collection,
            root_url: collection.root_url().to_string(),
            output_dir: collection.default_output_dir(),
            workers: DEFAULT_WORKERS,
            wait: DEFAULT_WAIT,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::for_collection(Collection::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_from_str_accepts_both_spellings() {
        assert_eq!("master-tapes".parse::<Collection>(), Ok(Collection::MasterTapes));
        assert_eq!("FULL_CUTS".parse::<Collection>(), Ok(Collection::FullCuts));
    }

    #[test]
    fn test_collection_from_str_rejects_unknown() {
        let err = "best-of".parse::<Collection>().unwrap_err();
        assert!(err.to_string().contains("best-of"));
    }

    #[test]
    fn test_collection_display_round_trips_cli_name() {
        assert_eq!(Collection::FullCuts.to_string(), "full-cuts");
        assert_eq!(Collection::MasterTapes.to_string(), "master-tapes");
    }

    #[test]
    fn test_collection_behaviour() {
        assert_eq!(Collection::MasterTapes.archive_mode(), ArchiveMode::Extract);
        assert_eq!(Collection::MasterTapes.species_walk(), SpeciesWalk::SpeciesTable);
        assert_eq!(Collection::FullCuts.archive_mode(), ArchiveMode::Keep);
        assert_eq!(Collection::FullCuts.species_walk(), SpeciesWalk::YearPages);
    }

    #[test]
    fn test_run_config_default_is_master_tapes() {
        let config = RunConfig::default();
        assert_eq!(config.collection, Collection::MasterTapes);
        assert_eq!(config.root_url, MASTER_TAPES_URL);
        assert_eq!(config.output_dir, PathBuf::from("scraped_data/master_tapes"));
        assert_eq!(config.workers, 32);
        assert_eq!(config.wait, Duration::from_secs(1));
    }

    #[test]
    fn test_wait_from_secs_accepts_fractions_and_zero() {
        assert_eq!(wait_from_secs(0.0).unwrap(), Duration::ZERO);
        assert_eq!(wait_from_secs(0.25).unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn test_wait_from_secs_rejects_bad_values() {
        assert!(wait_from_secs(-1.0).is_err());
        assert!(wait_from_secs(f64::NAN).is_err());
        assert!(wait_from_secs(f64::INFINITY).is_err());
        assert!(wait_from_secs(601.0).is_err());
    }
}
