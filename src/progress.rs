//! Progress bars for the discovery and download phases.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use whalesounds_core::{DiscoveryObserver, Outcome, ProgressObserver};

const TICK_INTERVAL: Duration = Duration::from_millis(120);

fn styled_bar(visible: bool, template: &str) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.enable_steady_tick(TICK_INTERVAL);
    bar
}

/// Bar advanced once per species page walked.
pub(crate) struct DiscoveryProgress {
    bar: ProgressBar,
}

impl DiscoveryProgress {
    pub(crate) fn new(visible: bool) -> Self {
        Self {
            bar: styled_bar(visible, "{spinner} Gathering links [{pos}/{len}] {msg}"),
        }
    }

    pub(crate) fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl DiscoveryObserver for DiscoveryProgress {
    fn on_species(&self, done: usize, total: usize, label: &str, files: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(done as u64);
        self.bar.set_message(format!("{label} ({files} files)"));
    }
}

/// Bar advanced once per finished task; the message tracks failures.
pub(crate) struct DownloadProgress {
    bar: ProgressBar,
    failed: AtomicUsize,
}

impl DownloadProgress {
    pub(crate) fn new(visible: bool, total: usize) -> Self {
        let bar = styled_bar(
            visible,
            "{spinner} Downloading [{bar:30}] {pos}/{len} ({eta}) {msg}",
        );
        bar.set_length(total as u64);
        Self {
            bar,
            failed: AtomicUsize::new(0),
        }
    }

    #[cfg(test)]
    fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub(crate) fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressObserver for DownloadProgress {
    fn on_outcome(&self, completed: usize, _total: usize, outcome: &Outcome) {
        if !outcome.is_success() {
            let failed = self.failed.fetch_add(1, Ordering::SeqCst) + 1;
            self.bar.set_message(format!("{failed} failed"));
        }
        self.bar.set_position(completed as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_progress_counts_failures_only() {
        let progress = DownloadProgress::new(false, 3);

        progress.on_outcome(1, 3, &Outcome::Success);
        progress.on_outcome(
            2,
            3,
            &Outcome::Failure {
                source_url: "http://cis.whoi.edu/data/x.zip".to_string(),
            },
        );
        progress.on_outcome(3, 3, &Outcome::Success);

        assert_eq!(progress.failed(), 1);
        assert_eq!(progress.bar.position(), 3);
        progress.finish();
    }

    #[test]
    fn test_discovery_progress_tracks_species_count() {
        let progress = DiscoveryProgress::new(false);

        progress.on_species(2, 5, "Blue Whale", 12);

        assert_eq!(progress.bar.position(), 2);
        assert_eq!(progress.bar.length(), Some(5));
        progress.finish();
    }
}
