//! Link discovery: walks the species → year → file hierarchy of a collection.
//!
//! The output is a flat, de-duplicated list of [`Task`]s in page order. Only
//! a failure to load or understand the collection root page is fatal; a
//! species or year page that cannot be fetched is logged and skipped.
//!
//! # Example
//!
//! ```no_run
//! use whalesounds_core::discovery::{Discovery, SpeciesWalk};
//! use whalesounds_core::download::{HttpClient, NoProgress};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let discovery = Discovery::new(HttpClient::new(), SpeciesWalk::SpeciesTable);
//! let tasks = discovery
//!     .discover("http://cis.whoi.edu/science/B/whalesounds/masterFiles.cfm", &NoProgress)
//!     .await?;
//! println!("Found {} files to download", tasks.len());
//! # Ok(())
//! # }
//! ```

mod error;
pub mod html;

use std::collections::HashSet;

use tracing::{debug, info, instrument, warn};
use url::Url;

pub use error::DiscoveryError;

use crate::download::{HttpClient, NoProgress};
use crate::task::{Task, sanitize_group_name};

/// Receives one notification per species page walked.
pub trait DiscoveryObserver: Send + Sync {
    /// Called after species `done` of `total` contributed `files` new tasks.
    fn on_species(&self, done: usize, total: usize, label: &str, files: usize);
}

impl DiscoveryObserver for NoProgress {
    fn on_species(&self, _done: usize, _total: usize, _label: &str, _files: usize) {}
}

/// Which pages of a species contribute file links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeciesWalk {
    /// Only the file table on the species page itself.
    SpeciesTable,
    /// Only the file tables of the year pages, each stored in a year folder.
    YearPages,
}

/// Crawler producing the task list for one collection.
#[derive(Debug, Clone)]
pub struct Discovery {
    client: HttpClient,
    walk: SpeciesWalk,
}

impl Discovery {
    /// Creates a crawler that collects file links the way `walk` says.
    #[must_use]
    pub fn new(client: HttpClient, walk: SpeciesWalk) -> Self {
        Self { client, walk }
    }

    /// Walks the collection rooted at `root_url` and returns every file task.
    ///
    /// Species links are resolved against the root page, year links against
    /// their species page, and file links against the site root. Duplicate
    /// tasks are dropped, first occurrence wins.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] if the root URL is invalid, the root page
    /// cannot be fetched, or it has no species list.
    #[instrument(skip(self, observer), fields(root = %root_url))]
    pub async fn discover(
        &self,
        root_url: &str,
        observer: &dyn DiscoveryObserver,
    ) -> Result<Vec<Task>, DiscoveryError> {
        let invalid_root = |source| DiscoveryError::InvalidRootUrl {
            url: root_url.to_string(),
            source,
        };
        let root = Url::parse(root_url).map_err(invalid_root)?;
        let site_root = root.join("/").map_err(invalid_root)?;

        let root_html = self
            .client
            .fetch_text(root.as_str())
            .await
            .map_err(|source| DiscoveryError::RootPage {
                url: root_url.to_string(),
                source,
            })?;

        let species = html::species_options(&root_html).ok_or_else(|| {
            DiscoveryError::MissingSpeciesList {
                url: root_url.to_string(),
            }
        })?;
        info!(species = species.len(), "gathering download links");

        let mut seen = HashSet::new();
        let mut tasks = Vec::new();
        for (index, entry) in species.iter().enumerate() {
            let group = sanitize_group_name(&entry.label);
            let found = match resolve_link(&root, &entry.value) {
                Some(species_url) => self.species_tasks(&species_url, &site_root, &group).await,
                None => Vec::new(),
            };

            let before = tasks.len();
            tasks.extend(found.into_iter().filter(|task| seen.insert(task.clone())));
            let added = tasks.len() - before;

            debug!(species = %entry.label, group = %group, files = added, "species walked");
            observer.on_species(index + 1, species.len(), &entry.label, added);
        }

        info!(tasks = tasks.len(), "found files to download");
        Ok(tasks)
    }

    /// Files of one species, read from the pages selected by the walk.
    async fn species_tasks(&self, species_url: &Url, site_root: &Url, group: &str) -> Vec<Task> {
        let Some(species_html) = self.fetch_page(species_url).await else {
            return Vec::new();
        };

        if self.walk == SpeciesWalk::SpeciesTable {
            return file_tasks(
                &html::table_file_links(&species_html),
                site_root,
                group,
                None,
            );
        }

        let mut tasks = Vec::new();
        for year in html::year_options(&species_html) {
            let Some(year_url) = resolve_link(species_url, &year.value) else {
                continue;
            };
            let Some(year_html) = self.fetch_page(&year_url).await else {
                continue;
            };

            let subdir = sanitize_group_name(&year.label);
            tasks.extend(file_tasks(
                &html::table_file_links(&year_html),
                site_root,
                group,
                Some(&subdir),
            ));
        }
        tasks
    }

    async fn fetch_page(&self, url: &Url) -> Option<String> {
        match self.client.fetch_text(url.as_str()).await {
            Ok(html) => Some(html),
            Err(e) => {
                warn!(url = %url, error = %e, "skipping page that could not be loaded");
                None
            }
        }
    }
}

fn resolve_link(base: &Url, link: &str) -> Option<Url> {
    match base.join(link) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(base = %base, link, error = %e, "skipping unresolvable link");
            None
        }
    }
}

/// Builds tasks from table hrefs; hrefs are relative to the site root.
fn file_tasks(hrefs: &[String], site_root: &Url, group: &str, subdir: Option<&str>) -> Vec<Task> {
    hrefs
        .iter()
        .filter_map(|href| resolve_link(site_root, href.trim_start_matches('/')))
        .map(|url| {
            let task = Task::new(url.as_str(), group);
            match subdir {
                Some(subdir) => task.with_subdir(subdir),
                None => task,
            }
        })
        .collect()
}
