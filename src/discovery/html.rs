//! Extraction of option lists and file tables from archive pages.
//!
//! Parsing is synchronous and returns owned data so that no parsed document
//! is ever held across an await point.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Container holding the species dropdown on a collection's root page.
const SPECIES_CONTAINER: &str = r#"[class="large-4 medium-4 columns left"]"#;

/// Container holding the year dropdown on a species page.
const YEAR_CONTAINER: &str = r#"[class="large-4 medium-4 columns"]"#;

/// Table listing downloadable files.
const FILE_TABLE: &str = ".database";

#[allow(clippy::expect_used)]
fn static_selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static CSS selector is valid")
}

static SPECIES_SELECTOR: LazyLock<Selector> = LazyLock::new(|| static_selector(SPECIES_CONTAINER));
static YEAR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| static_selector(YEAR_CONTAINER));
static TABLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| static_selector(FILE_TABLE));
static OPTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| static_selector("option"));
static ROW_SELECTOR: LazyLock<Selector> = LazyLock::new(|| static_selector("tr"));
static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| static_selector("a[href]"));

/// One entry of a dropdown: visible label and the (usually relative) link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionLink {
    /// Trimmed option text.
    pub label: String,
    /// Raw `value` attribute.
    pub value: String,
}

/// Species entries of a root page, without the leading placeholder.
///
/// Returns `None` when the page has no species dropdown at all.
#[must_use]
pub fn species_options(html: &str) -> Option<Vec<OptionLink>> {
    dropdown_options(html, &SPECIES_SELECTOR)
}

/// Year entries of a species page, without the leading placeholder.
///
/// A page without a year dropdown yields an empty list.
#[must_use]
pub fn year_options(html: &str) -> Vec<OptionLink> {
    dropdown_options(html, &YEAR_SELECTOR).unwrap_or_default()
}

/// File links of the first `database` table: the first `href` of every row
/// after the header row.
#[must_use]
pub fn table_file_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Some(table) = document.select(&TABLE_SELECTOR).next() else {
        return Vec::new();
    };

    table
        .select(&ROW_SELECTOR)
        .skip(1)
        .filter_map(|row| {
            row.select(&LINK_SELECTOR)
                .next()
                .and_then(|anchor| anchor.value().attr("href"))
                .map(str::trim)
                .filter(|href| !href.is_empty())
                .map(str::to_string)
        })
        .collect()
}

fn dropdown_options(html: &str, container: &Selector) -> Option<Vec<OptionLink>> {
    let document = Html::parse_document(html);
    let list = document.select(container).next()?;

    let options = list
        .select(&OPTION_SELECTOR)
        .skip(1)
        .filter_map(option_link)
        .collect();
    Some(options)
}

fn option_link(option: ElementRef<'_>) -> Option<OptionLink> {
    let label = option.text().collect::<String>().trim().to_string();
    let value = option.value().attr("value").map(str::trim).unwrap_or_default();

    if value.is_empty() || label.is_empty() {
        debug!(label = %label, value = %value, "skipping incomplete option");
        return None;
    }

    Some(OptionLink {
        label,
        value: value.to_string(),
    })
}
