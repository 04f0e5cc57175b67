//! User-Agent string for archive requests.

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/whalesounds";

/// Default User-Agent for page and file requests (identifies the tool).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("whalesounds/{version} (bioacoustics-dataset-tool; +{PROJECT_UA_URL})")
}
