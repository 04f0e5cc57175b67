//! Local filename derivation for downloaded files.

use std::path::{Component, Path};

use tracing::debug;
use url::Url;

use super::DownloadError;

/// Derives the local filename from the last path segment of `url`.
///
/// The segment is percent-decoded and sanitized so it cannot escape the
/// destination directory.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidUrl`] if the URL does not parse or its
/// path ends without a file name.
pub(crate) fn filename_from_url(url: &str) -> Result<String, DownloadError> {
    let parsed = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

    let last = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| DownloadError::invalid_url(url))?;

    let decoded = urlencoding::decode(last).unwrap_or_else(|e| {
        debug!(segment = %last, error = %e, "URL decoding failed, using raw segment");
        std::borrow::Cow::Borrowed(last)
    });

    Ok(sanitize_filename(&decoded))
}

/// Sanitizes filename for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_url_takes_last_segment() {
        let name = filename_from_url("http://cis.whoi.edu/data/files/blue01.wav").unwrap();
        assert_eq!(name, "blue01.wav");
    }

    #[test]
    fn test_filename_from_url_ignores_query() {
        let name = filename_from_url("http://cis.whoi.edu/data/tape7.zip?dl=1").unwrap();
        assert_eq!(name, "tape7.zip");
    }

    #[test]
    fn test_filename_from_url_decodes_percent_encoding() {
        let name = filename_from_url("http://cis.whoi.edu/data/blue%20whale.zip").unwrap();
        assert_eq!(name, "blue whale.zip");
    }

    #[test]
    fn test_filename_from_url_encoded_separator_is_sanitized() {
        let name = filename_from_url("http://cis.whoi.edu/data/..%2F..%2Fetc").unwrap();
        assert_eq!(name, ".._.._etc");
    }

    #[test]
    fn test_filename_from_url_rejects_directory_url() {
        let result = filename_from_url("http://cis.whoi.edu/data/");
        assert!(matches!(result, Err(DownloadError::InvalidUrl { .. })));
    }

    #[test]
    fn test_filename_from_url_rejects_garbage() {
        let result = filename_from_url("not a url");
        assert!(matches!(result, Err(DownloadError::InvalidUrl { .. })));
    }

    #[test]
    fn test_sanitize_filename_removes_invalid_chars() {
        assert_eq!(sanitize_filename("file/name.wav"), "file_name.wav");
        assert_eq!(sanitize_filename("file\\name.wav"), "file_name.wav");
        assert_eq!(sanitize_filename("file:name.wav"), "file_name.wav");
        assert_eq!(sanitize_filename("file<name>.wav"), "file_name_.wav");
    }

    #[test]
    fn test_sanitize_filename_rewrites_dot_segments() {
        assert_eq!(sanitize_filename("."), "_");
        assert_eq!(sanitize_filename(".."), "__");
    }
}
