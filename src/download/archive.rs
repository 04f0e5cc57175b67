//! Zip expansion for bundled master tapes.
//!
//! Extraction is blocking file IO, so it runs on the blocking thread pool.
//! Entries land in a directory shared by every archive of the same group;
//! an entry that already exists is overwritten.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zip::ZipArchive;
use zip::result::ZipError;

use super::DownloadError;

/// Expands every entry of the zip at `archive_path` into `dest_dir`.
///
/// Entries whose names would escape `dest_dir` (absolute paths, `..`) are
/// skipped with a warning.
///
/// # Returns
///
/// The number of files written.
///
/// # Errors
///
/// Returns [`DownloadError::MalformedArchive`] if the file is not a zip
/// container, and [`DownloadError::Io`] if writing an entry fails.
pub async fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<usize, DownloadError> {
    let archive_path = archive_path.to_path_buf();
    let dest_dir = dest_dir.to_path_buf();
    let join_path = archive_path.clone();

    tokio::task::spawn_blocking(move || extract_zip_blocking(&archive_path, &dest_dir))
        .await
        .map_err(|e| DownloadError::io(join_path, io::Error::other(e)))?
}

fn extract_zip_blocking(archive_path: &Path, dest_dir: &Path) -> Result<usize, DownloadError> {
    let file = File::open(archive_path).map_err(|e| DownloadError::io(archive_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| open_error(archive_path, e))?;

    let mut written = 0usize;
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| open_error(archive_path, e))?;

        let Some(relative) = entry.enclosed_name() else {
            warn!(
                archive = %archive_path.display(),
                entry = entry.name(),
                "skipping archive entry with unsafe path"
            );
            continue;
        };
        let out_path: PathBuf = dest_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| DownloadError::io(&out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| DownloadError::io(parent, e))?;
        }

        let mut out = File::create(&out_path).map_err(|e| DownloadError::io(&out_path, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| DownloadError::io(&out_path, e))?;
        written += 1;
    }

    debug!(
        archive = %archive_path.display(),
        files = written,
        "archive extracted"
    );
    Ok(written)
}

/// Any failure reading the container structure means the download is unusable.
fn open_error(archive_path: &Path, error: ZipError) -> DownloadError {
    DownloadError::malformed_archive(archive_path, error)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    use super::*;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, body) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(body).unwrap();
        }
        writer.finish().unwrap();
    }

    #[tokio::test]
    async fn test_extract_zip_writes_all_entries() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("tape.zip");
        write_zip(&archive, &[("a.txt", b"alpha"), ("nested/b.txt", b"beta")]);
        let dest = temp.path().join("extracted_data");

        let written = extract_zip(&archive, &dest).await.unwrap();

        assert_eq!(written, 2);
        assert_eq!(fs::read(dest.join("a.txt")).unwrap(), b"alpha");
        assert_eq!(fs::read(dest.join("nested/b.txt")).unwrap(), b"beta");
    }

    #[tokio::test]
    async fn test_extract_zip_overwrites_existing_entries() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("extracted_data");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("a.txt"), b"stale").unwrap();

        let archive = temp.path().join("tape.zip");
        write_zip(&archive, &[("a.txt", b"fresh")]);

        extract_zip(&archive, &dest).await.unwrap();

        assert_eq!(fs::read(dest.join("a.txt")).unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn test_extract_zip_rejects_non_archive() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("tape.zip");
        fs::write(&archive, b"<html><body>The requested tape is not available.</body></html>").unwrap();

        let result = extract_zip(&archive, temp.path()).await;

        assert!(
            matches!(result, Err(DownloadError::MalformedArchive { .. })),
            "expected malformed archive, got {result:?}"
        );
    }

    #[tokio::test]
    async fn test_extract_zip_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let result = extract_zip(&temp.path().join("absent.zip"), temp.path()).await;
        assert!(matches!(result, Err(DownloadError::Io { .. })));
    }
}
