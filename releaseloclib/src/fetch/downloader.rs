//! Release download with an on-disk extraction cache.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use tracing::debug;

use crate::config::RunConfig;
use crate::error::ReleaselocError;
use crate::Result;

use super::archive::extract_archive;
use super::package::PackageCoordinates;

/// User agent sent to the registry and the hosting API.
pub const USER_AGENT_VALUE: &str = concat!("releaseloc/", env!("CARGO_PKG_VERSION"));

/// Outcome of one download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Release tag
    pub tag: String,
    /// Directory the release was extracted to
    pub dest: PathBuf,
    /// Compressed archive size, `None` on a cache hit
    pub tarball_size: Option<u64>,
    /// Whether the extraction directory already existed
    pub cached: bool,
}

/// Fetches release tarballs from the npm registry and extracts them.
///
/// Extraction targets double as a cache: if `dest_root/tag` exists the
/// release is assumed to be extracted already and no request is made.
#[derive(Debug, Clone)]
pub struct ReleaseDownloader {
    client: reqwest::Client,
    registry_url: String,
}

impl ReleaseDownloader {
    /// Create a downloader for a registry.
    pub fn new(registry_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ReleaselocError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            registry_url: registry_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a downloader from the run configuration.
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        Self::new(config.registry_url.clone(), config.timeout)
    }

    /// Tarball URL for a tag on this downloader's registry.
    pub fn tarball_url(&self, tag: &str) -> String {
        PackageCoordinates::from_tag(tag).tarball_url(&self.registry_url)
    }

    /// Download and extract `tag` into `dest_root/tag`.
    pub async fn download(&self, tag: &str, dest_root: impl AsRef<Path>) -> Result<Download> {
        let dest = dest_root.as_ref().join(tag);

        if tokio::fs::metadata(&dest)
            .await
            .is_ok_and(|meta| meta.is_dir())
        {
            debug!(tag, dest = %dest.display(), "release already extracted");
            return Ok(Download {
                tag: tag.to_string(),
                dest,
                tarball_size: None,
                cached: true,
            });
        }

        let parent = dest
            .parent()
            .map_or_else(|| dest_root.as_ref().to_path_buf(), Path::to_path_buf);
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(|e| ReleaselocError::io(&parent, e))?;

        let size = self.fetch_and_extract(tag, parent, dest.clone()).await?;

        Ok(Download {
            tag: tag.to_string(),
            dest,
            tarball_size: Some(size),
            cached: false,
        })
    }

    async fn fetch_and_extract(&self, tag: &str, parent: PathBuf, dest: PathBuf) -> Result<u64> {
        let url = self.tarball_url(tag);
        debug!(tag, url = %url, "downloading release");

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ReleaselocError::TarballNotFound { url });
        }
        if !status.is_success() {
            return Err(ReleaselocError::DownloadFailed {
                status: status.to_string(),
            });
        }

        let body = response.bytes().await?;
        let size = body.len() as u64;

        tokio::task::spawn_blocking(move || extract_into_place(&parent, &dest, &body[..]))
            .await
            .map_err(|e| ReleaselocError::Internal(format!("extraction task failed: {e}")))??;

        debug!(tag, bytes = size, "release extracted");
        Ok(size)
    }
}

/// Extract into a staging directory under `parent`, then rename it to `dest`.
///
/// `dest` only ever appears holding a complete extraction, so an existing
/// `dest` is always a valid cache hit. The staging directory is removed on
/// failure, and when the extraction outlives an aborted download it still
/// either completes or cleans up after itself.
fn extract_into_place(parent: &Path, dest: &Path, body: &[u8]) -> Result<()> {
    let staging = tempfile::Builder::new()
        .prefix(".partial-")
        .tempdir_in(parent)
        .map_err(|e| ReleaselocError::io(parent, e))?;

    extract_archive(staging.path(), body).map_err(|e| match e {
        ReleaselocError::Extract { source, .. } => ReleaselocError::Extract {
            path: dest.to_path_buf(),
            source,
        },
        other => other,
    })?;

    match std::fs::rename(staging.path(), dest) {
        Ok(()) => Ok(()),
        // Extracted concurrently by another run
        Err(_) if dest.is_dir() => {
            debug!(dest = %dest.display(), "release already in place");
            Ok(())
        }
        Err(e) => Err(ReleaselocError::io(dest, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs;
    use tempfile::tempdir;

    fn tarball(content: &str) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "package/index.js", content.as_bytes())
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_extract_into_place() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("v1.0.0");

        extract_into_place(dir.path(), &dest, &tarball("a\nb\n")).unwrap();

        assert_eq!(
            fs::read_to_string(dest.join("package/index.js")).unwrap(),
            "a\nb\n"
        );
        assert_eq!(entries(dir.path()), ["v1.0.0"]);
    }

    #[test]
    fn test_failed_extraction_leaves_nothing_behind() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("v1.0.0");

        let err = extract_into_place(dir.path(), &dest, b"not a tarball").unwrap_err();

        assert!(matches!(err, ReleaselocError::Extract { ref path, .. } if *path == dest));
        assert!(!dest.exists());
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn test_existing_destination_is_kept() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("v1.0.0");
        fs::create_dir_all(dest.join("package")).unwrap();
        fs::write(dest.join("package/index.js"), "first\n").unwrap();

        extract_into_place(dir.path(), &dest, &tarball("second\n")).unwrap();

        assert_eq!(
            fs::read_to_string(dest.join("package/index.js")).unwrap(),
            "first\n"
        );
        assert_eq!(entries(dir.path()), ["v1.0.0"]);
    }
}
