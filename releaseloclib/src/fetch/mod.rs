//! Registry side: turn a release tag into an extracted package on disk.
//!
//! - **Package coordinates**: derive the tarball URL from a tag
//! - **Downloading**: fetch the tarball, with an extraction-directory cache
//! - **Extraction**: unpack gzip-compressed tarballs

pub mod archive;
pub mod downloader;
pub mod package;

pub use archive::extract_archive;
pub use downloader::{Download, ReleaseDownloader, USER_AGENT_VALUE};
pub use package::PackageCoordinates;
