//! Error types for releaseloclib

use std::path::PathBuf;
use thiserror::Error;

/// Broad category of a [`ReleaselocError`].
///
/// Every error is terminal for a run; the kind only decides how it is
/// reported and which exit code the CLI uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input, the run never starts
    Validation,
    /// A tag, tarball or path that does not exist
    NotFound,
    /// Authentication or authorization failure on the hosting API
    Access,
    /// Transport failures and unexpected HTTP responses
    Network,
    /// Extraction, walk or cleanup failures
    Filesystem,
    /// A worker task died without reporting
    Internal,
}

/// Errors that can occur while comparing releases
#[derive(Error, Debug)]
pub enum ReleaselocError {
    /// Repository identifier is not of the form `owner/name`
    #[error("invalid GitHub repository '{0}'. Format: owner/repo")]
    InvalidRepository(String),

    /// A required tag was empty
    #[error("missing {0} release tag")]
    MissingTag(&'static str),

    /// Exclusion pattern failed to compile
    #[error("invalid exclusion pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Tag does not exist in the repository
    #[error(
        "{tag} does not exist, check that you input an existing GitHub tag \
         (check at https://github.com/{repository}/tags)"
    )]
    TagNotFound { tag: String, repository: String },

    /// The registry has no tarball for the release
    #[error("release not found at {url}")]
    TarballNotFound { url: String },

    /// Range scan produced nothing
    #[error("no releases found, please check your inputs")]
    NoReleases,

    /// Path does not exist
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// Hosting API refused the request
    #[error("access forbidden to {url}, check your token")]
    AccessForbidden { url: String },

    /// Request never produced a response
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected HTTP status from the hosting API
    #[error("unexpected response from {url}: {status}")]
    Http { url: String, status: String },

    /// Registry answered the tarball request with a non-success status
    #[error("could not download release: {status}")]
    DownloadFailed { status: String },

    /// Response body could not be decoded
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Filesystem operation failed
    #[error("IO error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Archive could not be unpacked
    #[error("failed to extract archive into '{path}': {source}")]
    Extract {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Removing the extraction directory failed
    #[error("failed to remove '{path}': {source}")]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Worker task panicked or was cancelled
    #[error("internal error: {0}")]
    Internal(String),
}

impl ReleaselocError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRepository(_) | Self::MissingTag(_) | Self::InvalidPattern { .. } => {
                ErrorKind::Validation
            }
            Self::TagNotFound { .. }
            | Self::TarballNotFound { .. }
            | Self::NoReleases
            | Self::PathNotFound(_) => ErrorKind::NotFound,
            Self::AccessForbidden { .. } => ErrorKind::Access,
            Self::Network(_)
            | Self::Http { .. }
            | Self::DownloadFailed { .. }
            | Self::InvalidResponse(_) => ErrorKind::Network,
            Self::Io { .. } | Self::Extract { .. } | Self::Cleanup { .. } => {
                ErrorKind::Filesystem
            }
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::Internal => 1,
            ErrorKind::Validation => 2,
            ErrorKind::NotFound => 3,
            ErrorKind::Access => 4,
            ErrorKind::Network => 5,
            ErrorKind::Filesystem => 6,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for ReleaselocError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
