//! # releaseloclib
//!
//! Compare the size of an npm package across a range of GitHub releases.
//!
//! ## Overview
//!
//! Given a repository and two release tags, the library:
//!
//! 1. checks that both tags have a release on GitHub,
//! 2. lists the releases between them (optionally excluding tags by pattern),
//! 3. downloads each release's npm tarball and extracts it to disk,
//! 4. counts lines, files and bytes per release, per language,
//! 5. assembles a chronological [`Report`] with deltas between releases.
//!
//! Steps 1, 3 and 4 run concurrently within each stage. The [`pipeline`]
//! module sequences the stages; the other modules are usable on their own.
//!
//! ## Features
//!
//! - **Extraction cache**: releases already extracted under the output
//!   directory are not downloaded again
//! - **Scoped packages**: tags such as `@sveltejs/kit@1.0.0` map to the
//!   scoped registry tarball
//! - **Pure data types**: results are plain serializable structs
//!
//! ## Example
//!
//! ```rust
//! use releaseloclib::{analyze_release, count_lines, AnalysisResult, Report};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! for (tag, body) in [("v1.0.0", "a\n"), ("v1.1.0", "a\nb\nc\n")] {
//!     let pkg = dir.path().join(tag).join("package");
//!     fs::create_dir_all(&pkg).unwrap();
//!     fs::write(pkg.join("index.js"), body).unwrap();
//! }
//!
//! assert_eq!(count_lines("a\nb\n".as_bytes()).unwrap(), 2);
//!
//! let results: Vec<AnalysisResult> = ["v1.0.0", "v1.1.0"]
//!     .iter()
//!     .map(|tag| analyze_release(dir.path(), tag).unwrap())
//!     .collect();
//! let report = Report::new(results);
//! assert_eq!(report.latest().unwrap().line_delta(), Some(2));
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod source;

pub use config::{Repository, RunConfig};
pub use data::{
    analyze_release, count_file_lines, count_lines, language_for_extension, AnalysisResult,
    Release, OTHER_LANGUAGE,
};
pub use error::{ErrorKind, ReleaselocError};
pub use fetch::{extract_archive, Download, PackageCoordinates, ReleaseDownloader};
pub use output::{format_delta, format_size, Report, ReportEntry};
pub use pipeline::{Controller, Effect, Event, Pipeline, Progress, Stage};
pub use source::{fetch_release_range, GitHubClient, HostingApi};

/// Result type for releaseloclib operations
pub type Result<T> = std::result::Result<T, ReleaselocError>;
