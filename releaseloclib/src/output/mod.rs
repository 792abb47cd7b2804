//! Output: the ordered report of a run.
//!
//! - **Report**: analysis results in chronological order
//! - **ReportEntry**: one release with links to its neighbours and the first release
//!
//! Formatting helpers ([`format_delta`], [`format_size`]) produce plain
//! strings; styling is left to the caller.
//!
//! ## Example
//!
//! ```rust
//! use releaseloclib::{AnalysisResult, Report};
//!
//! let mut old = AnalysisResult::new("v1.0.0");
//! old.add_file(10, 100, Some("JavaScript"));
//! let mut new = AnalysisResult::new("v1.1.0");
//! new.add_file(15, 150, Some("JavaScript"));
//!
//! let report = Report::new(vec![old, new]);
//! let latest = report.latest().unwrap();
//! assert_eq!(latest.line_delta(), Some(5));
//! assert_eq!(latest.previous().unwrap().tag(), "v1.0.0");
//! ```

pub mod report;

pub use report::{format_delta, format_size, Report, ReportEntry, VISIBLE_LANGUAGES};
